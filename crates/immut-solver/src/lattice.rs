//! The immutability lattice.
//!
//! Four substantive levels form a chain:
//!
//! ```text
//! Mutable < ReadonlyShallow < ReadonlyDeep < Immutable
//! ```
//!
//! `Unknown` sits outside the chain. The classifier seeds in-progress
//! (cyclic) nodes with it and reads it as the optimistic top. [`meet`] and
//! [`join`] both treat it as their identity, which matches that reading for
//! `meet` only: the top absorbs a join. Callers folding a join over values
//! that may be `Unknown` must handle it themselves. It must be resolved with
//! [`Immutability::resolve_unknown`] before it reaches a rule decision.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// How immutable a type is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Immutability {
    /// Sentinel used during cycle resolution. Never a classification endpoint.
    Unknown,
    Mutable,
    ReadonlyShallow,
    ReadonlyDeep,
    Immutable,
}

impl Immutability {
    /// The four substantive levels, lowest first.
    pub const LEVELS: [Immutability; 4] = [
        Immutability::Mutable,
        Immutability::ReadonlyShallow,
        Immutability::ReadonlyDeep,
        Immutability::Immutable,
    ];

    /// Ordinal used in configuration (`Mutable = 1` .. `Immutable = 4`).
    pub const fn ordinal(self) -> Option<u8> {
        match self {
            Immutability::Unknown => None,
            Immutability::Mutable => Some(1),
            Immutability::ReadonlyShallow => Some(2),
            Immutability::ReadonlyDeep => Some(3),
            Immutability::Immutable => Some(4),
        }
    }

    pub const fn from_ordinal(ordinal: u64) -> Option<Immutability> {
        match ordinal {
            1 => Some(Immutability::Mutable),
            2 => Some(Immutability::ReadonlyShallow),
            3 => Some(Immutability::ReadonlyDeep),
            4 => Some(Immutability::Immutable),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Immutability::Unknown => "Unknown",
            Immutability::Mutable => "Mutable",
            Immutability::ReadonlyShallow => "ReadonlyShallow",
            Immutability::ReadonlyDeep => "ReadonlyDeep",
            Immutability::Immutable => "Immutable",
        }
    }

    #[inline]
    pub const fn is_unknown(self) -> bool {
        matches!(self, Immutability::Unknown)
    }

    /// Replace the sentinel with `fallback`; substantive levels pass through.
    #[inline]
    pub const fn resolve_unknown(self, fallback: Immutability) -> Immutability {
        match self {
            Immutability::Unknown => fallback,
            level => level,
        }
    }

    /// Clamp into `[lower, upper]`.
    ///
    /// `Unknown` is the optimistic top here, so it clamps to `upper`.
    pub fn clamp_level(self, lower: Immutability, upper: Immutability) -> Immutability {
        if self.is_unknown() {
            return upper;
        }
        join(lower, meet(self, upper))
    }
}

impl fmt::Display for Immutability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a level name or ordinal is not recognised.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseImmutabilityError(pub String);

impl fmt::Display for ParseImmutabilityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown immutability level `{}`", self.0)
    }
}

impl std::error::Error for ParseImmutabilityError {}

impl FromStr for Immutability {
    type Err = ParseImmutabilityError;

    /// Parses a substantive level name or its ordinal. `Unknown` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(ordinal) = trimmed.parse::<u64>() {
            return Immutability::from_ordinal(ordinal)
                .ok_or_else(|| ParseImmutabilityError(s.to_string()));
        }
        Immutability::LEVELS
            .into_iter()
            .find(|level| level.name() == trimmed)
            .ok_or_else(|| ParseImmutabilityError(s.to_string()))
    }
}

impl PartialOrd for Immutability {
    /// `None` whenever `Unknown` is involved.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        let (a, b) = (self.ordinal()?, other.ordinal()?);
        Some(a.cmp(&b))
    }
}

/// Total order over the substantive levels.
///
/// Callers resolve `Unknown` first; in release builds an `Unknown` operand
/// compares as `Mutable`.
pub fn compare(a: Immutability, b: Immutability) -> Ordering {
    debug_assert!(
        !a.is_unknown() && !b.is_unknown(),
        "compare() called with Unknown ({a:?}, {b:?})"
    );
    let rank = |level: Immutability| level.ordinal().unwrap_or(1);
    rank(a).cmp(&rank(b))
}

/// Greatest lower bound. `Unknown` is the identity.
pub fn meet(a: Immutability, b: Immutability) -> Immutability {
    match (a, b) {
        (Immutability::Unknown, other) | (other, Immutability::Unknown) => other,
        _ => {
            if compare(a, b) == Ordering::Greater {
                b
            } else {
                a
            }
        }
    }
}

/// Least upper bound. `Unknown` is the identity.
///
/// This is the empty-fold reading of `Unknown`, not the optimistic top: with
/// a back edge seeded as `Unknown`, `join(Unknown, x)` would under-approximate.
pub fn join(a: Immutability, b: Immutability) -> Immutability {
    match (a, b) {
        (Immutability::Unknown, other) | (other, Immutability::Unknown) => other,
        _ => {
            if compare(a, b) == Ordering::Less {
                b
            } else {
                a
            }
        }
    }
}

/// Fold [`meet`] over an iterator, starting from `Unknown`.
pub fn meet_all(levels: impl IntoIterator<Item = Immutability>) -> Immutability {
    levels.into_iter().fold(Immutability::Unknown, meet)
}

impl Serialize for Immutability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Immutability {
    /// Accepts a level name (`"ReadonlyDeep"`) or its ordinal (`3`).
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LevelVisitor;

        impl<'de> Visitor<'de> for LevelVisitor {
            type Value = Immutability;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an immutability level name or an ordinal between 1 and 4")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Immutability, E> {
                v.parse().map_err(E::custom)
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Immutability, E> {
                Immutability::from_ordinal(v)
                    .ok_or_else(|| E::custom(ParseImmutabilityError(v.to_string())))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Immutability, E> {
                u64::try_from(v)
                    .ok()
                    .and_then(Immutability::from_ordinal)
                    .ok_or_else(|| E::custom(ParseImmutabilityError(v.to_string())))
            }
        }

        deserializer.deserialize_any(LevelVisitor)
    }
}

#[cfg(test)]
#[path = "../tests/lattice_tests.rs"]
mod tests;
