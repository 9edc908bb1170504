//! Recursion guard for cycle detection, depth limiting and iteration
//! bounding during graph walks.
//!
//! # Profiles
//!
//! [`RecursionProfile`] names the limit presets so call sites say what they
//! guard instead of passing bare numbers:
//!
//! ```
//! use immut_solver::recursion::{RecursionGuard, RecursionProfile};
//!
//! let guard = RecursionGuard::<u32>::with_profile(RecursionProfile::Classification);
//! assert_eq!(guard.max_depth(), 5_000);
//! ```
//!
//! # Safety
//!
//! - **Debug leak detection**: in debug builds, dropping a guard with active
//!   entries panics, catching forgotten `leave()` calls.
//! - **Debug double-leave detection**: leaving a key that is not being
//!   visited panics in debug builds.
//! - **Overflow protection**: iteration counting saturates.

use rustc_hash::FxHashMap;
use std::hash::Hash;

// ---------------------------------------------------------------------------
// RecursionProfile
// ---------------------------------------------------------------------------

/// Named recursion limit presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionProfile {
    /// Immutability classification of a type graph.
    ///
    /// Deep enough for long reference chains (the walk grows its stack on
    /// demand). Each node is entered once per query, so the iteration budget
    /// only trips on very large graphs.
    ///
    /// depth = 5,000, iterations = 1,000,000
    Classification,

    /// Custom limits for one-off or test scenarios.
    Custom { max_depth: u32, max_iterations: u32 },
}

impl RecursionProfile {
    pub const fn max_depth(self) -> u32 {
        match self {
            Self::Classification => 5_000,
            Self::Custom { max_depth, .. } => max_depth,
        }
    }

    pub const fn max_iterations(self) -> u32 {
        match self {
            Self::Classification => 1_000_000,
            Self::Custom { max_iterations, .. } => max_iterations,
        }
    }
}

// ---------------------------------------------------------------------------
// RecursionResult
// ---------------------------------------------------------------------------

/// Result of attempting to enter a recursive computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecursionResult {
    /// Proceed with the computation.
    Entered,
    /// This key is already being visited; carries the depth it was entered at.
    Cycle { depth: u32 },
    /// Maximum recursion depth exceeded.
    DepthExceeded,
    /// Maximum iteration count exceeded.
    IterationExceeded,
}

impl RecursionResult {
    #[inline]
    pub fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }

    #[inline]
    pub fn is_cycle(self) -> bool {
        matches!(self, Self::Cycle { .. })
    }

    #[inline]
    pub fn is_exceeded(self) -> bool {
        matches!(self, Self::DepthExceeded | Self::IterationExceeded)
    }
}

// ---------------------------------------------------------------------------
// RecursionGuard
// ---------------------------------------------------------------------------

/// Tracks the keys currently being visited, the nesting depth, and the
/// total amount of work done.
///
/// Each visiting key remembers the depth it was entered at, so a cycle
/// report tells the caller how far up the stack the back edge points.
///
/// ```
/// use immut_solver::recursion::{RecursionGuard, RecursionResult};
///
/// let mut guard = RecursionGuard::new(10, 100);
/// assert_eq!(guard.enter(7u32), RecursionResult::Entered);
/// assert_eq!(guard.enter(7u32), RecursionResult::Cycle { depth: 0 });
/// guard.leave(7);
/// ```
pub struct RecursionGuard<K: Hash + Eq + Copy> {
    visiting: FxHashMap<K, u32>,
    depth: u32,
    iterations: u32,
    max_depth: u32,
    max_iterations: u32,
    exceeded: bool,
}

impl<K: Hash + Eq + Copy> RecursionGuard<K> {
    /// Prefer [`with_profile`](Self::with_profile) for standard use cases.
    pub fn new(max_depth: u32, max_iterations: u32) -> Self {
        Self {
            visiting: FxHashMap::default(),
            depth: 0,
            iterations: 0,
            max_depth,
            max_iterations,
            exceeded: false,
        }
    }

    pub fn with_profile(profile: RecursionProfile) -> Self {
        Self::new(profile.max_depth(), profile.max_iterations())
    }

    /// Try to enter a recursive computation for `key`.
    ///
    /// On [`RecursionResult::Entered`] the caller **must** call
    /// [`leave`](Self::leave) with the same key when done.
    pub fn enter(&mut self, key: K) -> RecursionResult {
        self.iterations = self.iterations.saturating_add(1);

        if let Some(&depth) = self.visiting.get(&key) {
            return RecursionResult::Cycle { depth };
        }
        if self.iterations > self.max_iterations {
            self.exceeded = true;
            return RecursionResult::IterationExceeded;
        }
        if self.depth >= self.max_depth {
            self.exceeded = true;
            return RecursionResult::DepthExceeded;
        }

        self.visiting.insert(key, self.depth);
        self.depth += 1;
        RecursionResult::Entered
    }

    /// Leave a computation entered with [`enter`](Self::enter).
    pub fn leave(&mut self, key: K) {
        let was_present = self.visiting.remove(&key).is_some();

        debug_assert!(
            was_present,
            "RecursionGuard::leave() called with a key that is not in the visiting set. \
             This indicates a double-leave or a leave without a matching enter()."
        );

        self.depth = self.depth.saturating_sub(1);
    }

    #[inline]
    pub fn is_visiting(&self, key: &K) -> bool {
        self.visiting.contains_key(key)
    }

    /// Current recursion depth (number of active entries on the stack).
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Total enter attempts so far (successful or not).
    #[inline]
    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.depth > 0
    }

    #[inline]
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    #[inline]
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    /// Sticky: stays `true` until [`reset`](Self::reset).
    #[inline]
    pub fn is_exceeded(&self) -> bool {
        self.exceeded
    }

    /// Reset all state while preserving configured limits.
    pub fn reset(&mut self) {
        self.visiting.clear();
        self.depth = 0;
        self.iterations = 0;
        self.exceeded = false;
    }
}

#[cfg(debug_assertions)]
impl<K: Hash + Eq + Copy> Drop for RecursionGuard<K> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.visiting.is_empty() {
            panic!(
                "RecursionGuard dropped with {} active entries still in the visiting set. \
                 This indicates leaked enter() calls without matching leave() calls.",
                self.visiting.len(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_profile_limits() {
        let p = RecursionProfile::Classification;
        assert_eq!(p.max_depth(), 5_000);
        assert_eq!(p.max_iterations(), 1_000_000);
    }

    #[test]
    fn profile_custom_limits() {
        let p = RecursionProfile::Custom {
            max_depth: 7,
            max_iterations: 42,
        };
        assert_eq!(p.max_depth(), 7);
        assert_eq!(p.max_iterations(), 42);
    }

    #[test]
    fn basic_enter_leave() {
        let mut guard = RecursionGuard::new(10, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.depth(), 1);
        assert!(guard.is_visiting(&1));
        assert!(guard.is_active());

        guard.leave(1);
        assert_eq!(guard.depth(), 0);
        assert!(!guard.is_visiting(&1));
        assert!(!guard.is_active());
    }

    #[test]
    fn cycle_reports_the_entry_depth() {
        let mut guard = RecursionGuard::new(10, 100);
        assert_eq!(guard.enter(1u32), RecursionResult::Entered);
        assert_eq!(guard.enter(2u32), RecursionResult::Entered);
        assert_eq!(guard.enter(3u32), RecursionResult::Entered);

        assert_eq!(guard.enter(2u32), RecursionResult::Cycle { depth: 1 });
        assert_eq!(guard.enter(1u32), RecursionResult::Cycle { depth: 0 });
        // A denied entry does not change the depth.
        assert_eq!(guard.depth(), 3);

        guard.leave(3);
        guard.leave(2);
        guard.leave(1);
    }

    #[test]
    fn depth_limit_is_sticky() {
        let mut guard = RecursionGuard::new(2, 100);
        assert!(guard.enter(1u32).is_entered());
        assert!(guard.enter(2u32).is_entered());
        assert_eq!(guard.enter(3u32), RecursionResult::DepthExceeded);
        assert!(guard.is_exceeded());

        guard.leave(2);
        guard.leave(1);
        assert!(guard.is_exceeded());

        guard.reset();
        assert!(!guard.is_exceeded());
        assert_eq!(guard.iterations(), 0);
    }

    #[test]
    fn iteration_budget_counts_every_attempt() {
        let mut guard = RecursionGuard::new(10, 3);
        for key in 0u32..3 {
            assert!(guard.enter(key).is_entered());
            guard.leave(key);
        }
        assert_eq!(guard.enter(9u32), RecursionResult::IterationExceeded);
        assert!(guard.enter(9u32).is_exceeded());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "double-leave")]
    fn double_leave_panics_in_debug() {
        let mut guard = RecursionGuard::new(10, 100);
        assert!(guard.enter(1u32).is_entered());
        guard.leave(1);
        guard.leave(1);
    }
}
