//! Immutability classification.
//!
//! [`ImmutabilityClassifier`] walks a [`TypeGraph`] depth-first and assigns
//! every reachable node a level on the immutability lattice.
//!
//! ## Cycles
//!
//! Strongly connected components are found the way Tarjan's algorithm finds
//! them. Every node entered through the [`RecursionGuard`] gets a preorder
//! index. A back edge to a node that is still in progress, or to a member of
//! an unfinished component, yields that node's current value (the optimistic
//! seed `Unknown` while in progress) together with its index. Results carry
//! the smallest such index they observed (`low`):
//!
//! - no back edge at all: the node is acyclic and goes straight to the cache.
//! - `low` below the node's own index: the node belongs to a component whose
//!   head is still in progress. Its value is parked in a provisional table
//!   and the node joins the member stack until that head finishes.
//! - `low` equal to the node's own index: the node is the head. The head and
//!   the members above it on the stack are re-evaluated against each other
//!   until nothing changes, and then all of them are cached together.
//!
//! Seeding back edges with the top of the lattice makes the first values an
//! upper bound, and every equation is monotone, so the re-evaluation only
//! moves values down and stops at the greatest fixpoint. Each node is entered
//! once per component, whichever node is queried first.
//!
//! ## Thresholds
//!
//! Callers that only need to know whether a type reaches a level pass it as
//! the threshold. Meets stop as soon as the accumulated value falls below it;
//! such partial results are returned as-is (they are guaranteed to stay below
//! the threshold) and never cached.

use crate::graph::TypeGraph;
use crate::lattice::{Immutability, join, meet};
use crate::overrides::{OverrideLookup, OverrideTable};
use crate::recursion::{RecursionGuard, RecursionProfile, RecursionResult};
use crate::types::{ObjectShape, TypeData, TypeId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace, warn};

/// `low` of a result that depends on no in-progress node.
const SETTLED: u32 = u32::MAX;

// Long reference chains recurse once per node; grow the native stack
// instead of overflowing it.
const STACK_RED_ZONE: usize = 64 * 1024;
const STACK_GROWTH: usize = 1024 * 1024;

#[derive(Clone, Copy, Debug)]
struct Outcome {
    level: Immutability,
    /// Smallest preorder index of an unfinished node this result read.
    low: u32,
    /// Cut short by the threshold or by the recursion guard.
    partial: bool,
}

impl Outcome {
    const fn exact(level: Immutability) -> Self {
        Self {
            level,
            low: SETTLED,
            partial: false,
        }
    }

    fn absorb(&mut self, other: Outcome) {
        self.low = self.low.min(other.low);
        self.partial |= other.partial;
    }
}

/// Classifies the nodes of one type graph.
///
/// The classifier owns its cache, so one instance corresponds to one
/// analysis pass. Overrides are fixed at construction time.
///
/// ```
/// use immut_solver::{Immutability, ImmutabilityClassifier, OverrideTable, PropertyInfo, TypeArena, TypeId};
///
/// let mut arena = TypeArena::new();
/// let point = arena.object(vec![
///     PropertyInfo::readonly("x", TypeId::NUMBER),
///     PropertyInfo::readonly("y", TypeId::NUMBER),
/// ]);
///
/// let mut classifier = ImmutabilityClassifier::new(&arena, OverrideTable::builtin());
/// assert_eq!(classifier.classify_fully(point), Immutability::ReadonlyDeep);
/// ```
pub struct ImmutabilityClassifier<'g, G: TypeGraph + ?Sized> {
    graph: &'g G,
    overrides: OverrideTable,
    cache: FxHashMap<TypeId, Immutability>,
    /// Current values of finished members of unfinished components.
    provisional: FxHashMap<TypeId, Immutability>,
    /// Preorder index of every node that is in progress or parked.
    indices: FxHashMap<TypeId, u32>,
    next_index: u32,
    /// Finished members waiting for their component head.
    members: Vec<TypeId>,
    guard: RecursionGuard<TypeId>,
}

impl<'g, G: TypeGraph + ?Sized> ImmutabilityClassifier<'g, G> {
    pub fn new(graph: &'g G, overrides: OverrideTable) -> Self {
        Self::with_profile(graph, overrides, RecursionProfile::Classification)
    }

    pub fn with_profile(graph: &'g G, overrides: OverrideTable, profile: RecursionProfile) -> Self {
        Self {
            graph,
            overrides,
            cache: FxHashMap::default(),
            provisional: FxHashMap::default(),
            indices: FxHashMap::default(),
            next_index: 0,
            members: Vec::new(),
            guard: RecursionGuard::with_profile(profile),
        }
    }

    pub fn graph(&self) -> &'g G {
        self.graph
    }

    pub fn overrides(&self) -> &OverrideTable {
        &self.overrides
    }

    /// Classify `type_id`, stopping early once the result is known to be
    /// below `threshold`.
    ///
    /// Pass `Immutability::Unknown` as the threshold to always compute the
    /// exact level. The result is never `Unknown`.
    pub fn classify(&mut self, type_id: TypeId, threshold: Immutability) -> Immutability {
        if let Some(&level) = self.cache.get(&type_id) {
            return level;
        }

        self.guard.reset();
        self.next_index = 0;
        let outcome = self.visit(type_id, threshold);
        debug_assert!(
            self.provisional.is_empty() && self.members.is_empty(),
            "provisional results outlived their SCC head"
        );
        self.provisional.clear();
        self.indices.clear();
        self.members.clear();

        if self.guard.is_exceeded() {
            warn!(
                type_id = type_id.0,
                iterations = self.guard.iterations(),
                max_depth = self.guard.max_depth(),
                "immutability classification hit its recursion limit; treating as Mutable"
            );
        }

        let level = outcome.level.resolve_unknown(Immutability::Immutable);
        debug!(
            type_id = type_id.0,
            level = %level,
            threshold = %threshold,
            partial = outcome.partial,
            "classified type"
        );
        level
    }

    /// Classify without a threshold.
    pub fn classify_fully(&mut self, type_id: TypeId) -> Immutability {
        self.classify(type_id, Immutability::Unknown)
    }

    /// The settled level of `type_id`, if it has been computed this pass.
    pub fn cached(&self, type_id: TypeId) -> Option<Immutability> {
        self.cache.get(&type_id).copied()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Forget every settled result.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    fn visit(&mut self, type_id: TypeId, threshold: Immutability) -> Outcome {
        if let Some(&level) = self.cache.get(&type_id) {
            return Outcome::exact(level);
        }
        if let Some(&level) = self.provisional.get(&type_id) {
            return Outcome {
                level,
                low: self.index_of(type_id),
                partial: false,
            };
        }

        match self.guard.enter(type_id) {
            RecursionResult::Entered => {}
            RecursionResult::Cycle { depth } => {
                trace!(type_id = type_id.0, depth, "back edge to in-progress type");
                return Outcome {
                    level: Immutability::Unknown,
                    low: self.index_of(type_id),
                    partial: false,
                };
            }
            RecursionResult::DepthExceeded | RecursionResult::IterationExceeded => {
                return Outcome {
                    level: Immutability::Mutable,
                    low: SETTLED,
                    partial: true,
                };
            }
        }

        let index = self.next_index;
        self.next_index += 1;
        self.indices.insert(type_id, index);
        let base = self.members.len();

        let mut outcome = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROWTH, || {
            self.compute(type_id, threshold)
        });
        self.guard.leave(type_id);

        if outcome.low < index {
            // The head of this component is still in progress.
            if !outcome.partial {
                self.provisional.insert(type_id, outcome.level);
            }
            self.members.push(type_id);
            trace!(
                type_id = type_id.0,
                level = %outcome.level,
                low = outcome.low,
                "parked component member"
            );
            return outcome;
        }

        let members: SmallVec<[TypeId; 8]> = self.members.drain(base..).collect();
        if outcome.low == SETTLED || outcome.partial {
            // Acyclic, or cut short: a partial component is dropped whole.
            for member in &members {
                self.forget(*member);
            }
            self.indices.remove(&type_id);
            outcome.level = outcome.level.resolve_unknown(Immutability::Immutable);
            if !outcome.partial {
                self.cache.insert(type_id, outcome.level);
            }
        } else {
            outcome.level = self.settle(type_id, outcome.level, &members);
        }
        outcome.low = SETTLED;

        trace!(
            type_id = type_id.0,
            level = %outcome.level,
            partial = outcome.partial,
            "classified node"
        );
        outcome
    }

    /// Bring a finished component to its greatest fixpoint and cache it.
    ///
    /// Every member already holds an upper bound of its final level, so each
    /// round can only lower values and the loop ends after at most one round
    /// per lattice step of every member.
    fn settle(&mut self, head: TypeId, level: Immutability, members: &[TypeId]) -> Immutability {
        self.provisional.insert(head, level);
        let component: SmallVec<[TypeId; 8]> =
            std::iter::once(head).chain(members.iter().copied()).collect();
        for &member in &component {
            self.provisional.entry(member).or_insert(Immutability::Unknown);
        }

        let max_rounds = component.len() * Immutability::LEVELS.len() + 1;
        let mut rounds = 0;
        loop {
            rounds += 1;
            let mut changed = false;
            for &member in &component {
                let level = self.compute(member, Immutability::Unknown).level;
                if self.provisional.insert(member, level) != Some(level) {
                    changed = true;
                }
            }
            if !changed || rounds >= max_rounds {
                break;
            }
        }

        for &member in &component {
            let level = self
                .provisional
                .remove(&member)
                .unwrap_or(Immutability::Unknown)
                .resolve_unknown(Immutability::Immutable);
            self.indices.remove(&member);
            self.cache.insert(member, level);
        }
        trace!(
            head = head.0,
            members = component.len(),
            rounds,
            "settled strongly connected component"
        );
        self.cache.get(&head).copied().unwrap_or(Immutability::Mutable)
    }

    fn forget(&mut self, type_id: TypeId) {
        self.provisional.remove(&type_id);
        self.indices.remove(&type_id);
    }

    fn index_of(&self, type_id: TypeId) -> u32 {
        // Every unfinished node has an index; 0 is the conservative fallback.
        self.indices.get(&type_id).copied().unwrap_or(0)
    }

    fn compute(&mut self, type_id: TypeId, threshold: Immutability) -> Outcome {
        let graph = self.graph;
        let Some(data) = graph.lookup(type_id) else {
            trace!(type_id = type_id.0, "unresolvable type");
            return Outcome::exact(Immutability::Mutable);
        };

        if let Some(name) = data.declared_name() {
            match self.overrides.lookup(name) {
                OverrideLookup::Fixed(level) => {
                    trace!(name, level = %level, "override applied");
                    return Outcome::exact(level);
                }
                OverrideLookup::Conditional => {
                    // The condition needs the exact structural level.
                    let mut outcome = self.compute_structure(data, Immutability::Unknown);
                    // An unresolved back edge counts as the optimistic top.
                    let computed = outcome.level.resolve_unknown(Immutability::Immutable);
                    outcome.level = self.overrides.apply(name, computed);
                    return outcome;
                }
                OverrideLookup::None => {}
            }
        }

        self.compute_structure(data, threshold)
    }

    fn compute_structure(&mut self, data: &'g TypeData, threshold: Immutability) -> Outcome {
        use Immutability::{Immutable, Mutable, ReadonlyDeep, ReadonlyShallow};

        match data {
            TypeData::Primitive(_) | TypeData::Function(_) => Outcome::exact(Immutable),
            TypeData::Object(shape) => self.compute_object(shape, threshold),
            TypeData::Array(shape) => {
                if !shape.readonly {
                    return Outcome::exact(Mutable);
                }
                self.meet_members(
                    std::iter::once(shape.element),
                    |level| level.clamp_level(ReadonlyShallow, ReadonlyDeep),
                    threshold,
                )
            }
            TypeData::Tuple(shape) => {
                if !shape.readonly {
                    return Outcome::exact(Mutable);
                }
                if shape.elements.is_empty() {
                    return Outcome::exact(ReadonlyDeep);
                }
                self.meet_members(
                    shape.elements.iter().map(|elem| elem.type_id),
                    |level| level.clamp_level(ReadonlyShallow, ReadonlyDeep),
                    threshold,
                )
            }
            TypeData::Map(shape) => {
                if !shape.readonly {
                    return Outcome::exact(Mutable);
                }
                self.meet_members(
                    std::iter::once(shape.key).chain(shape.value),
                    |level| level.clamp_level(ReadonlyShallow, Immutable),
                    threshold,
                )
            }
            TypeData::Union(members) => {
                if members.is_empty() {
                    return Outcome::exact(Immutable);
                }
                self.meet_members(members.iter().copied(), |level| level, threshold)
            }
            TypeData::Intersection(members) => {
                if members.is_empty() {
                    return Outcome::exact(Mutable);
                }
                self.join_members(members, threshold)
            }
            TypeData::Reference(shape) => match shape.target {
                Some(target) => self.visit(target, threshold),
                None => {
                    trace!(name = %shape.name, "unresolved reference");
                    Outcome::exact(Mutable)
                }
            },
            TypeData::TypeParameter(info) => match info.constraint {
                Some(constraint) => self.visit(constraint, threshold),
                None => Outcome::exact(Mutable),
            },
            TypeData::Unsupported(text) => {
                trace!(text = %text, "unsupported type shape");
                Outcome::exact(Mutable)
            }
        }
    }

    fn compute_object(&mut self, shape: &'g ObjectShape, threshold: Immutability) -> Outcome {
        if shape.member_count() == 0 {
            return Outcome::exact(Immutability::Immutable);
        }

        let shallow_mutable = shape.properties.iter().any(|prop| !prop.is_readonly())
            || shape.index_signatures.iter().any(|sig| !sig.readonly);
        if shallow_mutable {
            return Outcome::exact(Immutability::Mutable);
        }

        let members = shape
            .properties
            .iter()
            .map(|prop| prop.type_id)
            .chain(shape.index_signatures.iter().map(|sig| sig.value_type));
        self.meet_members(
            members,
            |level| level.clamp_level(Immutability::ReadonlyShallow, Immutability::ReadonlyDeep),
            threshold,
        )
    }

    fn meet_members(
        &mut self,
        members: impl IntoIterator<Item = TypeId>,
        lift: impl Fn(Immutability) -> Immutability,
        threshold: Immutability,
    ) -> Outcome {
        let mut outcome = Outcome::exact(Immutability::Unknown);
        for member in members {
            let child = self.visit(member, threshold);
            outcome.absorb(child);
            outcome.level = meet(outcome.level, lift(child.level));

            if outcome.level == Immutability::Mutable {
                // Bottom: no later member can change the result.
                break;
            }
            if below(outcome.level, threshold) {
                outcome.partial = true;
                break;
            }
        }
        outcome
    }

    fn join_members(&mut self, members: &[TypeId], threshold: Immutability) -> Outcome {
        let mut outcome = Outcome::exact(Immutability::Unknown);
        let mut joined: Option<Immutability> = None;
        let mut optimistic = false;
        // No early exit: a settling component must see the same members on
        // every round.
        for &member in members {
            let child = self.visit(member, threshold);
            outcome.absorb(child);
            if child.level.is_unknown() {
                // A back edge is the optimistic top, and the top absorbs a join.
                optimistic = true;
            } else {
                joined = Some(joined.map_or(child.level, |level| join(level, child.level)));
            }
        }
        if !optimistic {
            outcome.level = joined.unwrap_or(Immutability::Mutable);
        }
        outcome
    }
}

#[inline]
fn below(level: Immutability, threshold: Immutability) -> bool {
    !threshold.is_unknown() && level < threshold
}

/// One-shot classification with a fresh cache.
///
/// Prefer an [`ImmutabilityClassifier`] when classifying more than one node
/// of the same graph.
pub fn classify<G: TypeGraph + ?Sized>(
    graph: &G,
    type_id: TypeId,
    overrides: &OverrideTable,
    threshold: Immutability,
) -> Immutability {
    ImmutabilityClassifier::new(graph, overrides.clone()).classify(type_id, threshold)
}

#[cfg(test)]
#[path = "../tests/classify_tests.rs"]
mod tests;
