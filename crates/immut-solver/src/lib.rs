//! Immutability Classification Engine
//!
//! Classifies structural type graphs on the immutability lattice
//! `Mutable < ReadonlyShallow < ReadonlyDeep < Immutable`.
//!
//! - **`TypeGraph`**: read-only adapter over a host's type representation,
//!   with [`TypeArena`] as the in-crate implementation
//! - **Overrides**: named types pinned to a level (`Date`, `Map`, ...)
//! - **Cycle handling**: optimistic `Unknown` seed with SCC-head
//!   finalization, so self-referential types terminate
//! - **Per-pass caching**: one [`ImmutabilityClassifier`] per analysis pass
pub mod classify;
pub mod graph;
pub mod lattice;
pub mod overrides;
mod printer;
pub mod recursion;
pub mod types;

pub use classify::{ImmutabilityClassifier, classify};
pub use graph::{TypeArena, TypeGraph};
pub use lattice::{Immutability, ParseImmutabilityError, compare, join, meet, meet_all};
pub use overrides::{Override, OverrideLookup, OverrideTable, TypeNameMatcher, resolve};
pub use printer::TypePrinter;
pub use types::{
    ArrayShape, FunctionShape, IndexSignature, MapShape, ObjectShape, ParamInfo, PrimitiveKind,
    PropertyInfo, ReferenceShape, TupleElement, TupleShape, TypeData, TypeId, TypeParamInfo,
};
