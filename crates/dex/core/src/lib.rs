//! Canonical data model for the creature companion data layer.
//!
//! `dex-core` defines the shapes every upstream source is normalized into
//! (spawn conditions, learners, evolution trees) together with the small
//! collaborator traits the resolver consumes. Nothing in this crate performs
//! I/O; loading and resolution live in `dex-content` and `dex-resolver`.
pub mod env;
pub mod error;
pub mod evolution;
pub mod label;
pub mod learners;
pub mod spawn;
pub mod stats;

pub use env::{IdentityLocalizer, Localizer, SpeciesCatalog, StaticCatalog};
pub use error::{FieldError, FieldResult};
pub use evolution::{EvoNode, EvolutionEdge, MAX_EVOLUTION_DEPTH, Requirement};
pub use label::{format_label, normalize_id, strip_namespace};
pub use learners::{
    AbilityBearer, AbilitySlot, DropEntry, IndexEntry, ItemDropper, LearnMethod, LearnsetEntry,
    MoveLearner, QuantityRange,
};
pub use spawn::{
    BiomeClause, Bounds, DEFAULT_BUCKET, LevelRange, MultiplierConditions, SpawnCondition,
    SpawnKey, TimeOfDay, Weather, WeightMultiplier,
};
pub use stats::EvYield;
