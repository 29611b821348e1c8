//! Resolution layer for the creature companion data.
//!
//! This crate answers "where does it spawn", "who learns this move" and
//! "what does it evolve into" by reading the host's live object graph first
//! and the bundled static documents second. Consumers embed [`Dex`] and
//! query it from any thread; every expensive structure is built once,
//! lazily or on a background worker, and published atomically.
//!
//! Modules are organized by responsibility:
//! - [`dex`] hosts the facade and its builder
//! - [`live`] defines the adapter traits a host implements
//! - [`normalize`] turns live or static spawn rules into [`SpawnCondition`]s
//! - [`resolver`] and [`index`] provide the one-shot loaders
//! - [`evolution`] and [`tags`] memoize per-query results
//! - [`config`] reads `dex.toml` and `DEX_*` environment variables
pub mod config;
pub mod dex;
pub mod error;
pub mod evolution;
pub mod index;
pub mod library;
pub mod live;
pub mod normalize;
pub mod relations;
pub mod resolver;
pub mod tags;

mod worker;

pub use config::DexConfig;
pub use dex::{DataKind, Dex, DexBuilder, SourceStatus};
pub use dex_core::SpawnCondition;
pub use error::{DexError, Result};
pub use evolution::EvolutionGraphResolver;
pub use index::{ReverseIndex, ReverseIndexBuilder};
pub use library::SharedLibrary;
pub use live::{
    LiveBiomeRef, LiveCondition, LiveConditionEntry, LiveMultiplier, LiveMultiplierEntry,
    LiveSource, LiveSpawnEntry, LiveSpawnRecord, LiveSpecies, LiveSpeciesEntry, MemoryLiveSource,
    MemoryTagRegistry, NoLiveSource, StaticSpecies, TagRegistry,
};
pub use normalize::{NormalizedRule, normalize_live, normalize_static};
pub use relations::UNKNOWN_ORDINAL;
pub use resolver::{DualSourceResolver, LoadState, SourceKind};
pub use tags::TagResolutionCache;
