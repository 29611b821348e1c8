//! Static document formats and tolerant loaders.
//!
//! This crate houses the bundled, always-present side of the data layer:
//! - Species documents (abilities, learnsets, drops, evolutions, egg groups)
//! - Spawn pool documents (spawn rules with conditions and multipliers)
//! - Document sources (directory tree or in-memory)
//! - TOML configuration loading
//!
//! Loaders never abort a scan because one document is malformed; the
//! document is logged, recorded as skipped and the scan continues.

pub mod formats;
pub mod loaders;

pub use formats::{
    ConditionDocument, DropEntryDocument, DropTableDocument, EvolutionDocument, FormDocument,
    MultiplierDocument, SpawnPoolDocument, SpawnRuleDocument, SpeciesDocument,
};
pub use loaders::{
    ConfigLoader, DirectorySource, DocumentKind, DocumentSource, LoadResult, MemorySource,
    SkippedDocument, StaticLibrary, document_id,
};
