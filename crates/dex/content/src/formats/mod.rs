//! Serde shapes of the bundled static documents.

mod fields;
pub mod requirement;
pub mod spawn;
pub mod species;

pub use requirement::parse_requirement;
pub use spawn::{ConditionDocument, MultiplierDocument, SpawnPoolDocument, SpawnRuleDocument};
pub use species::{
    DropEntryDocument, DropTableDocument, EvolutionDocument, FormDocument, SpeciesDocument,
};
