//! Lead dataset ingestion — CSV loading, schema validation, and
//! normalization of raw export rows into the canonical lead table.

pub mod loader;
pub mod normalize;
pub mod schema;

pub use loader::{load_csv, load_from_reader};
pub use normalize::{normalize, QualityReport};
pub use schema::RawLead;
