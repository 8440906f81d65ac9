//! The child-to-parents graph, its persisted formats, and the atomic run store.

pub mod format;
pub mod graph;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use format::{DomainTaxonomy, GoldDataset, GoldEntry, GoldFile, TaxonomyRun};
pub use graph::{ClosedWorldReference, TaxonomyGraph};
pub use store::JsonStore;

#[derive(Debug, Error)]
pub enum TaxonomyError {
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize '{}': {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("term `{0}` is already placed; accepted edges are never replaced")]
    AlreadyPlaced(String),
}
