//! Read-only domain vocabulary: terms, their meta-properties, and fixed class trees.

pub mod meta;
pub mod term;
pub mod tree;

use std::path::PathBuf;

use thiserror::Error;

pub use meta::{
    Dependence, Identity, MetaProperties, OwnIdentity, Property, PropertyValueError, Rigidity,
    Unity,
};
pub use term::{Term, load_terms};
pub use tree::{OntologyCatalogue, OntologyTree, load_catalogue};

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("failed to read '{}': {source}", .path.display())]
    Io {
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
    #[error("ontology `{ontology}` is not a tree: {reason}")]
    MalformedTree { ontology: String, reason: String },
    #[error("term list is invalid: {0}")]
    InvalidTerms(String),
}
