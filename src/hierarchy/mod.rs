//! Top-down classification of terms into a fixed upper-ontology tree.

pub mod classifier;
pub mod one_shot;
pub mod prompts;

use thiserror::Error;

use crate::oracle::{MalformedResponse, OracleError};

pub use classifier::{HierarchicalClassifier, HierarchicalResult, StepOutcome, TraceStep};
pub use one_shot::{OneShotClassifier, OneShotResult};

#[derive(Debug, Error)]
pub enum HierarchyError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error("oracle response has no `{0}` field")]
    MissingField(&'static str),
}
