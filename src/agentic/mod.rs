//! Taxonomy construction by negotiation between a Taxonomist and a Critic.

pub mod builder;
pub mod negotiation;
pub mod prompts;

use thiserror::Error;

use crate::{oracle::OracleError, taxonomy::TaxonomyError};

pub use builder::{
    AgenticBuilder, DEFAULT_ROOT_SENTINEL, DiscardProgress, DomainContext, ProgressSink,
};
pub use negotiation::{MAX_ATTEMPTS, NegotiationRound, Resolution, RoundOutcome, TermResolution};

#[derive(Debug, Error)]
pub enum AgenticError {
    #[error("agentic run cancelled: {0}")]
    Cancelled(OracleError),
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
}
