//! Batch drivers behind the CLI.
//!
//! Each one persists after every unit of work and resumes from its output file.

pub mod analyze;
pub mod build;
pub mod classify;
pub mod generate;
pub mod validate;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::{
    oracle::{ModelId, OpenAiCompatibleOracle, Oracle, OracleConfig},
    taxonomy::JsonStore,
};

pub use analyze::{AnalyzeSummary, analyzer_from_config, run_analyze};
pub use build::{AGENTIC_MODEL_SUFFIX, BuildSummary, run_build};
pub use classify::{ClassificationRecord, OneShotOutcome, OntologyOutcome, run_classify};
pub use generate::{GenerateSummary, run_generate};
pub use validate::{render_report, run_validate};

/// Builds the HTTP oracle for the requested model, or the configured default.
pub fn connect_oracle(
    config: &OracleConfig,
    requested_model: Option<&str>,
    cancel: CancellationToken,
) -> Result<(ModelId, Arc<dyn Oracle>)> {
    let model = config.resolve_model(requested_model);
    let oracle = OpenAiCompatibleOracle::new(config, model.clone(), cancel)
        .with_context(|| format!("failed to set up oracle for model {model}"))?;
    tracing::info!(
        target: "commands",
        model = %model,
        endpoint = %config.endpoint,
        "oracle_connected"
    );
    Ok((model, Arc::new(oracle)))
}

/// Reads an input document that must already exist.
pub(crate) fn load_input<T: DeserializeOwned>(path: &Path) -> Result<T> {
    JsonStore::new(path)
        .load()?
        .ok_or_else(|| anyhow!("input file {} does not exist", path.display()))
}

/// Reads a previous run's output, or `T::default()` when there is none.
pub(crate) fn load_output<T: DeserializeOwned + Default>(store: &JsonStore) -> Result<T> {
    let existing = store
        .load()
        .with_context(|| format!("failed to resume from {}", store.path().display()))?;
    if existing.is_some() {
        tracing::info!(target: "commands", path = %store.path().display(), "resuming_from_output");
    }
    Ok(existing.unwrap_or_default())
}
