use std::{collections::BTreeMap, path::Path, sync::Arc};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    commands::load_output,
    hierarchy::{HierarchicalClassifier, HierarchicalResult, OneShotClassifier, OneShotResult},
    ontology::{OntologyCatalogue, Term, load_catalogue, load_terms},
    oracle::Oracle,
    taxonomy::JsonStore,
};

/// Either the one-shot answer or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneShotOutcome {
    Classified(OneShotResult),
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OntologyOutcome {
    pub one_shot: OneShotOutcome,
    pub hierarchical: HierarchicalResult,
}

/// One line of the classify output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub term: String,
    #[serde(default)]
    pub description: String,
    pub model: String,
    pub ontologies: BTreeMap<String, OntologyOutcome>,
}

/// Classifies every term against every ontology, one term at a time.
///
/// Returns how many terms were newly classified. A cancelled run keeps every finished term
/// and drops the one in flight.
pub async fn run_classify(
    oracle: Arc<dyn Oracle>,
    terms_path: &Path,
    ontologies_path: &Path,
    output: &Path,
    limit: Option<usize>,
    cancel: &CancellationToken,
) -> Result<usize> {
    let mut terms = load_terms(terms_path)?;
    if let Some(limit) = limit {
        terms.truncate(limit);
    }
    let catalogue = load_catalogue(ontologies_path)?;
    let store = JsonStore::new(output);
    let mut records: Vec<ClassificationRecord> = load_output(&store)?;

    let model = oracle.model_id().to_string();
    let one_shot = OneShotClassifier::new(Arc::clone(&oracle));
    let hierarchical = HierarchicalClassifier::new(oracle);

    let mut classified = 0;
    for (index, term) in terms.iter().enumerate() {
        if records.iter().any(|record| record.term == term.term) {
            println!(
                "[{}/{}] {}: already classified",
                index + 1,
                terms.len(),
                term.term
            );
            continue;
        }

        let ontologies = classify_term(&one_shot, &hierarchical, &catalogue, term).await;
        if cancel.is_cancelled() {
            tracing::warn!(
                target: "commands",
                term = %term.term,
                "classification_discarded_on_cancel"
            );
            println!("cancelled; {} left unsaved", term.term);
            break;
        }

        println!(
            "[{}/{}] {}: {}",
            index + 1,
            terms.len(),
            term.term,
            summarize(&ontologies)
        );
        records.push(ClassificationRecord {
            term: term.term.clone(),
            description: term.description_or_empty().to_string(),
            model: model.clone(),
            ontologies,
        });
        store
            .save(&records)
            .with_context(|| format!("failed to persist classification of {}", term.term))?;
        classified += 1;
    }

    Ok(classified)
}

async fn classify_term(
    one_shot: &OneShotClassifier,
    hierarchical: &HierarchicalClassifier,
    catalogue: &OntologyCatalogue,
    term: &Term,
) -> BTreeMap<String, OntologyOutcome> {
    let mut outcomes = BTreeMap::new();
    for (name, tree) in catalogue {
        let one_shot = match one_shot.classify(tree, term).await {
            Ok(result) => OneShotOutcome::Classified(result),
            Err(err) => {
                tracing::warn!(
                    target: "commands",
                    ontology = %name,
                    term = %term.term,
                    error = %err,
                    "one_shot_failed"
                );
                OneShotOutcome::Failed {
                    error: err.to_string(),
                }
            }
        };
        let hierarchical = hierarchical.classify(tree, term).await;
        outcomes.insert(
            name.clone(),
            OntologyOutcome {
                one_shot,
                hierarchical,
            },
        );
    }
    outcomes
}

fn summarize(ontologies: &BTreeMap<String, OntologyOutcome>) -> String {
    ontologies
        .iter()
        .map(|(name, outcome)| {
            let one_shot = match &outcome.one_shot {
                OneShotOutcome::Classified(result) => result.classification.as_str(),
                OneShotOutcome::Failed { .. } => "error",
            };
            format!(
                "{name}: one-shot={one_shot}, hierarchical={}",
                outcome.hierarchical.final_class
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
