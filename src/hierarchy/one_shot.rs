use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    hierarchy::{HierarchyError, prompts},
    ontology::{OntologyTree, Term},
    oracle::{Oracle, OracleRequest, normalize, response_normalizer::string_field},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneShotResult {
    pub classification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// Set when the classification is not one of the offered classes.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub closed_world_violation: bool,
}

/// Classifies a term against the whole flattened class list in one oracle call.
#[derive(Clone)]
pub struct OneShotClassifier {
    oracle: Arc<dyn Oracle>,
}

impl OneShotClassifier {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    pub async fn classify(
        &self,
        tree: &OntologyTree,
        term: &Term,
    ) -> Result<OneShotResult, HierarchyError> {
        let classes = tree.classes();
        let request = OracleRequest::new(
            Uuid::now_v7().to_string(),
            prompts::one_shot_system_prompt(tree, &classes),
            prompts::one_shot_user_prompt(term),
        );

        let text = self.oracle.complete(request).await?;
        let decision = normalize(&text)?;
        let classification = string_field(&decision, "classification")
            .ok_or(HierarchyError::MissingField("classification"))?;
        let closed_world_violation = !tree.contains(&classification);
        if closed_world_violation {
            tracing::warn!(
                target: "hierarchy",
                ontology = tree.name(),
                term = %term.term,
                classification = %classification,
                "one_shot_closed_world_violation"
            );
        }

        Ok(OneShotResult {
            closed_world_violation,
            confidence: string_field(&decision, "confidence"),
            reasoning: string_field(&decision, "reasoning"),
            classification,
        })
    }
}
