use std::{fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    hierarchy::prompts,
    ontology::{OntologyTree, Term},
    oracle::{Oracle, OracleRequest, normalize, response_normalizer::string_field},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepOutcome {
    Descended,
    /// The oracle chose the current class itself.
    Stayed,
    /// The oracle named something that is not a child of the current class.
    ClosedWorldViolation,
    Failed { error: String },
}

/// One decision of a descent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceStep {
    pub node: String,
    pub selected: Option<String>,
    pub reasoning: Option<String>,
    pub outcome: StepOutcome,
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            StepOutcome::Failed { error } => write!(f, "{} -> (failed): {}", self.node, error),
            _ => write!(
                f,
                "{} -> {}: {}",
                self.node,
                self.selected.as_deref().unwrap_or("(none)"),
                self.reasoning.as_deref().unwrap_or("")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchicalResult {
    pub final_class: String,
    pub path: Vec<String>,
    pub trace: Vec<TraceStep>,
}

/// Walks an ontology tree top-down, asking the oracle for one child per level.
///
/// Always returns a classification: oracle and parse failures stop the descent at the
/// current node and are kept in the trace.
#[derive(Clone)]
pub struct HierarchicalClassifier {
    oracle: Arc<dyn Oracle>,
}

impl HierarchicalClassifier {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    pub async fn classify(&self, tree: &OntologyTree, term: &Term) -> HierarchicalResult {
        let mut current = tree.root().to_string();
        let mut path = vec![current.clone()];
        let mut trace = Vec::new();

        loop {
            let children = tree.children(&current);
            if children.is_empty() {
                break;
            }

            let step = self.step(tree, term, &current, children).await;
            tracing::debug!(
                target: "hierarchy",
                ontology = tree.name(),
                term = %term.term,
                node = %current,
                step = %step,
                "descent_step"
            );

            let next = match step.outcome {
                StepOutcome::Descended => step.selected.clone(),
                _ => None,
            };
            trace.push(step);

            match next {
                Some(child) => {
                    current = child;
                    path.push(current.clone());
                }
                None => break,
            }
        }

        HierarchicalResult {
            final_class: current,
            path,
            trace,
        }
    }

    async fn step(
        &self,
        tree: &OntologyTree,
        term: &Term,
        current: &str,
        children: &[String],
    ) -> TraceStep {
        let request = OracleRequest::new(
            Uuid::now_v7().to_string(),
            prompts::descent_system_prompt(tree, term, current, children),
            prompts::entity_user_prompt(term),
        );

        let decision = match self.oracle.complete(request).await {
            Ok(text) => normalize(&text).map_err(|err| {
                tracing::warn!(
                    target: "hierarchy",
                    term = %term.term,
                    node = %current,
                    raw = %err.raw,
                    "malformed_descent_response"
                );
                err.to_string()
            }),
            Err(err) => Err(err.to_string()),
        };

        let decision = match decision {
            Ok(decision) => decision,
            Err(error) => {
                tracing::warn!(
                    target: "hierarchy",
                    term = %term.term,
                    node = %current,
                    error = %error,
                    "descent_step_failed"
                );
                return TraceStep {
                    node: current.to_string(),
                    selected: None,
                    reasoning: None,
                    outcome: StepOutcome::Failed { error },
                };
            }
        };

        let selected = string_field(&decision, "selected_class");
        let reasoning = string_field(&decision, "reasoning");
        let outcome = match selected.as_deref() {
            Some(selected) if selected == current => StepOutcome::Stayed,
            Some(selected) if children.iter().any(|child| child == selected) => {
                StepOutcome::Descended
            }
            _ => StepOutcome::ClosedWorldViolation,
        };

        TraceStep {
            node: current.to_string(),
            selected,
            reasoning,
            outcome,
        }
    }
}
