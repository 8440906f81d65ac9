//! Single-shot baseline: one oracle call proposes the whole domain taxonomy.

use std::{collections::BTreeSet, sync::Arc};

use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    oracle::{MalformedResponse, Oracle, OracleError, OracleRequest, normalize},
    taxonomy::{ClosedWorldReference, TaxonomyGraph},
};

const GENERATOR_SYSTEM_PROMPT: &str =
    "You are an Expert Taxonomist. You answer with a single JSON object.";

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error("generated taxonomy is unusable: {0}")]
    InvalidTaxonomy(String),
}

impl GeneratorError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Oracle(err) if err.is_cancelled())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedTaxonomy {
    pub graph: TaxonomyGraph,
    /// Proposed edges kept out of the graph: unknown terms or self-parents.
    pub rejected: Vec<ClosedWorldReference>,
}

pub fn generation_prompt(terms: &[String]) -> String {
    let input = json!(terms).to_string();
    format!(
        r#"Objective: terms from one domain are provided. Identify strict "Is-A" (subclass) relationships between them if and only if they exist.

Input List: {input}

Constraints and Rules:
1. Strict "Is-A" ONLY.
   - "Sparrow" -> "Bird" (YES, a Sparrow IS A Bird).
   - "Wheel" -> "Car" (NO, a Wheel is PART OF a Car).
   - "Baker" -> "Bread" (NO, a Baker MAKES Bread).
   - "Gold" -> "Ring" (NO, a Ring is MADE OF Gold).
2. Closed World: you can ONLY use terms from the Input List as parents.
3. Disconnectivity is fine: many terms will have NO parent in this list. Do not force a connection.
   If "Dog" and "Computer" are the only terms, neither is the parent of the other. Return [] for both.
4. Multiple Parents are allowed only if valid (e.g. "Mother" may be a child of both "Female" and "Parent").

Task: for every term in the input list, return the list of its direct parents from the list.

Output Format: a JSON object whose "taxonomy" maps each term to a list of parent strings.
{{
  "taxonomy": {{
    "Term A": ["Parent B"],
    "Term B": [],
    "Term C": []
  }}
}}
"#
    )
}

#[derive(Clone)]
pub struct TaxonomyGenerator {
    oracle: Arc<dyn Oracle>,
}

impl TaxonomyGenerator {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }

    pub async fn generate(
        &self,
        domain: &str,
        terms: &[String],
    ) -> Result<GeneratedTaxonomy, GeneratorError> {
        let request = OracleRequest::new(
            Uuid::now_v7().to_string(),
            GENERATOR_SYSTEM_PROMPT,
            generation_prompt(terms),
        );
        let text = self.oracle.complete(request).await?;
        let decision = normalize(&text)?;
        let proposed = decision
            .get("taxonomy")
            .cloned()
            .ok_or_else(|| {
                GeneratorError::InvalidTaxonomy("missing `taxonomy` object".to_string())
            })?;
        let proposed: TaxonomyGraph = serde_json::from_value(proposed)
            .map_err(|err| GeneratorError::InvalidTaxonomy(err.to_string()))?;

        let generated = admit(terms, &proposed);
        if !generated.rejected.is_empty() {
            tracing::warn!(
                target: "generator",
                domain = domain,
                rejected = ?generated.rejected,
                "closed_world_references_rejected"
            );
        }
        tracing::debug!(
            target: "generator",
            domain = domain,
            terms = generated.graph.len(),
            links = generated.graph.edge_count(),
            roots = generated.graph.roots().count(),
            "taxonomy_generated"
        );
        Ok(generated)
    }
}

/// Keeps only edges between distinct terms of the universe; every term ends up placed.
pub fn admit(terms: &[String], proposed: &TaxonomyGraph) -> GeneratedTaxonomy {
    let universe = terms.iter().map(String::as_str).collect::<BTreeSet<_>>();
    let mut generated = GeneratedTaxonomy::default();

    for term in &universe {
        generated.graph.insert_term(term);
    }

    for (child, parent) in proposed.edges() {
        if child == parent || !universe.contains(child) || !universe.contains(parent) {
            generated.rejected.push(ClosedWorldReference {
                child: child.to_string(),
                parent: parent.to_string(),
            });
            continue;
        }
        generated.graph.add_edge(child, parent);
    }

    generated
}
