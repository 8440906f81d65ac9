//! Per-property agents that derive OntoClean meta-properties for a term.

pub mod prompts;

use std::{collections::BTreeMap, sync::Arc};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    ontology::{Identity, MetaProperties, Property, PropertyValueError, Term},
    oracle::{
        MalformedResponse, Oracle, OracleError, OracleRequest, normalize,
        response_normalizer::string_field,
    },
};

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
    #[error("{} agent returned no `value`", .0.name())]
    MissingValue(Property),
    #[error("closed-world violation: {0}")]
    ClosedWorldViolation(#[from] PropertyValueError),
}

impl AnalyzerError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Oracle(err) if err.is_cancelled())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermAnalysis {
    pub properties: MetaProperties,
    /// Reasoning per property name.
    pub reasoning: BTreeMap<String, String>,
    pub classification: String,
}

/// Cuts `text` to at most `max_chars` characters; the flag reports whether it did.
pub fn truncate_background(text: &str, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => (text[..cut].to_string(), true),
        None => (text.to_string(), false),
    }
}

/// Runs one specialised oracle call per meta-property.
#[derive(Clone)]
pub struct MetaPropertyAnalyzer {
    oracle: Arc<dyn Oracle>,
    backgrounds: BTreeMap<Property, String>,
}

impl MetaPropertyAnalyzer {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            backgrounds: BTreeMap::new(),
        }
    }

    pub fn with_background(mut self, property: Property, background: String) -> Self {
        self.backgrounds.insert(property, background);
        self
    }

    pub async fn analyze(&self, term: &Term) -> Result<TermAnalysis, AnalyzerError> {
        let mut properties = MetaProperties::default();
        let mut reasoning = BTreeMap::new();

        for property in Property::ALL {
            let identity_hint = match property {
                Property::OwnIdentity => properties.identity,
                _ => None,
            };
            let (value, why) = self.ask(property, term, identity_hint).await?;
            properties.set(property, &value)?;
            if let Some(why) = why {
                reasoning.insert(property.name().to_string(), why);
            }
        }

        let classification = properties.classify().to_string();
        tracing::debug!(
            target: "analyzer",
            term = %term.term,
            properties = %properties.describe(),
            classification = %classification,
            "term_analyzed"
        );

        Ok(TermAnalysis {
            properties,
            reasoning,
            classification,
        })
    }

    async fn ask(
        &self,
        property: Property,
        term: &Term,
        identity_hint: Option<Identity>,
    ) -> Result<(String, Option<String>), AnalyzerError> {
        let request = OracleRequest::new(
            Uuid::now_v7().to_string(),
            prompts::property_system_prompt(
                property,
                self.backgrounds.get(&property).map(String::as_str),
                identity_hint,
            ),
            prompts::property_user_prompt(property, term),
        );

        let text = self.oracle.complete(request).await?;
        let decision = normalize(&text).inspect_err(|err| {
            tracing::warn!(
                target: "analyzer",
                term = %term.term,
                property = property.name(),
                raw = %err.raw,
                "malformed_property_response"
            );
        })?;
        let value = string_field(&decision, "value").ok_or(AnalyzerError::MissingValue(property))?;
        Ok((value, string_field(&decision, "reasoning")))
    }
}
