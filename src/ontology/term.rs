use std::{collections::BTreeSet, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::ontology::OntologyError;

/// A domain term with optional free-text context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
}

impl Term {
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            description: None,
            usage: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

/// Loads `[{"term", "description", "usage"?}]`; terms must be non-empty and unique.
pub fn load_terms(path: &Path) -> Result<Vec<Term>, OntologyError> {
    let text = fs::read_to_string(path).map_err(|source| OntologyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let terms: Vec<Term> = serde_json::from_str(&text).map_err(|source| OntologyError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    check_unique(&terms)?;
    Ok(terms)
}

pub(crate) fn check_unique(terms: &[Term]) -> Result<(), OntologyError> {
    let mut seen = BTreeSet::new();
    for term in terms {
        if term.term.trim().is_empty() {
            return Err(OntologyError::InvalidTerms("empty term name".to_string()));
        }
        if !seen.insert(term.term.as_str()) {
            return Err(OntologyError::InvalidTerms(format!("duplicate term `{}`", term.term)));
        }
    }
    Ok(())
}
