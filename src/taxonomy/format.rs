use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    ontology::{MetaProperties, Term},
    taxonomy::TaxonomyGraph,
};

/// Persisted taxonomy output: `{model, datasets: [{domain, taxonomy}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxonomyRun {
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub datasets: Vec<DomainTaxonomy>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainTaxonomy {
    pub domain: String,
    #[serde(default)]
    pub taxonomy: TaxonomyGraph,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DomainTaxonomy {
    pub fn new(domain: impl Into<String>, taxonomy: TaxonomyGraph) -> Self {
        Self {
            domain: domain.into(),
            taxonomy,
            extra: Map::new(),
        }
    }
}

impl TaxonomyRun {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            datasets: Vec::new(),
        }
    }

    pub fn domain(&self, name: &str) -> Option<&DomainTaxonomy> {
        self.datasets.iter().find(|dataset| dataset.domain == name)
    }

    /// Replaces the entry for the same domain in place, or appends a new one.
    pub fn upsert(&mut self, dataset: DomainTaxonomy) {
        match self
            .datasets
            .iter_mut()
            .find(|existing| existing.domain == dataset.domain)
        {
            Some(existing) => *existing = dataset,
            None => self.datasets.push(dataset),
        }
    }
}

/// Gold/metadata input: `{datasets: [{domain, dataset: [{term, properties}]}]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GoldFile {
    #[serde(default)]
    pub datasets: Vec<GoldDataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldDataset {
    pub domain: String,
    #[serde(default)]
    pub dataset: Vec<GoldEntry>,
    /// Plain term names, used by inputs that carry no per-term records.
    #[serde(rename = "terms", default, skip_serializing_if = "Vec::is_empty")]
    pub term_names: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoldEntry {
    pub term: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default)]
    pub properties: MetaProperties,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub reasoning: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
}

impl GoldEntry {
    pub fn from_term(term: &Term) -> Self {
        Self {
            term: term.term.clone(),
            description: term.description.clone(),
            usage: term.usage.clone(),
            properties: MetaProperties::default(),
            reasoning: BTreeMap::new(),
            classification: None,
        }
    }

    pub fn to_term(&self) -> Term {
        Term {
            term: self.term.clone(),
            description: self.description.clone(),
            usage: self.usage.clone(),
        }
    }
}

impl GoldFile {
    pub fn domain(&self, name: &str) -> Option<&GoldDataset> {
        self.datasets.iter().find(|dataset| dataset.domain == name)
    }

    pub fn domain_mut(&mut self, name: &str) -> Option<&mut GoldDataset> {
        self.datasets.iter_mut().find(|dataset| dataset.domain == name)
    }
}

impl GoldDataset {
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            dataset: Vec::new(),
            term_names: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Per-term records when present, otherwise the plain `terms` list.
    pub fn terms(&self) -> Vec<Term> {
        if self.dataset.is_empty() {
            return self.term_names.iter().map(Term::new).collect();
        }
        self.dataset.iter().map(GoldEntry::to_term).collect()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.dataset.iter().any(|entry| entry.term == term)
    }

    /// Properties by term; entries without any property count as missing.
    pub fn properties(&self) -> BTreeMap<String, MetaProperties> {
        self.dataset
            .iter()
            .filter(|entry| !entry.properties.is_empty())
            .map(|entry| (entry.term.clone(), entry.properties))
            .collect()
    }
}
