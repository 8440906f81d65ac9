use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize, Serializer};

use crate::taxonomy::TaxonomyError;

/// Child term to its set of parent terms. An empty set marks a root.
///
/// Edges are only ever added; once a term is placed its accepted parents stay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "RawTaxonomy")]
pub struct TaxonomyGraph {
    edges: BTreeMap<String, BTreeSet<String>>,
}

/// A parent reference that points outside the domain's term universe.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClosedWorldReference {
    pub child: String,
    pub parent: String,
}

impl TaxonomyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `child` under exactly `parents` (none makes it a root).
    pub fn place<I, S>(&mut self, child: &str, parents: I) -> Result<(), TaxonomyError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.edges.contains_key(child) {
            return Err(TaxonomyError::AlreadyPlaced(child.to_string()));
        }
        self.edges.insert(
            child.to_string(),
            parents.into_iter().map(Into::into).collect(),
        );
        Ok(())
    }

    /// Ensures `term` is present; returns `true` when it was newly added as a root.
    pub fn insert_term(&mut self, term: &str) -> bool {
        if self.edges.contains_key(term) {
            return false;
        }
        self.edges.insert(term.to_string(), BTreeSet::new());
        true
    }

    /// Adds one edge; returns `false` when it already existed.
    pub fn add_edge(&mut self, child: &str, parent: &str) -> bool {
        self.edges
            .entry(child.to_string())
            .or_default()
            .insert(parent.to_string())
    }

    pub fn contains(&self, term: &str) -> bool {
        self.edges.contains_key(term)
    }

    pub fn parents(&self, term: &str) -> Option<&BTreeSet<String>> {
        self.edges.get(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.edges.keys().map(String::as_str)
    }

    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().flat_map(|(child, parents)| {
            parents
                .iter()
                .map(move |parent| (child.as_str(), parent.as_str()))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    pub fn roots(&self) -> impl Iterator<Item = &str> {
        self.edges
            .iter()
            .filter(|(_, parents)| parents.is_empty())
            .map(|(term, _)| term.as_str())
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl Serialize for TaxonomyGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.edges.serialize(serializer)
    }
}

/// Older runs stored a single parent as a bare string or `null` for roots.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawParents {
    Many(Vec<Option<String>>),
    One(String),
}

#[derive(Deserialize)]
#[serde(transparent)]
struct RawTaxonomy(BTreeMap<String, Option<RawParents>>);

impl From<RawTaxonomy> for TaxonomyGraph {
    fn from(raw: RawTaxonomy) -> Self {
        let edges = raw
            .0
            .into_iter()
            .map(|(child, parents)| {
                let parents = match parents {
                    Some(RawParents::Many(parents)) => parents.into_iter().flatten().collect(),
                    Some(RawParents::One(parent)) => vec![parent],
                    None => Vec::new(),
                };
                let parents = parents
                    .into_iter()
                    .filter(|parent| !parent.trim().is_empty())
                    .collect();
                (child, parents)
            })
            .collect();
        Self { edges }
    }
}
