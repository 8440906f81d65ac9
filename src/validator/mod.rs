//! OntoClean checks over a finished taxonomy: cycles, rigidity, and heuristic traps.

pub mod cycles;
pub mod rules;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    ontology::MetaProperties,
    taxonomy::{GoldFile, TaxonomyGraph, TaxonomyRun},
};

pub use cycles::find_cycles;
pub use rules::{Violation, Warning, WarningKind};

/// Data-integrity note: a referenced term has no meta-properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityNote {
    /// All edges of this child were skipped.
    MissingChild { term: String },
    MissingParent { child: String, parent: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainReport {
    pub domain: String,
    pub violations: Vec<Violation>,
    pub cycles: Vec<Vec<String>>,
    pub warnings: Vec<Warning>,
    pub integrity: Vec<IntegrityNote>,
    pub links_count: usize,
}

impl DomainReport {
    /// Violations plus cycles; warnings and integrity notes never count.
    pub fn critical_count(&self) -> usize {
        self.violations.len() + self.cycles.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub model: String,
    pub domains: Vec<DomainReport>,
    /// Gold domains with no taxonomy to check.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn critical_count(&self) -> usize {
        self.domains.iter().map(DomainReport::critical_count).sum()
    }

    pub fn is_failure(&self) -> bool {
        self.critical_count() > 0
    }
}

pub fn validate_domain(
    domain: &str,
    properties: &BTreeMap<String, MetaProperties>,
    graph: &TaxonomyGraph,
) -> DomainReport {
    let mut report = DomainReport {
        domain: domain.to_string(),
        violations: Vec::new(),
        cycles: find_cycles(graph),
        warnings: Vec::new(),
        integrity: Vec::new(),
        links_count: graph.edge_count(),
    };

    for child in graph.terms() {
        let Some(child_props) = properties.get(child) else {
            report.integrity.push(IntegrityNote::MissingChild {
                term: child.to_string(),
            });
            continue;
        };

        for parent in graph.parents(child).into_iter().flatten() {
            let Some(parent_props) = properties.get(parent) else {
                report.integrity.push(IntegrityNote::MissingParent {
                    child: child.to_string(),
                    parent: parent.clone(),
                });
                continue;
            };

            report.violations.extend(rules::check_rigidity(
                child,
                child_props,
                parent,
                parent_props,
            ));
            report.warnings.extend(rules::check_warnings(
                child,
                child_props,
                parent,
                parent_props,
            ));
        }
    }

    tracing::debug!(
        target: "validator",
        domain = domain,
        links = report.links_count,
        violations = report.violations.len(),
        cycles = report.cycles.len(),
        warnings = report.warnings.len(),
        integrity = report.integrity.len(),
        "domain_validated"
    );
    report
}

/// Validates every gold domain against the taxonomy of the same name.
pub fn validate_run(gold: &GoldFile, run: &TaxonomyRun) -> RunReport {
    let mut report = RunReport {
        model: run.model.clone(),
        ..RunReport::default()
    };

    for dataset in &gold.datasets {
        match run.domain(&dataset.domain) {
            Some(taxonomy) => report.domains.push(validate_domain(
                &dataset.domain,
                &dataset.properties(),
                &taxonomy.taxonomy,
            )),
            None => {
                tracing::info!(
                    target: "validator",
                    domain = %dataset.domain,
                    "domain_missing_from_taxonomy"
                );
                report.skipped.push(dataset.domain.clone());
            }
        }
    }

    report
}
