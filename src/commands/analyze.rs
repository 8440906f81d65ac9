use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use crate::{
    analyzer::{MetaPropertyAnalyzer, truncate_background},
    commands::{load_input, load_output},
    config::AnalyzerConfig,
    ontology::{Property, Term},
    oracle::Oracle,
    taxonomy::{GoldDataset, GoldEntry, GoldFile, JsonStore},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyzeSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Attaches configured background texts, truncated to `max_background_chars`.
pub fn analyzer_from_config(
    oracle: Arc<dyn Oracle>,
    config: &AnalyzerConfig,
) -> Result<MetaPropertyAnalyzer> {
    let mut analyzer = MetaPropertyAnalyzer::new(oracle);
    for (name, path) in &config.background_files {
        let property = Property::from_name(name)
            .ok_or_else(|| anyhow!("analyzer.background_files has unknown property {name}"))?;
        let text = fs::read_to_string(path).with_context(|| {
            format!(
                "failed to read background for {name} from {}",
                path.display()
            )
        })?;
        let (text, truncated) = truncate_background(&text, config.max_background_chars);
        if truncated {
            tracing::warn!(
                target: "commands",
                property = name.as_str(),
                max_chars = config.max_background_chars,
                "background_truncated"
            );
        }
        analyzer = analyzer.with_background(property, text);
    }
    Ok(analyzer)
}

/// Reads either a gold file or a bare term list; a bare list lands in `domain`, else the file stem.
fn load_domains(input: &Path, domain: Option<&str>) -> Result<Vec<GoldDataset>> {
    let value: Value = load_input(input)?;
    if value.is_array() {
        let terms: Vec<Term> = serde_json::from_value(value)
            .with_context(|| format!("failed to read terms from {}", input.display()))?;
        let name = domain
            .map(str::to_string)
            .or_else(|| input.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "default".to_string());
        let mut dataset = GoldDataset::new(name);
        dataset.dataset = terms.iter().map(GoldEntry::from_term).collect();
        return Ok(vec![dataset]);
    }

    let gold: GoldFile = serde_json::from_value(value)
        .with_context(|| format!("failed to read datasets from {}", input.display()))?;
    Ok(match domain {
        Some(domain) => gold
            .datasets
            .into_iter()
            .filter(|dataset| dataset.domain == domain)
            .collect(),
        None => gold.datasets,
    })
}

/// Derives meta-properties for every term, writing the gold format after each one.
pub async fn run_analyze(
    analyzer: &MetaPropertyAnalyzer,
    input: &Path,
    output: &Path,
    domain: Option<&str>,
) -> Result<AnalyzeSummary> {
    let datasets = load_domains(input, domain)?;
    let store = JsonStore::new(output);
    let mut gold: GoldFile = load_output(&store)?;

    let mut summary = AnalyzeSummary::default();
    for dataset in &datasets {
        if gold.domain(&dataset.domain).is_none() {
            gold.datasets.push(GoldDataset::new(&dataset.domain));
        }

        for term in dataset.terms() {
            if gold
                .domain(&dataset.domain)
                .is_some_and(|existing| existing.contains(&term.term))
            {
                summary.skipped += 1;
                continue;
            }

            let analysis = match analyzer.analyze(&term).await {
                Ok(analysis) => analysis,
                Err(err) if err.is_cancelled() => {
                    bail!(
                        "analysis cancelled at {} / {}: {err}",
                        dataset.domain,
                        term.term
                    )
                }
                Err(err) => {
                    tracing::warn!(
                        target: "commands",
                        domain = %dataset.domain,
                        term = %term.term,
                        error = %err,
                        "term_analysis_failed"
                    );
                    println!("[{}] {}: failed: {err}", dataset.domain, term.term);
                    summary.failed += 1;
                    continue;
                }
            };

            println!(
                "[{}] {}: {} => {}",
                dataset.domain,
                term.term,
                analysis.properties.describe(),
                analysis.classification
            );
            let mut entry = GoldEntry::from_term(&term);
            entry.properties = analysis.properties;
            entry.reasoning = analysis.reasoning;
            entry.classification = Some(analysis.classification);
            if let Some(target) = gold.domain_mut(&dataset.domain) {
                target.dataset.push(entry);
            }
            store
                .save(&gold)
                .with_context(|| format!("failed to persist analysis of {}", term.term))?;
            summary.analyzed += 1;
        }
    }

    Ok(summary)
}
