use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::{
    commands::{load_input, load_output},
    generator::TaxonomyGenerator,
    taxonomy::{DomainTaxonomy, GoldFile, JsonStore, TaxonomyRun},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// One single-shot taxonomy per domain; domains already in `output` are left alone.
pub async fn run_generate(
    generator: &TaxonomyGenerator,
    model: &str,
    input: &Path,
    output: &Path,
) -> Result<GenerateSummary> {
    let gold: GoldFile = load_input(input)?;
    let store = JsonStore::new(output);
    let mut run: TaxonomyRun = load_output(&store)?;
    run.model = model.to_string();

    let mut summary = GenerateSummary::default();
    for dataset in &gold.datasets {
        if run.domain(&dataset.domain).is_some() {
            println!("[{}] already generated, skipping", dataset.domain);
            summary.skipped += 1;
            continue;
        }

        let terms = dataset
            .terms()
            .into_iter()
            .map(|term| term.term)
            .collect::<Vec<_>>();
        let generated = match generator.generate(&dataset.domain, &terms).await {
            Ok(generated) => generated,
            Err(err) if err.is_cancelled() => {
                bail!("generation cancelled in domain {}: {err}", dataset.domain)
            }
            Err(err) => {
                tracing::warn!(
                    target: "commands",
                    domain = %dataset.domain,
                    error = %err,
                    "domain_generation_failed"
                );
                println!("[{}] failed: {err}", dataset.domain);
                summary.failed += 1;
                continue;
            }
        };

        println!(
            "[{}] {} term(s), {} link(s), {} rejected reference(s)",
            dataset.domain,
            generated.graph.len(),
            generated.graph.edge_count(),
            generated.rejected.len()
        );
        run.upsert(DomainTaxonomy::new(&dataset.domain, generated.graph));
        store
            .save(&run)
            .with_context(|| format!("failed to persist domain {}", dataset.domain))?;
        summary.generated += 1;
    }

    Ok(summary)
}
