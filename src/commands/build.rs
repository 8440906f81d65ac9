use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    agentic::{
        AgenticBuilder, AgenticError, DomainContext, ProgressSink, Resolution, TermResolution,
    },
    commands::{load_input, load_output},
    taxonomy::{DomainTaxonomy, GoldFile, JsonStore, TaxonomyGraph, TaxonomyRun},
};

pub const AGENTIC_MODEL_SUFFIX: &str = "-agentic";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub domains: usize,
    pub resolved: usize,
    pub fallbacks: usize,
    /// Terms found already placed in the output file.
    pub resumed: usize,
}

/// Upserts the growing domain graph and rewrites the output after every term.
struct PersistingSink<'a> {
    store: &'a JsonStore,
    run: &'a mut TaxonomyRun,
}

impl ProgressSink for PersistingSink<'_> {
    fn term_resolved(
        &mut self,
        domain: &str,
        graph: &TaxonomyGraph,
        resolution: &TermResolution,
    ) -> Result<(), AgenticError> {
        self.run.upsert(DomainTaxonomy::new(domain, graph.clone()));
        self.store.save(&*self.run)?;
        println!("{}", progress_line(domain, resolution));
        Ok(())
    }
}

fn progress_line(domain: &str, resolution: &TermResolution) -> String {
    let placement = match resolution.parents.as_slice() {
        [] => "root".to_string(),
        parents => parents.join(", "),
    };
    let verdict = match resolution.resolution {
        Resolution::Approved => "approved",
        Resolution::FallbackRoot => "fallback",
    };
    format!(
        "[{domain}] {} -> {placement} ({verdict}, {} round(s))",
        resolution.term,
        resolution.rounds.len()
    )
}

/// Builds one agentic taxonomy per gold domain into `output`, resuming whatever is already there.
pub async fn run_build(
    builder: &AgenticBuilder,
    model: &str,
    input: &Path,
    output: &Path,
) -> Result<BuildSummary> {
    let gold: GoldFile = load_input(input)?;
    let store = JsonStore::new(output);
    let mut run: TaxonomyRun = load_output(&store)?;
    run.model = format!("{model}{AGENTIC_MODEL_SUFFIX}");

    let mut summary = BuildSummary::default();
    for dataset in &gold.datasets {
        let terms = dataset.terms();
        let context = DomainContext::new(&dataset.domain, terms.into_iter().map(|t| t.term))
            .with_properties(dataset.properties());
        let mut graph = run
            .domain(&dataset.domain)
            .map(|existing| existing.taxonomy.clone())
            .unwrap_or_default();

        let pending = context
            .visitation_order()
            .into_iter()
            .filter(|term| !graph.contains(term))
            .count();
        summary.resumed += context.visitation_order().len() - pending;
        summary.domains += 1;
        if pending == 0 {
            println!("[{}] already complete, skipping", dataset.domain);
            continue;
        }
        println!(
            "[{}] placing {pending} term(s) with root sentinel \"{}\"",
            dataset.domain,
            builder.root_sentinel()
        );

        let mut sink = PersistingSink {
            store: &store,
            run: &mut run,
        };
        let resolutions = builder
            .build_domain(&context, &mut graph, &mut sink)
            .await
            .with_context(|| {
                format!(
                    "agentic build stopped in domain {}; finished terms are saved in {}",
                    dataset.domain,
                    output.display()
                )
            })?;

        summary.resolved += resolutions.len();
        summary.fallbacks += resolutions
            .iter()
            .filter(|resolution| resolution.resolution == Resolution::FallbackRoot)
            .count();
        tracing::info!(
            target: "commands",
            domain = %dataset.domain,
            resolved = resolutions.len(),
            links = graph.edge_count(),
            "domain_built"
        );
    }

    // An input with nothing left to place still records the run's model.
    store.save(&run)?;
    Ok(summary)
}
