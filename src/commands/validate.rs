use std::{fmt::Write as _, path::Path};

use anyhow::Result;

use crate::{
    commands::load_input,
    taxonomy::{GoldFile, TaxonomyRun},
    validator::{DomainReport, IntegrityNote, RunReport, validate_run},
};

/// Validates `taxonomy` against the meta-properties in `gold` and prints the report.
pub fn run_validate(gold: &Path, taxonomy: &Path) -> Result<RunReport> {
    let gold: GoldFile = load_input(gold)?;
    let run: TaxonomyRun = load_input(taxonomy)?;

    let report = validate_run(&gold, &run);
    print!("{}", render_report(&report));
    tracing::info!(
        target: "commands",
        model = %report.model,
        domains = report.domains.len(),
        skipped = report.skipped.len(),
        critical = report.critical_count(),
        "validation_finished"
    );
    Ok(report)
}

pub fn render_report(report: &RunReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Validation report for model {}", report.model);
    for domain in &report.domains {
        render_domain(&mut out, domain);
    }
    for skipped in &report.skipped {
        let _ = writeln!(
            out,
            "\n== {skipped} == skipped: not present in taxonomy file"
        );
    }

    let _ = writeln!(
        out,
        "\nTotal critical issues: {} ({})",
        report.critical_count(),
        if report.is_failure() { "FAIL" } else { "PASS" }
    );
    out
}

fn render_domain(out: &mut String, domain: &DomainReport) {
    let _ = writeln!(
        out,
        "\n== {} == links: {}",
        domain.domain,
        domain.links_count
    );

    let _ = writeln!(out, "  rigidity violations: {}", domain.violations.len());
    for violation in &domain.violations {
        let _ = writeln!(out, "    - {}", violation.message);
    }

    let _ = writeln!(out, "  cycles: {}", domain.cycles.len());
    for cycle in &domain.cycles {
        let _ = writeln!(out, "    - {}", cycle.join(" -> "));
    }

    let _ = writeln!(out, "  warnings: {}", domain.warnings.len());
    for warning in &domain.warnings {
        let _ = writeln!(out, "    - {}", warning.message);
    }

    if !domain.integrity.is_empty() {
        let _ = writeln!(out, "  missing metadata: {}", domain.integrity.len());
        for note in &domain.integrity {
            let line = match note {
                IntegrityNote::MissingChild { term } => {
                    format!("{term} has no properties; its links were not checked")
                }
                IntegrityNote::MissingParent { child, parent } => {
                    format!("{parent} (parent of {child}) has no properties")
                }
            };
            let _ = writeln!(out, "    - {line}");
        }
    }
}
