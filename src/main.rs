use std::process::ExitCode;

use anyhow::{Context, Result};
use tokio::signal::unix::{SignalKind, signal};
use tokio_util::sync::CancellationToken;

use ontotax::{
    agentic::AgenticBuilder,
    cli::{Command, args_from_env},
    commands::{self, connect_oracle},
    config::Config,
    generator::TaxonomyGenerator,
    logging::init_tracing,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = args_from_env()?;
    let config = Config::load_or_default(args.config_path.as_deref()).with_context(|| {
        match &args.config_path {
            Some(path) => format!("failed to load config from {}", path.display()),
            None => "failed to load default config".to_string(),
        }
    })?;
    let logging = init_tracing(&config.logging, args.command.name())?;

    let cancel = CancellationToken::new();
    watch_signals(cancel.clone())?;

    let outcome = run(args.command, args.model.as_deref(), &config, &cancel).await;
    if cancel.is_cancelled() {
        eprintln!(
            "ontotax interrupted (run {}); partial results are saved",
            logging.run_id()
        );
        return Ok(ExitCode::from(130));
    }
    outcome
}

async fn run(
    command: Command,
    model: Option<&str>,
    config: &Config,
    cancel: &CancellationToken,
) -> Result<ExitCode> {
    let connect = || connect_oracle(&config.oracle, model, cancel.clone());
    match command {
        Command::Validate { gold, taxonomy } => {
            let report = commands::run_validate(&gold, &taxonomy)?;
            if report.is_failure() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Build { input, output } => {
            let (model, oracle) = connect()?;
            let builder = AgenticBuilder::new(oracle.clone(), oracle)
                .with_root_sentinel(config.builder.root_sentinel.clone());
            let summary = commands::run_build(&builder, &model, &input, &output).await?;
            println!(
                "built {} domain(s): {} term(s) placed, {} fell back to root, {} resumed",
                summary.domains, summary.resolved, summary.fallbacks, summary.resumed
            );
        }
        Command::Classify {
            terms,
            ontologies,
            output,
            limit,
        } => {
            let (_, oracle) = connect()?;
            let classified =
                commands::run_classify(oracle, &terms, &ontologies, &output, limit, cancel).await?;
            println!("classified {classified} term(s) into {}", output.display());
        }
        Command::Generate { input, output } => {
            let (model, oracle) = connect()?;
            let generator = TaxonomyGenerator::new(oracle);
            let summary = commands::run_generate(&generator, &model, &input, &output).await?;
            println!(
                "generated {} domain(s), {} skipped, {} failed",
                summary.generated, summary.skipped, summary.failed
            );
        }
        Command::Analyze {
            input,
            output,
            domain,
        } => {
            let (_, oracle) = connect()?;
            let analyzer = commands::analyzer_from_config(oracle, &config.analyzer)?;
            let summary =
                commands::run_analyze(&analyzer, &input, &output, domain.as_deref()).await?;
            println!(
                "analyzed {} term(s), {} already present, {} failed",
                summary.analyzed, summary.skipped, summary.failed
            );
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Cancels the run on the first SIGINT or SIGTERM.
fn watch_signals(cancel: CancellationToken) -> Result<()> {
    let mut sigint =
        signal(SignalKind::interrupt()).context("unable to listen for SIGINT (Ctrl+C)")?;
    let mut sigterm = signal(SignalKind::terminate()).context("unable to listen for SIGTERM")?;

    tokio::spawn(async move {
        let signal_name = tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        };
        tracing::warn!(target: "commands", signal = signal_name, "cancellation_requested");
        eprintln!("received {signal_name}; finishing the current step");
        cancel.cancel();
    });
    Ok(())
}
