use std::{env, path::PathBuf};

use anyhow::{Result, anyhow};

const USAGE: &str = "usage: ontotax [--config <path>] [--model <name>] <command>\n\
commands:\n  \
  build <input> <output>\n  \
  classify <terms> <ontologies> <output> [--limit <n>]\n  \
  validate <gold> <taxonomy>\n  \
  generate <input> <output>\n  \
  analyze <input> <output> [--domain <name>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Build {
        input: PathBuf,
        output: PathBuf,
    },
    Classify {
        terms: PathBuf,
        ontologies: PathBuf,
        output: PathBuf,
        limit: Option<usize>,
    },
    Validate {
        gold: PathBuf,
        taxonomy: PathBuf,
    },
    Generate {
        input: PathBuf,
        output: PathBuf,
    },
    Analyze {
        input: PathBuf,
        output: PathBuf,
        domain: Option<String>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Build { .. } => "build",
            Self::Classify { .. } => "classify",
            Self::Validate { .. } => "validate",
            Self::Generate { .. } => "generate",
            Self::Analyze { .. } => "analyze",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub model: Option<String>,
    pub command: Command,
}

pub fn args_from_env() -> Result<CliArgs> {
    parse_args(env::args().skip(1))
}

pub fn parse_args<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut model = None;
    let mut limit = None;
    let mut domain = None;
    let mut positional = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = Some(PathBuf::from(flag_value(&mut args, "--config")?)),
            "--model" => model = Some(flag_value(&mut args, "--model")?),
            "--domain" => domain = Some(flag_value(&mut args, "--domain")?),
            "--limit" => {
                let value = flag_value(&mut args, "--limit")?;
                let parsed = value
                    .parse::<usize>()
                    .map_err(|_| anyhow!("invalid value for --limit: {value}"))?;
                limit = Some(parsed);
            }
            "-h" | "--help" => return Err(anyhow!("{USAGE}")),
            other if other.starts_with("--") => {
                return Err(anyhow!("unknown argument: {other}. {USAGE}"));
            }
            _ => positional.push(arg),
        }
    }

    let Some((name, operands)) = positional.split_first() else {
        return Err(anyhow!("missing command. {USAGE}"));
    };

    let command = match (name.as_str(), operands) {
        ("build", [input, output]) => Command::Build {
            input: input.into(),
            output: output.into(),
        },
        ("classify", [terms, ontologies, output]) => Command::Classify {
            terms: terms.into(),
            ontologies: ontologies.into(),
            output: output.into(),
            limit: limit.take(),
        },
        ("validate", [gold, taxonomy]) => Command::Validate {
            gold: gold.into(),
            taxonomy: taxonomy.into(),
        },
        ("generate", [input, output]) => Command::Generate {
            input: input.into(),
            output: output.into(),
        },
        ("analyze", [input, output]) => Command::Analyze {
            input: input.into(),
            output: output.into(),
            domain: domain.take(),
        },
        ("build" | "classify" | "validate" | "generate" | "analyze", _) => {
            return Err(anyhow!("wrong number of arguments for {name}. {USAGE}"));
        }
        (other, _) => return Err(anyhow!("unknown command: {other}. {USAGE}")),
    };

    if limit.is_some() {
        return Err(anyhow!("--limit only applies to classify"));
    }
    if domain.is_some() {
        return Err(anyhow!("--domain only applies to analyze"));
    }

    Ok(CliArgs {
        config_path,
        model,
        command,
    })
}

fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}
