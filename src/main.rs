//! consensus-check CLI entry point

use clap::Parser;
use consensus_check::output::{write_json, write_rule_list};
use consensus_check::{
    default_rules, filter_rules, run_rules, CliOptions, Config, ExtractionMode, RuleContext,
    SilentReporter, SourceLoader, TextReporter,
};
use log::{debug, warn};
use miette::{IntoDiagnostic, Result};
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "consensus-check")]
#[command(
    author,
    version,
    about = "Static compliance checks for consensus data structures",
    long_about = None
)]
struct Cli {
    /// Repository root to check
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file path (default: auto-detect .consensus-check.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// How declaration bodies are delimited
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Run only this rule (can be used multiple times)
    #[arg(short, long = "rule", value_name = "RULE")]
    rules: Vec<String>,

    /// Skip this rule (can be used multiple times)
    #[arg(short, long = "skip", value_name = "RULE")]
    skip: Vec<String>,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Balanced,
    SingleLevel,
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Balanced => ExtractionMode::Balanced,
            ModeArg::SingleLevel => ExtractionMode::SingleLevel,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if cli.no_color || !io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    if cli.list_rules {
        write_rule_list(io::stdout().lock(), &default_rules()).into_diagnostic()?;
        return Ok(ExitCode::SUCCESS);
    }

    // An explicit config must load; an auto-detected one only warns
    let mut config = if let Some(ref config_path) = cli.config {
        Config::from_file(config_path).into_diagnostic()?
    } else {
        match Config::find_and_load(&cli.root) {
            Ok(Some((path, cfg))) => {
                debug!("using config {}", path.display());
                cfg
            }
            Ok(None) => Config::default(),
            Err(e) => {
                warn!("failed to load config: {}", e);
                Config::default()
            }
        }
    };

    config.merge_cli(CliOptions {
        mode: cli.mode.map(ExtractionMode::from),
        select: cli.rules,
        skip: cli.skip,
    });
    debug!(
        "root {} mode {} source {}",
        cli.root.display(),
        config.mode.as_str(),
        config.source_path
    );

    let ctx = RuleContext::new(SourceLoader::new(&cli.root), config.mode)
        .with_source_path(config.source_path.clone());
    let rules = filter_rules(default_rules(), &config.select, &config.skip).into_diagnostic()?;

    let report = match cli.format {
        OutputFormat::Text => {
            let mut reporter = TextReporter::new(io::stdout().lock());
            reporter.banner().into_diagnostic()?;
            let report = run_rules(&rules, &ctx, &mut reporter);
            reporter.summary(&report).into_diagnostic()?;
            report
        }
        OutputFormat::Json => {
            let report = run_rules(&rules, &ctx, &mut SilentReporter);
            write_json(io::stdout().lock(), &report).into_diagnostic()?;
            report
        }
    };

    Ok(ExitCode::from(report.exit_code()))
}
