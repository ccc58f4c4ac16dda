mod config;
mod logging;

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use config::{ConfigError, DEFAULT_CONFIG_FILE, MetagenConfig, Overrides, load_config};
use logging::{LoggingError, init_logging};
use metagen_generate::{GenerationSummary, GeneratorOptions, Pipeline, PipelineError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Pipeline(#[from] PipelineError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(#[from] LoggingError),
    #[error("failed to write summary {path}: {source}")]
    Summary {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(
    name = "metagen",
    version,
    about = "Generate Java meta-model sources from XML models"
)]
struct Cli {
    /// Configuration file; a missing default file is ignored.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Emit log events as JSON on stderr.
    #[arg(long, global = true, default_value_t = false)]
    log_json: bool,
    /// Append log events as JSON lines to this file.
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline and write Java sources.
    Generate(GenerateArgs),
    /// List model files with their root tag and matching parsers.
    Candidates(ModelArgs),
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// Directory searched for model files.
    #[arg(long, value_name = "DIR")]
    base_dir: Option<PathBuf>,
    /// Path fragment a model file must contain (repeatable).
    #[arg(long, value_name = "FRAGMENT")]
    include: Vec<String>,
    /// Path fragment excluding a model file (repeatable).
    #[arg(long, value_name = "FRAGMENT")]
    exclude: Vec<String>,
    /// Model id dropped after parsing (repeatable).
    #[arg(long, value_name = "ID")]
    exclude_model: Vec<String>,
    /// Register the test domain, process and view parsers.
    #[arg(long, default_value_t = false)]
    integration_test_support: bool,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    models: ModelArgs,
    /// Java package of the generated sources.
    #[arg(long, value_name = "PACKAGE")]
    package: Option<String>,
    /// Prefix of the aggregate domain classes.
    #[arg(long, value_name = "PREFIX")]
    prefix: Option<String>,
    /// Main source tree.
    #[arg(long, value_name = "DIR")]
    target_dir: Option<PathBuf>,
    /// Integration-test source tree.
    #[arg(long, value_name = "DIR")]
    test_target_dir: Option<PathBuf>,
    /// Concurrent parse and generation jobs.
    #[arg(long)]
    workers: Option<usize>,
    /// Write the run summary as JSON to this path.
    #[arg(long, value_name = "PATH")]
    summary: Option<PathBuf>,
}

impl ModelArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            base_directory: self.base_dir,
            includes: self.include,
            excludes: self.exclude,
            excluded_models: self.exclude_model,
            integration_test_support: self.integration_test_support,
            ..Overrides::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_logging(cli.log_json, cli.log_file.as_deref())?;

    let explicit = cli.config.is_some();
    let config_path = cli
        .config
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let config = load_config(&config_path, explicit)?;

    match cli.command {
        Command::Generate(args) => run_generate(config, args).await,
        Command::Candidates(args) => run_candidates(config, args),
    }
}

async fn run_generate(config: MetagenConfig, args: GenerateArgs) -> Result<(), CliError> {
    let GenerateArgs {
        models,
        package,
        prefix,
        target_dir,
        test_target_dir,
        workers,
        summary,
    } = args;

    let overrides = Overrides {
        package_name: package,
        domain_prefix: prefix,
        target_directory: target_dir,
        test_target_directory: test_target_dir,
        workers,
        ..models.overrides()
    };
    let options = config.into_options(overrides)?;

    let result = Pipeline::new(options).run().await?;
    if let Some(path) = summary {
        write_summary(&path, &result)?;
        info!(event = "summary_written", path = %path.display());
    }

    println!(
        "generated {} Java sources ({} models, {} post-processed) in {} ms",
        result.total, result.models, result.post_processed, result.duration_ms
    );
    Ok(())
}

fn run_candidates(config: MetagenConfig, args: ModelArgs) -> Result<(), CliError> {
    let options: GeneratorOptions = config.into_options(args.overrides())?;
    let candidates = Pipeline::new(options).candidates()?;

    for candidate in &candidates {
        println!(
            "{}\t{}\t{}",
            candidate.parser_id,
            candidate.root_tag,
            candidate.path.display()
        );
    }
    info!(event = "candidates_listed", count = candidates.len());
    Ok(())
}

fn write_summary(path: &Path, summary: &GenerationSummary) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, encoded).map_err(|source| CliError::Summary {
        path: path.to_path_buf(),
        source,
    })
}
