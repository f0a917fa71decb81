use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

use oura_tags::analyzer::{DataSource, TagInsightsAnalyzer};
use oura_tags::averager::Formula;
use oura_tags::config::{get_config, Config};
use oura_tags::logging::init_logging;
use oura_tags::range::RangeQuery;

#[derive(Parser)]
#[command(name = "oura-tags")]
#[command(about = "Correlate Oura ring tags with sleep and readiness metrics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Clone, Default)]
struct RangeArgs {
    /// Start date (DD-MM-YYYY or YYYY-MM-DD), defaults to the configured lookback
    #[arg(long)]
    since: Option<String>,
    /// End date (DD-MM-YYYY or YYYY-MM-DD), defaults to yesterday
    #[arg(long)]
    until: Option<String>,
    /// Oura personal access token, defaults to OURA_ACCESS_TOKEN
    #[arg(long)]
    token: Option<String>,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare metric averages around tagged days with the baseline
    Analyze {
        #[command(flatten)]
        range: RangeArgs,
        /// Aggregation formula
        #[arg(long, value_enum)]
        formula: Option<Formula>,
        /// Read tag entries from a JSON file instead of the API
        #[arg(long, requires = "metrics")]
        records: Option<PathBuf>,
        /// Read daily summaries from a JSON file instead of the API
        #[arg(long, requires = "records")]
        metrics: Option<PathBuf>,
    },
    /// List every tag with the days it was recorded on
    Tags {
        #[command(flatten)]
        range: RangeArgs,
        /// Read tag entries from a JSON file instead of the API
        #[arg(long)]
        records: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Write the configuration to this file instead of printing it
        #[arg(long)]
        write: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = get_config();

    if config.logging.output != "console" {
        std::fs::create_dir_all(&config.paths.log_directory)
            .context("Failed to create log directory")?;
    }
    // Dropped when main returns, flushing buffered file output
    let _log_guard = init_logging(&config.logging, &config.paths.log_directory);

    let command = cli.command.unwrap_or(Commands::Analyze {
        range: RangeArgs::default(),
        formula: None,
        records: None,
        metrics: None,
    });

    let json = match &command {
        Commands::Analyze { range, .. } | Commands::Tags { range, .. } => range.json,
        Commands::Config { .. } => false,
    };

    let outcome = match command {
        Commands::Analyze {
            range,
            formula,
            records,
            metrics,
        } => {
            let formula = formula.unwrap_or(config.analysis.default_formula);
            run_analyze(&range, formula, records, metrics, config).await
        }
        Commands::Tags { range, records } => run_tags(&range, records, config).await,
        Commands::Config { write } => match write {
            Some(path) => config.save_to_file(&path),
            None => config.to_toml().map(|rendered| print!("{}", rendered)),
        },
    };

    Ok(match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report_error(&e, json),
    })
}

async fn run_analyze(
    range: &RangeArgs,
    formula: Formula,
    records: Option<PathBuf>,
    metrics: Option<PathBuf>,
    config: &Config,
) -> Result<()> {
    let query = build_query(range, formula, config)?;
    let source = build_source(range, records, metrics, config)?;
    TagInsightsAnalyzer::new(config)
        .run_analyze(&source, &query, range.json)
        .await
}

async fn run_tags(range: &RangeArgs, records: Option<PathBuf>, config: &Config) -> Result<()> {
    let query = build_query(range, config.analysis.default_formula, config)?;
    let source = build_source(range, records, None, config)?;
    TagInsightsAnalyzer::new(config)
        .run_tags(&source, &query, range.json)
        .await
}

fn build_query(range: &RangeArgs, formula: Formula, config: &Config) -> Result<RangeQuery> {
    let today = chrono::Local::now().date_naive();
    let query = RangeQuery::from_args(
        range.since.as_deref(),
        range.until.as_deref(),
        formula,
        config.analysis.lookback_days,
        today,
    )?;

    debug!(
        start = %query.start_date,
        end = %query.end_date,
        formula = %query.formula,
        "Validated range"
    );

    Ok(query)
}

fn build_source(
    range: &RangeArgs,
    records: Option<PathBuf>,
    metrics: Option<PathBuf>,
    config: &Config,
) -> Result<DataSource> {
    if let Some(records) = records {
        return Ok(DataSource::Files { records, metrics });
    }

    let access_token = range
        .token
        .clone()
        .or_else(|| config.api.access_token.clone())
        .filter(|t| !t.trim().is_empty())
        .context("No access token: pass --token or set OURA_ACCESS_TOKEN")?;

    Ok(DataSource::Api { access_token })
}

fn report_error(e: &anyhow::Error, json: bool) -> ExitCode {
    error!(error = %format!("{:#}", e), "Request failed");
    if json {
        println!("{}", serde_json::json!({ "error": format!("{:#}", e) }));
    } else {
        eprintln!("Error: {:#}", e);
    }
    ExitCode::FAILURE
}
