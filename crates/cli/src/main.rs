use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use trade_mood_analysis::{Pipeline, PipelineReport, ReportFormatter};
use trade_mood_core::{AppConfig, ConfigLoader};
use trade_mood_data::CsvStorage;

#[derive(Parser)]
#[command(name = "trade-mood")]
#[command(about = "Relate trader performance to market sentiment", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input selection shared by every command.
#[derive(Args)]
struct SourceArgs {
    /// Trader history CSV (overrides `sources.trades_path`)
    #[arg(long)]
    trades: Option<String>,
    /// Sentiment index CSV (overrides `sources.sentiment_path`)
    #[arg(long)]
    sentiment: Option<String>,
    /// Config profile overlay, read from config/Config.<profile>.toml
    #[arg(long, env = "TRADE_MOOD_PROFILE")]
    profile: Option<String>,
    /// Optional log file path (logs to file instead of stderr)
    #[arg(long)]
    log_file: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis and print the report
    Run {
        #[command(flatten)]
        sources: SourceArgs,
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Run the analysis and write the clustered daily table to CSV
    Export {
        #[command(flatten)]
        sources: SourceArgs,
        /// Output CSV file path
        #[arg(short, long)]
        output: String,
    },
}

impl Commands {
    fn sources(&self) -> &SourceArgs {
        match self {
            Self::Run { sources, .. } | Self::Export { sources, .. } => sources,
        }
    }
}

fn init_logging(log_file: Option<&str>) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            // stdout is reserved for the report
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(args: &SourceArgs) -> anyhow::Result<AppConfig> {
    let mut config = match &args.profile {
        Some(profile) => ConfigLoader::load_with_profile(profile)?,
        None => ConfigLoader::load()?,
    };
    if let Some(path) = &args.trades {
        config.sources.trades_path.clone_from(path);
    }
    if let Some(path) = &args.sentiment {
        config.sources.sentiment_path.clone_from(path);
    }
    Ok(config)
}

fn analyze(args: &SourceArgs) -> anyhow::Result<PipelineReport> {
    let config = load_config(args)?;
    tracing::info!(
        trades = %config.sources.trades_path,
        sentiment = %config.sources.sentiment_path,
        "Starting analysis"
    );
    Pipeline::new(config).run_configured()
}

fn run_report(args: &SourceArgs, json: bool) -> anyhow::Result<()> {
    let report = analyze(args)?;

    if json {
        let text = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{text}");
    } else {
        println!("{}", ReportFormatter::format(&report));
    }
    Ok(())
}

fn run_export(args: &SourceArgs, output: &str) -> anyhow::Result<()> {
    let report = analyze(args)?;

    CsvStorage::write_clustered(output, &report.table)?;
    tracing::info!(rows = report.table.len(), path = output, "Wrote clustered table");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.command.sources().log_file.as_deref())?;

    match cli.command {
        Commands::Run { sources, json } => run_report(&sources, json)?,
        Commands::Export { sources, output } => run_export(&sources, &output)?,
    }

    Ok(())
}
