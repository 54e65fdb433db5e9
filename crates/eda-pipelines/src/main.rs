//! CLI entry point for the listings and trends pipelines.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eda_pipelines::{
    ChartRenderer, JsonChartRenderer, ListingsConfig, ListingsPipeline, LogChartRenderer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "google")]
use eda_pipelines::{GoogleTrendsProvider, TrendsClient, TrendsConfig, TrendsSnapshot};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Listings cleanup and search-trend snapshot pipelines",
    long_about = "Exploratory data analysis for a rental listings dataset and for search trends.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG              Overrides --log-level (may be set in .env)\n\n\
                  EXAMPLES:\n  \
                  # Clean and describe the listings dataset\n  \
                  eda-pipelines listings -i compressed_data.csv\n\n  \
                  # Write chart specs as JSON files\n  \
                  eda-pipelines --charts-dir charts/ listings\n\n  \
                  # Trend snapshot for a keyword, report as JSON\n  \
                  eda-pipelines --json trends --keyword cricket"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output the report as JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logs; only the final JSON report is written.
    #[arg(long, global = true)]
    json: bool,

    /// Write every chart spec as `<chart id>.json` into this directory
    ///
    /// Without it, charts are only summarized in the log.
    #[arg(long, global = true)]
    charts_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Clean the listings CSV, describe it and chart it
    Listings {
        /// Path to the listings CSV file
        #[arg(short, long, default_value = "compressed_data.csv")]
        input: PathBuf,

        /// Number of bins in the price histogram
        #[arg(long, default_value = "50")]
        bins: usize,
    },

    /// Snapshot search interest for a keyword and compare several keywords
    #[cfg(feature = "google")]
    Trends {
        /// Keyword for the region ranking and the single timeline
        #[arg(short, long, default_value = "cricket")]
        keyword: String,

        /// Comma-separated keywords for the comparison chart (up to five)
        #[arg(
            short,
            long,
            value_delimiter = ',',
            default_value = "cricket,data science,machine learning"
        )]
        compare: Vec<String>,

        /// Number of top regions to keep
        #[arg(long, default_value = "15")]
        top: usize,

        /// Timeframe understood by the service (e.g. "today 12-m", "today 5-y")
        #[arg(long, default_value = "today 12-m")]
        timeframe: String,

        /// Restrict to a country code (empty = worldwide)
        #[arg(long, default_value = "")]
        geo: String,
    },
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // .env first so RUST_LOG set there reaches the filter
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    let renderer = build_renderer(args.charts_dir.as_deref());

    match &args.command {
        Command::Listings { input, bins } => run_listings(&args, input, *bins, renderer),
        #[cfg(feature = "google")]
        Command::Trends {
            keyword,
            compare,
            top,
            timeframe,
            geo,
        } => {
            let config = TrendsConfig::builder()
                .top_regions(*top)
                .timeframe(timeframe)
                .geo(geo)
                .build()?;
            run_trends(&args, keyword, compare, config, renderer)
        }
    }
}

fn build_renderer(charts_dir: Option<&Path>) -> Arc<dyn ChartRenderer> {
    match charts_dir {
        Some(dir) => {
            info!("Writing chart specs to {}", dir.display());
            Arc::new(JsonChartRenderer::to_directory(dir))
        }
        None => Arc::new(LogChartRenderer),
    }
}

fn run_listings(
    args: &Args,
    input: &Path,
    bins: usize,
    renderer: Arc<dyn ChartRenderer>,
) -> Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let config = ListingsConfig::builder().histogram_bins(bins).build()?;
    let report = ListingsPipeline::new(config)?
        .with_renderer(renderer)
        .run(input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}

#[cfg(feature = "google")]
fn run_trends(
    args: &Args,
    keyword: &str,
    compare: &[String],
    config: TrendsConfig,
    renderer: Arc<dyn ChartRenderer>,
) -> Result<()> {
    let compare: Vec<&str> = compare
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();

    let provider = GoogleTrendsProvider::new(&config)?;
    let report = TrendsSnapshot::new(TrendsClient::new(provider, config))
        .with_renderer(renderer)
        .run(keyword, &compare)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    Ok(())
}
