//! CLI entry point for the bikeshare explorer tool.
//!
//! Provides an interactive explore flow plus non-interactive subcommands for
//! one-shot analysis and listing the city registry.

mod prompt;

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use bikeshare_explorer::dataset::{Dataset, load_dataset};
use bikeshare_explorer::filters::{self, FilterParams};
use bikeshare_explorer::output;
use bikeshare_explorer::pager::RawDataPager;
use bikeshare_explorer::stats::Report;

#[derive(Parser)]
#[command(name = "bikeshare_explorer")]
#[command(about = "A tool to explore US bikeshare trip data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for the `analyze` subcommand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Plain text report sections (default)
    Table,
    /// Pretty-printed JSON
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactively pick filters, print statistics, and page through raw data
    Explore {
        /// Directory containing the per-city CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// Analyze one city non-interactively with the given filters
    Analyze {
        /// City to analyze (chicago, new york city, washington)
        #[arg(value_name = "CITY")]
        city: String,

        /// Month to filter by (full month name, or "all")
        #[arg(short, long, default_value = "all")]
        month: String,

        /// Day of the week to filter by (full weekday name, or "all")
        #[arg(short = 'w', long, default_value = "all")]
        day: String,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Directory containing the per-city CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
    /// List the supported cities and their backing files
    ListCities {
        /// Directory containing the per-city CSV files
        #[arg(short, long)]
        data_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: filtered, colored stderr. Reports go to stdout, so the
    // two streams stay separable.
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    tracing_subscriber::registry().with(stderr_layer).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Explore { data_dir } => {
            let data_dir = resolve_data_dir(data_dir);
            run_explore(&data_dir)?;
        }
        Commands::Analyze {
            city,
            month,
            day,
            format,
            data_dir,
        } => {
            let data_dir = resolve_data_dir(data_dir);
            let params = filters::resolve(&city, &month, &day)?;
            run_analyze(&data_dir, &params, format)?;
        }
        Commands::ListCities { data_dir } => {
            let data_dir = resolve_data_dir(data_dir);
            list_cities(&data_dir);
        }
    }

    Ok(())
}

/// Data directory precedence: CLI flag, then `BIKESHARE_DATA_DIR`, then
/// `data/` next to the working directory.
fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("BIKESHARE_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

/// The interactive loop: filters, statistics, raw-data paging, restart.
fn run_explore(data_dir: &std::path::Path) -> Result<()> {
    let mut out = std::io::stdout();
    println!("Hello! Let's explore some US bikeshare data!");

    loop {
        let params = prompt::get_filters()?;
        let dataset = load_dataset(data_dir, &params)?;

        match Report::compute(&dataset) {
            Some(report) => {
                let report = report.with_filters(&params);
                output::render_report(&mut out, &report)?;
            }
            None => {
                // Valid filters, no matching records: not an error, but there
                // is nothing to aggregate or page through.
                println!(
                    "\nNo data found with the selected filters, please restart and try different ones!"
                );
                break;
            }
        }

        if prompt::confirm("Would you like to see the raw data?")? {
            show_raw_data(&mut out, &dataset)?;
        }

        if !prompt::confirm("Would you like to restart?")? {
            break;
        }
    }

    Ok(())
}

/// Pages through the dataset five records at a time until the user stops or
/// the pager is exhausted.
fn show_raw_data(out: &mut impl Write, dataset: &Dataset) -> Result<()> {
    let mut pager = RawDataPager::new(dataset);

    while let Some(page) = pager.next_page() {
        output::render_page(out, page)?;

        if !pager.has_more() {
            println!("Nothing more to display");
            break;
        }
        if !prompt::confirm("Would you like to see more?")? {
            break;
        }
    }

    Ok(())
}

/// One-shot analysis: resolve, load, report. Unknown tokens and load
/// failures abort with a non-zero exit.
fn run_analyze(
    data_dir: &std::path::Path,
    params: &FilterParams,
    format: OutputFormat,
) -> Result<()> {
    let dataset = load_dataset(data_dir, params)?;

    match Report::compute(&dataset) {
        Some(report) => {
            let report = report.with_filters(params);
            let mut out = std::io::stdout();
            match format {
                OutputFormat::Table => output::render_report(&mut out, &report)?,
                OutputFormat::Json => output::render_report_json(&mut out, &report)?,
            }
        }
        None => {
            error!(
                city = %params.city.key,
                "No records match the selected filters"
            );
        }
    }

    Ok(())
}

fn list_cities(data_dir: &std::path::Path) {
    let mut available = 0;

    for city in filters::cities() {
        let path = data_dir.join(city.source_file);
        let present = path.exists();
        if present {
            available += 1;
        }

        info!(
            city = %city.key,
            file = %city.source_file,
            present,
            "City"
        );
    }

    info!(
        total = filters::cities().count(),
        available,
        data_dir = %data_dir.display(),
        "City registry summary"
    );
}
