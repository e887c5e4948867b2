//! CLI entry point for the housing data pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use housing_processing::{
    CleaningConfig, CleaningOutcome, DataCleaner, PlotStyle, ProcessingError, RunReport,
    build_preprocessor, plot_correlation_heatmap, plot_price_distribution, write_csv,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Housing price dataset cleaning and preprocessing",
    long_about = "Loads a housing-sales CSV, reports data-quality issues, repairs them and \
                  optionally exports the model feature matrix and diagnostic charts.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  RUST_LOG              Overrides --log-level (may be set in .env)\n\n\
                  EXAMPLES:\n  \
                  # Diagnose and clean, keep the result in memory only\n  \
                  housing-processing -i data/melb_data.csv\n\n  \
                  # Save the cleaned dataset and the charts\n  \
                  housing-processing -i data/melb_data.csv -o out/clean.csv --plots-dir figures\n\n  \
                  # Custom rule table, JSON summary on stdout\n  \
                  housing-processing -i data/melb_data.csv -c rules.json --json"
)]
struct Args {
    /// Path to the CSV file to clean
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the cleaned dataset (CSV)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fit the feature preprocessor on the cleaned data and write the matrix here (CSV)
    #[arg(long)]
    features_out: Option<PathBuf>,

    /// Directory for the price distribution and correlation heatmap charts
    #[arg(long)]
    plots_dir: Option<PathBuf>,

    /// Cleaning configuration (JSON serialized CleaningConfig)
    ///
    /// Missing fields fall back to their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the quality report and cleaning summary as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and the final result)
    #[arg(short, long)]
    quiet: bool,
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
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // .env may carry RUST_LOG, so load it before the subscriber reads the environment
    dotenv().ok();
    init_logging(&args.log_level, args.quiet, args.json);

    match run(&args) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("{:#}", e);
            Err(e)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let cleaner = DataCleaner::new(config);

    info!("{}", "=".repeat(80));
    info!("Starting housing data cleaning...");
    info!("{}", "=".repeat(80));

    let outcome = cleaner.load_and_clean(&args.input, args.output.as_deref())?;

    if let Some(path) = &args.features_out {
        export_features(&outcome, path)?;
    }

    if let Some(dir) = &args.plots_dir {
        render_plots(&outcome, dir)?;
    }

    let input = args.input.display().to_string();
    let report = RunReport {
        input: &input,
        quality: &outcome.quality,
        summary: &outcome.summary,
    };

    if let Some(path) = &args.report {
        write_report(&report, path)?;
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_human_readable_summary(&report, &outcome);
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<CleaningConfig> {
    let Some(path) = path else {
        return Ok(CleaningConfig::default());
    };

    let config = CleaningConfig::from_json_file(path)?;

    info!(
        "Loaded configuration from {} ({} rules)",
        path.display(),
        config.rules.len()
    );
    Ok(config)
}

fn export_features(outcome: &CleaningOutcome, path: &Path) -> Result<()> {
    let mut preprocessor = build_preprocessor();
    let mut features = preprocessor
        .fit_transform(&outcome.data)
        .context("Feature preprocessing failed")?;

    write_csv(&mut features, path, b',')?;
    info!(
        "Feature matrix written: {} rows x {} features",
        features.height(),
        features.width()
    );
    Ok(())
}

fn render_plots(outcome: &CleaningOutcome, dir: &Path) -> Result<()> {
    let style = PlotStyle::default();

    match plot_price_distribution(&outcome.data, Some(dir), &style) {
        Ok(_) => {}
        Err(e @ ProcessingError::ColumnNotFound(_)) => {
            warn!("Skipping price distribution: {}", e);
        }
        Err(e) => return Err(e.into()),
    }
    plot_correlation_heatmap(&outcome.data, Some(dir), &style)?;
    Ok(())
}

fn write_report(report: &RunReport<'_>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    info!("Report written to: {}", path.display());
    Ok(())
}

/// Print a human-readable summary of the cleaning run.
fn print_human_readable_summary(report: &RunReport<'_>, outcome: &CleaningOutcome) {
    let summary = report.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    println!(
        "Input:  {} ({} rows x {} columns)",
        report.input, summary.rows_before, summary.columns
    );
    match &summary.saved_to {
        Some(path) => println!(
            "Output: {} ({} rows x {} columns)",
            path,
            summary.rows_after,
            outcome.data.width()
        ),
        None => println!("Output: not saved ({} rows)", summary.rows_after),
    }
    println!();

    println!("Data Quality:");
    print!("{}", report.quality);
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Rows: {} -> {} ({} removed, {} duplicates)",
        summary.rows_before,
        summary.rows_after,
        summary.rows_removed(),
        summary.duplicates_removed
    );

    if summary.repairs.is_empty() {
        println!("  Repairs: none");
    } else {
        println!("  Repairs:");
        for repair in &summary.repairs {
            match &repair.fill_value {
                Some(value) => println!(
                    "    {:<16} {:<22} {:>7} rows  ({})",
                    repair.column, repair.action, repair.rows_affected, value
                ),
                None => println!(
                    "    {:<16} {:<22} {:>7} rows",
                    repair.column, repair.action, repair.rows_affected
                ),
            }
        }
    }
    println!();
}
