//! benchplot - benchmark result charts
//!
//! Reads a directory of sample files named `<category>_<variant>_<ordinal>`,
//! aggregates them into mean ± standard error series and renders charts.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing directory, malformed sample, drawing failure, etc.)
//!   2 - Invalid arguments

mod analysis;
mod cli;
mod config;
mod error;
mod models;
mod render;
mod report;
mod scanner;

use analysis::Aggregator;
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat, PlotMode};
use config::{Config, CONFIG_FILE};
use error::AggregateError;
use models::{Panel, Report, ReportMetadata, SampleFile};
use render::{panel_output_paths, ChartSpec};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit status for invalid command-line arguments.
const USAGE_EXIT_CODE: i32 = 2;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}\n\n{}", e, Args::usage());
        std::process::exit(USAGE_EXIT_CODE);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("benchplot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(&args) {
        error!("benchplot failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        if e
            .downcast_ref::<AggregateError>()
            .is_some_and(AggregateError::is_parse_error)
        {
            eprintln!("   Expected names like <category>_<variant>_<ordinal> holding one number per line.");
        }
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .benchplot.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE);

    if path.exists() {
        eprintln!("⚠️  {} already exists. Remove it first or edit it manually.", CONFIG_FILE);
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).with_context(|| format!("Failed to write {}", CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE);
    println!("   Edit it to customize trimming, grouping, axes and labels.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}

/// Run the scan -> aggregate -> render -> report workflow.
fn run(args: &Args) -> Result<()> {
    let mut config = load_config(args)?;
    config.merge_with_args(args);

    let folder = args.folder();
    let scan_config = scanner::ScanConfig::from(&config);
    let file_scanner = scanner::ResultScanner::new(folder.clone(), scan_config);

    if !args.quiet {
        println!("🔍 Scanning {}", file_scanner.root().display());
    }
    let files = file_scanner.scan()?;
    if files.is_empty() {
        anyhow::bail!("No sample files selected in {}", folder.display());
    }
    info!("Selected {} sample files", files.len());

    let aggregator = Aggregator::new(folder.clone(), config.aggregate_options())
        .with_progress(!args.quiet && !args.dry_run);
    debug!(
        "Aggregating {} with {:?}",
        aggregator.dir().display(),
        aggregator.options()
    );

    if args.dry_run {
        return handle_dry_run(&files, &aggregator);
    }

    let spec = config.chart_spec(args.title(), args.x_label(), args.y_label());

    match args.mode {
        PlotMode::Trace => {
            let traces = aggregator.traces(&files)?;
            render::render_traces(&traces, &spec, &args.output)?;
            if !args.quiet {
                println!("✅ Trace chart saved to: {}", args.output.display());
            }
            Ok(())
        }
        PlotMode::ErrorBar => {
            let panels = aggregator.aggregate(&files)?;
            let written = render_panels(&panels, &spec, &args.output)?;

            if let Some(ref report_path) = args.report {
                write_report(&panels, &files, &config, &folder, report_path)?;
            }

            if !args.quiet {
                print_summary(&panels);
                for path in &written {
                    println!("✅ Chart saved to: {}", path.display());
                }
            }
            Ok(())
        }
    }
}

/// Render every panel; several panels get one file each.
fn render_panels(panels: &[Panel], spec: &ChartSpec, output: &Path) -> Result<Vec<PathBuf>> {
    let paths = panel_output_paths(output, panels)?;

    for (panel, path) in panels.iter().zip(&paths) {
        render::render_panel(panel, spec, path)
            .with_context(|| format!("Failed to render chart {}", path.display()))?;
    }

    Ok(paths)
}

/// Write the aggregated numbers in the configured format.
fn write_report(
    panels: &[Panel],
    files: &[SampleFile],
    config: &Config,
    folder: &Path,
    path: &Path,
) -> Result<()> {
    let options = config.aggregate_options();
    let report = Report {
        metadata: ReportMetadata {
            directory: folder.display().to_string(),
            generated_at: Utc::now(),
            trim: options.trim,
            value_scale: options.value_scale,
            files_read: files.len(),
            filter: config.aggregation.filter.clone(),
        },
        panels: panels.to_vec(),
    };

    let output = match config.report.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    std::fs::write(path, &output)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// Handle --dry-run: print the parsed grouping and exit without reading samples.
fn handle_dry_run(files: &[SampleFile], aggregator: &Aggregator) -> Result<()> {
    println!("\n🔍 Dry run: {} sample files (no samples read)\n", files.len());

    for plan in aggregator.plan(files)? {
        println!("   📊 {}", plan.key.as_deref().unwrap_or("<all>"));
        for group in &plan.groups {
            let ordinals: Vec<String> = group.files.iter().map(|f| f.ordinal.to_string()).collect();
            println!("     📈 {} [{}]", group.key, ordinals.join(", "));
        }
    }

    println!("\n✅ Dry run complete.");
    Ok(())
}

/// Print a short per-panel summary.
fn print_summary(panels: &[Panel]) {
    println!("\n📊 Aggregation Summary:");
    for panel in panels {
        println!(
            "   {}: {} series, {} points",
            panel.key.as_deref().unwrap_or("all"),
            panel.series.len(),
            panel.point_count()
        );
    }
    if let Some((lo, hi)) = analysis::value_extent(panels) {
        println!("   Value range: {:.6} .. {:.6}", lo, hi);
    }
}
