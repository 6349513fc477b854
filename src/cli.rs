//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::render::XAxis;
use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// benchplot - chart benchmark sample files
///
/// Reads a directory of result files named `<category>_<variant>_<ordinal>`,
/// each holding one sample per line, and draws mean ± standard error lines.
///
/// Examples:
///   benchplot "FUSE overhead" "file size (MB)" "time (s)" results/fuse
///   benchplot "" "size" "time (s)" results/ea --trim 5 --x-axis power-of-two
///   benchplot "Custom metadata" "iteration" "time (ms)" results/meta normal --mode trace
///   benchplot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Chart title
    #[arg(value_name = "TITLE", required_unless_present = "init_config")]
    pub title: Option<String>,

    /// X axis label
    #[arg(value_name = "XLABEL", required_unless_present = "init_config")]
    pub x_label: Option<String>,

    /// Y axis label
    #[arg(value_name = "YLABEL", required_unless_present = "init_config")]
    pub y_label: Option<String>,

    /// Directory holding the sample files
    #[arg(value_name = "FOLDER", required_unless_present = "init_config")]
    pub folder: Option<PathBuf>,

    /// Keep only files whose category equals FILTER (or starts with "FILTER ")
    #[arg(value_name = "FILTER")]
    pub filter: Option<String>,

    /// Output image path (.png or .svg)
    ///
    /// With several panels, one file per panel is written as
    /// <stem>_<panel>.<ext>.
    #[arg(short, long, default_value = "benchplot.png", value_name = "FILE")]
    pub output: PathBuf,

    /// What to draw
    #[arg(long, default_value = "errorbar", value_name = "MODE")]
    pub mode: PlotMode,

    /// Drop the N lowest and N highest samples of every file
    #[arg(long, value_name = "N")]
    pub trim: Option<usize>,

    /// Filename token that names each line
    #[arg(long, value_name = "INDEX")]
    pub series_token: Option<usize>,

    /// Filename token that splits files into separate charts
    #[arg(long, value_name = "INDEX")]
    pub panel_token: Option<usize>,

    /// Draw every series on a single chart
    #[arg(long)]
    pub single_panel: bool,

    /// X axis placement (ordinal, power-of-two, position)
    #[arg(long, value_name = "AXIS")]
    pub x_axis: Option<XAxis>,

    /// Use a logarithmic y axis
    #[arg(long)]
    pub log_y: bool,

    /// Fixed lower bound of the y axis
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub y_min: Option<f64>,

    /// Fixed upper bound of the y axis
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub y_max: Option<f64>,

    /// Multiply every sample by this factor (e.g. 0.001 for ms -> s)
    #[arg(long, value_name = "FACTOR")]
    pub scale: Option<f64>,

    /// Write the aggregated numbers to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .benchplot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// List the parsed sample files and their groups without reading samples
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .benchplot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Report format.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Chart kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum PlotMode {
    /// Mean ± standard error per file, one line per group (default)
    #[default]
    #[value(name = "errorbar")]
    ErrorBar,
    /// Raw samples of every file against their sample index
    Trace,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn x_label(&self) -> &str {
        self.x_label.as_deref().unwrap_or("")
    }

    pub fn y_label(&self) -> &str {
        self.y_label.as_deref().unwrap_or("")
    }

    /// The results directory (empty when only `--init-config` was given).
    pub fn folder(&self) -> PathBuf {
        self.folder.clone().unwrap_or_default()
    }

    /// One-line usage string for error messages.
    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if self.folder.is_none() {
            return Err("Missing results folder".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(scale) = self.scale {
            if !scale.is_finite() || scale == 0.0 {
                return Err("Scale must be a finite, non-zero number".to_string());
            }
        }

        if let (Some(lo), Some(hi)) = (self.y_min, self.y_max) {
            if lo >= hi {
                return Err(format!("--y-min ({}) must be below --y-max ({})", lo, hi));
            }
        }

        if self.log_y {
            if let Some(lo) = self.y_min {
                if lo <= 0.0 {
                    return Err("--y-min must be positive with --log-y".to_string());
                }
            }
        }

        if !self.single_panel {
            if let (Some(series), Some(panel)) = (self.series_token, self.panel_token) {
                if series == panel {
                    return Err(
                        "--series-token and --panel-token must differ (or use --single-panel)"
                            .to_string(),
                    );
                }
            }
        }

        let ext = self
            .output
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);
        if !matches!(ext.as_deref(), Some("png") | Some("svg")) {
            return Err(format!(
                "Output must end in .png or .svg: {}",
                self.output.display()
            ));
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn make_args() -> Args {
        Args {
            title: Some("FUSE".to_string()),
            x_label: Some("size".to_string()),
            y_label: Some("time (s)".to_string()),
            folder: Some(PathBuf::from("results")),
            filter: None,
            output: PathBuf::from("chart.png"),
            mode: PlotMode::ErrorBar,
            trim: None,
            series_token: None,
            panel_token: None,
            single_panel: false,
            x_axis: None,
            log_y: false,
            y_min: None,
            y_max: None,
            scale: None,
            report: None,
            format: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_positional_arguments() {
        let args = Args::try_parse_from([
            "benchplot", "Title", "x", "y", "results/fuse", "normal", "--trim", "5",
        ])
        .unwrap();

        assert_eq!(args.title(), "Title");
        assert_eq!(args.x_label(), "x");
        assert_eq!(args.y_label(), "y");
        assert_eq!(args.folder(), PathBuf::from("results/fuse"));
        assert_eq!(args.filter.as_deref(), Some("normal"));
        assert_eq!(args.trim, Some(5));
        assert_eq!(args.mode, PlotMode::ErrorBar);
    }

    #[test]
    fn test_missing_positional_is_usage_error() {
        let err = Args::try_parse_from(["benchplot", "Title", "x"]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_init_config_without_positionals() {
        let args = Args::try_parse_from(["benchplot", "--init-config"]).unwrap();
        assert!(args.init_config);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_enum_values() {
        let args = Args::try_parse_from([
            "benchplot", "t", "x", "y", "d", "--mode", "trace", "--x-axis", "power-of-two",
            "--format", "json",
        ])
        .unwrap();
        assert_eq!(args.mode, PlotMode::Trace);
        assert_eq!(args.x_axis, Some(XAxis::PowerOfTwo));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_y_range() {
        let mut args = make_args();
        args.y_min = Some(2.0);
        args.y_max = Some(1.0);
        assert!(args.validate().is_err());

        args.y_min = Some(0.0);
        args.y_max = Some(1.0);
        assert!(args.validate().is_ok());

        args.log_y = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_tokens_and_output() {
        let mut args = make_args();
        args.series_token = Some(1);
        args.panel_token = Some(1);
        assert!(args.validate().is_err());

        args.single_panel = true;
        assert!(args.validate().is_ok());

        args.output = PathBuf::from("chart.pdf");
        assert!(args.validate().is_err());

        args.output = PathBuf::from("chart.SVG");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_scale() {
        let mut args = make_args();
        args.scale = Some(0.0);
        assert!(args.validate().is_err());
        args.scale = Some(0.001);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_usage_mentions_positionals() {
        let usage = Args::usage();
        assert!(usage.contains("TITLE"));
        assert!(usage.contains("FOLDER"));
    }
}
