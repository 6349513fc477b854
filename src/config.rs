//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.benchplot.toml` files.

use crate::analysis::AggregateOptions;
use crate::cli::OutputFormat;
use crate::models::{TrimPolicy, CATEGORY_TOKEN, VARIANT_TOKEN};
use crate::render::{ChartSpec, LegendPosition, XAxis};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".benchplot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Aggregation settings.
    #[serde(default)]
    pub aggregation: AggregationConfig,

    /// Chart styling.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// How sample files are grouped and summarized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationConfig {
    /// Samples dropped from each end before statistics (0 = no trimming).
    #[serde(default)]
    pub trim: usize,

    /// Token index naming each plotted line.
    #[serde(default = "default_series_token")]
    pub series_token: usize,

    /// Token index splitting files into separate charts.
    #[serde(default = "default_panel_token")]
    pub panel_token: usize,

    /// Draw every series on one chart instead of one chart per panel.
    #[serde(default)]
    pub single_panel: bool,

    /// Multiplier applied to every sample.
    #[serde(default = "default_value_scale")]
    pub value_scale: f64,

    /// Category filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            trim: 0,
            series_token: default_series_token(),
            panel_token: default_panel_token(),
            single_panel: false,
            value_scale: default_value_scale(),
            filter: None,
        }
    }
}

fn default_series_token() -> usize {
    CATEGORY_TOKEN
}

fn default_panel_token() -> usize {
    VARIANT_TOKEN
}

fn default_value_scale() -> f64 {
    1.0
}

/// Chart styling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Image width in pixels.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Image height in pixels.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Font size for caption, axis descriptions and legend.
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Stroke width of series lines.
    #[serde(default = "default_line_width")]
    pub line_width: u32,

    /// How points are placed along the x axis.
    #[serde(default)]
    pub x_axis: XAxis,

    /// Logarithmic y axis.
    #[serde(default)]
    pub log_y: bool,

    /// Fixed lower bound of the y axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_min: Option<f64>,

    /// Fixed upper bound of the y axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,

    /// Legend placement.
    #[serde(default)]
    pub legend: LegendPosition,

    /// Legend label rewrites, keyed by series key.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Fixed y ranges per panel key; these win over `y_min`/`y_max`.
    #[serde(default)]
    pub y_ranges: BTreeMap<String, [f64; 2]>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            font_size: default_font_size(),
            line_width: default_line_width(),
            x_axis: XAxis::default(),
            log_y: false,
            y_min: None,
            y_max: None,
            legend: LegendPosition::default(),
            labels: BTreeMap::new(),
            y_ranges: BTreeMap::new(),
        }
    }
}

fn default_width() -> u32 {
    1600
}

fn default_height() -> u32 {
    1000
}

fn default_font_size() -> u32 {
    28
}

fn default_line_width() -> u32 {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// Only values given explicitly on the command line override the file.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(trim) = args.trim {
            self.aggregation.trim = trim;
        }
        if let Some(token) = args.series_token {
            self.aggregation.series_token = token;
        }
        if let Some(token) = args.panel_token {
            self.aggregation.panel_token = token;
        }
        if args.single_panel {
            self.aggregation.single_panel = true;
        }
        if let Some(scale) = args.scale {
            self.aggregation.value_scale = scale;
        }
        if let Some(ref filter) = args.filter {
            if !filter.is_empty() {
                self.aggregation.filter = Some(filter.clone());
            }
        }

        if let Some(x_axis) = args.x_axis {
            self.chart.x_axis = x_axis;
        }
        if args.log_y {
            self.chart.log_y = true;
        }
        if args.y_min.is_some() {
            self.chart.y_min = args.y_min;
        }
        if args.y_max.is_some() {
            self.chart.y_max = args.y_max;
        }

        if let Some(format) = args.format {
            self.report.format = format;
        }
    }

    /// Aggregation options for the merged configuration.
    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            series_token: self.aggregation.series_token,
            panel_token: if self.aggregation.single_panel {
                None
            } else {
                Some(self.aggregation.panel_token)
            },
            trim: TrimPolicy::from_count(self.aggregation.trim),
            value_scale: self.aggregation.value_scale,
        }
    }

    /// Chart specification with the given title and axis labels.
    pub fn chart_spec(&self, title: &str, x_label: &str, y_label: &str) -> ChartSpec {
        ChartSpec {
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            width: self.chart.width,
            height: self.chart.height,
            font_size: self.chart.font_size,
            line_width: self.chart.line_width,
            x_axis: self.chart.x_axis,
            log_y: self.chart.log_y,
            y_min: self.chart.y_min,
            y_max: self.chart.y_max,
            panel_y_ranges: self
                .chart
                .y_ranges
                .iter()
                .map(|(k, [lo, hi])| (k.clone(), (*lo, *hi)))
                .collect(),
            labels: self.chart.labels.clone(),
            legend: self.chart.legend,
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
