//! Data models for benchmark aggregation.
//!
//! This module contains the core data structures used throughout
//! the application: validated sample filenames, per-file statistics,
//! plot-ready series and the summary report.

use crate::error::{AggregateError, AggregateResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token separator used in sample filenames.
pub const TOKEN_SEPARATOR: char = '_';

/// Index of the primary category token.
pub const CATEGORY_TOKEN: usize = 0;

/// Index of the variant token.
pub const VARIANT_TOKEN: usize = 1;

/// Index of the integer ordinal token.
pub const ORDINAL_TOKEN: usize = 2;

/// Minimum number of tokens a sample filename must carry.
pub const MIN_TOKENS: usize = ORDINAL_TOKEN + 1;

/// A validated sample filename: `<category>_<variant>_<ordinal>[_...]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SampleFile {
    /// The filename as found in the results directory.
    pub name: String,
    tokens: Vec<String>,
    /// Parsed value of the ordinal token.
    pub ordinal: i64,
}

impl SampleFile {
    /// Parse and validate a filename.
    pub fn parse(name: &str) -> AggregateResult<Self> {
        let tokens: Vec<String> = name.split(TOKEN_SEPARATOR).map(String::from).collect();

        if tokens.len() < MIN_TOKENS {
            return Err(AggregateError::MalformedFilename {
                name: name.to_string(),
                required: MIN_TOKENS,
                found: tokens.len(),
            });
        }

        let raw = &tokens[ORDINAL_TOKEN];
        let ordinal = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AggregateError::InvalidOrdinal {
                name: name.to_string(),
                token: raw.clone(),
            })?;

        Ok(Self {
            name: name.to_string(),
            tokens,
            ordinal,
        })
    }

    /// Token at `index`, if present.
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// Number of tokens in the filename.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn category(&self) -> &str {
        &self.tokens[CATEGORY_TOKEN]
    }
}

impl fmt::Display for SampleFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Outlier trimming applied before statistics are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimPolicy {
    /// Use every sample.
    #[default]
    None,
    /// Drop the `n` lowest and `n` highest samples.
    Symmetric(usize),
}

impl TrimPolicy {
    /// Build a policy from a per-side count, where 0 means no trimming.
    pub fn from_count(n: usize) -> Self {
        if n == 0 {
            TrimPolicy::None
        } else {
            TrimPolicy::Symmetric(n)
        }
    }
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimPolicy::None => write!(f, "none"),
            TrimPolicy::Symmetric(n) => write!(f, "symmetric({})", n),
        }
    }
}

/// Summary statistics of one sample file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatPoint {
    /// Ordinal of the sample file, used for x placement and ordering.
    pub order_key: i64,
    /// Arithmetic mean of the (trimmed) samples.
    pub mean: f64,
    /// Sample standard deviation divided by the square root of the count.
    pub standard_error: f64,
    /// Number of samples that entered the statistics.
    pub samples: usize,
}

impl StatPoint {
    /// Lower and upper ends of the error bar.
    pub fn error_bounds(&self) -> (f64, f64) {
        (
            self.mean - self.standard_error,
            self.mean + self.standard_error,
        )
    }
}

/// One plotted line: a group key with its ordered points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub key: String,
    pub points: Vec<StatPoint>,
}

/// The series that share one chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Value of the panel token, or `None` when everything goes on one chart.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub series: Vec<Series>,
}

impl Panel {
    /// Total number of points across all series.
    pub fn point_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

/// Raw samples of a single file, plotted against their sample index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceSeries {
    pub label: String,
    pub order_key: i64,
    pub values: Vec<f64>,
}

/// Metadata about an aggregation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Results directory that was aggregated.
    pub directory: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Trimming applied to every file.
    pub trim: TrimPolicy,
    /// Multiplier applied to every sample.
    pub value_scale: f64,
    /// Number of sample files read.
    pub files_read: usize,
    /// Category filter, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

/// The complete aggregation report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub panels: Vec<Panel>,
}
