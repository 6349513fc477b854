//! Error types for sample aggregation and chart rendering.
//!
//! Aggregation errors are fatal to the call that raised them; the
//! caller decides whether to skip the affected group or abort.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while turning a results directory into plot-ready series.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The filename does not carry enough `_`-delimited tokens.
    #[error("malformed filename '{name}': expected at least {required} '_'-separated tokens, found {found}")]
    MalformedFilename {
        name: String,
        required: usize,
        found: usize,
    },

    /// The ordinal token of a filename is not an integer.
    #[error("invalid ordinal '{token}' in filename '{name}'")]
    InvalidOrdinal { name: String, token: String },

    /// A sample line could not be parsed as a number.
    #[error("{}:{line}: cannot parse '{text}' as a number", path.display())]
    ParseError {
        path: PathBuf,
        line: usize,
        text: String,
    },

    /// The series held no samples (or none survived trimming).
    #[error("{}: no samples to summarize ({read} read, {trimmed} trimmed)", path.display())]
    EmptySeries {
        path: PathBuf,
        read: usize,
        trimmed: usize,
    },

    /// Two files in the same group share an ordinal.
    #[error("group '{group}' has two files with ordinal {ordinal}: '{first}' and '{second}'")]
    DuplicateOrdinal {
        group: String,
        ordinal: i64,
        first: String,
        second: String,
    },

    /// The results directory is absent or not a directory.
    #[error("results directory not found: {}", path.display())]
    MissingDirectory { path: PathBuf },

    /// Any other I/O failure while listing or reading.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AggregateError {
    /// True for errors that stem from unparsable input (ordinal or sample).
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            AggregateError::InvalidOrdinal { .. } | AggregateError::ParseError { .. }
        )
    }
}

/// Errors raised by the chart renderer.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing backend reported a failure.
    #[error("drawing failed: {0}")]
    Backend(String),

    /// There is nothing to draw.
    #[error("nothing to plot: {0}")]
    NoData(String),

    /// Two panels would be written to the same file.
    #[error("panels '{first}' and '{second}' would both be written to {}", path.display())]
    OutputCollision {
        first: String,
        second: String,
        path: PathBuf,
    },
}

pub type AggregateResult<T> = Result<T, AggregateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_classification() {
        let ordinal = AggregateError::InvalidOrdinal {
            name: "a_b_c".to_string(),
            token: "c".to_string(),
        };
        let sample = AggregateError::ParseError {
            path: PathBuf::from("a_b_1"),
            line: 1,
            text: "abc".to_string(),
        };
        let missing = AggregateError::MissingDirectory {
            path: PathBuf::from("nowhere"),
        };

        assert!(ordinal.is_parse_error());
        assert!(sample.is_parse_error());
        assert!(!missing.is_parse_error());
    }

    #[test]
    fn test_error_messages() {
        let err = AggregateError::MalformedFilename {
            name: "a_b".to_string(),
            required: 3,
            found: 2,
        };
        assert!(err.to_string().contains("a_b"));
        assert!(err.to_string().contains("at least 3"));

        let err = AggregateError::ParseError {
            path: PathBuf::from("dir/read_x_1"),
            line: 4,
            text: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "dir/read_x_1:4: cannot parse 'abc' as a number");
    }
}
