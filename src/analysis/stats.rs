//! Sample parsing and summary statistics.
//!
//! A sample file holds one decimal number per line, optionally followed
//! by a single unit character (`1.5s`). Whitespace-only lines are skipped.

use crate::error::{AggregateError, AggregateResult};
use crate::models::{SampleFile, StatPoint, TrimPolicy};
use std::path::Path;
use tracing::debug;

/// Mean and standard error of a sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub standard_error: f64,
}

/// Strip an optional trailing unit character and parse the remainder.
///
/// Returns `None` for text that is not a number after stripping.
pub fn parse_sample(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = match trimmed.chars().last() {
        Some(c) if !c.is_ascii_digit() && c != '.' => &trimmed[..trimmed.len() - c.len_utf8()],
        _ => trimmed,
    };

    let number = number.trim_end();
    if number.is_empty() {
        return None;
    }

    number.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the contents of a sample file.
///
/// `path` is only used to label errors.
pub fn parse_series(path: &Path, content: &str) -> AggregateResult<Vec<f64>> {
    let mut values = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let value = parse_sample(line).ok_or_else(|| AggregateError::ParseError {
            path: path.to_path_buf(),
            line: idx + 1,
            text: line.trim().to_string(),
        })?;
        values.push(value);
    }

    Ok(values)
}

/// Read every sample in the file at `path`.
pub fn read_series(path: &Path) -> AggregateResult<Vec<f64>> {
    let content = std::fs::read_to_string(path).map_err(|source| AggregateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let values = parse_series(path, &content)?;
    debug!("Read {} samples from {}", values.len(), path.display());
    Ok(values)
}

/// Apply a trimming policy, returning the surviving samples in ascending order
/// (or unchanged when no trimming is requested).
pub fn apply_trim(values: &[f64], trim: TrimPolicy) -> Vec<f64> {
    match trim {
        TrimPolicy::None => values.to_vec(),
        TrimPolicy::Symmetric(n) => {
            if values.len() <= n.saturating_mul(2) {
                return Vec::new();
            }
            let mut sorted = values.to_vec();
            sorted.sort_by(f64::total_cmp);
            sorted[n..sorted.len() - n].to_vec()
        }
    }
}

/// Mean and standard error of the mean.
///
/// The standard error uses the sample standard deviation (n - 1 denominator);
/// a single sample has a standard error of zero. Returns `None` when empty.
pub fn summarize(values: &[f64]) -> Option<Summary> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;

    let standard_error = if values.len() > 1 {
        let variance = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0);
        variance.sqrt() / n.sqrt()
    } else {
        0.0
    };

    Some(Summary {
        count: values.len(),
        mean,
        standard_error,
    })
}

/// Summarize already-loaded samples, labelling failures with `path`.
pub fn summarize_series(
    path: &Path,
    values: &[f64],
    trim: TrimPolicy,
) -> AggregateResult<Summary> {
    let kept = apply_trim(values, trim);

    summarize(&kept).ok_or_else(|| AggregateError::EmptySeries {
        path: path.to_path_buf(),
        read: values.len(),
        trimmed: values.len() - kept.len(),
    })
}

/// Read a sample file and compute its statistics.
pub fn compute_stats(path: &Path, trim: TrimPolicy) -> AggregateResult<Summary> {
    let values = read_series(path)?;
    summarize_series(path, &values, trim)
}

/// Compute the plot point for one sample file inside `dir`.
///
/// The mean and standard error are scaled by `scale` (|`scale`| for the error),
/// which equals scaling every sample first.
pub fn compute_point(
    dir: &Path,
    file: &SampleFile,
    trim: TrimPolicy,
    scale: f64,
) -> AggregateResult<StatPoint> {
    let summary = compute_stats(&dir.join(&file.name), trim)?;

    Ok(StatPoint {
        order_key: file.ordinal,
        mean: summary.mean * scale,
        standard_error: summary.standard_error * scale.abs(),
        samples: summary.count,
    })
}
