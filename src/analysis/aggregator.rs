//! Grouping of sample files and assembly of plot-ready series.
//!
//! The pipeline is: sample files -> optional panel split -> grouping by
//! the series token -> ordering by ordinal -> per-file statistics.

use crate::analysis::stats::{compute_point, read_series};
use crate::error::{AggregateError, AggregateResult};
use crate::models::{
    Panel, SampleFile, Series, TraceSeries, TrimPolicy, CATEGORY_TOKEN, VARIANT_TOKEN,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Files sharing the same token value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub key: String,
    pub files: Vec<SampleFile>,
}

/// Partition files by the token at `token_index`.
///
/// Groups appear in the order their key is first seen; files keep their
/// input order inside a group.
pub fn group_by_token(files: &[SampleFile], token_index: usize) -> AggregateResult<Vec<FileGroup>> {
    let mut groups: Vec<FileGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for file in files {
        let key = file
            .token(token_index)
            .ok_or_else(|| AggregateError::MalformedFilename {
                name: file.name.clone(),
                required: token_index + 1,
                found: file.token_count(),
            })?;

        match index.get(key) {
            Some(&slot) => groups[slot].files.push(file.clone()),
            None => {
                index.insert(key.to_string(), groups.len());
                groups.push(FileGroup {
                    key: key.to_string(),
                    files: vec![file.clone()],
                });
            }
        }
    }

    Ok(groups)
}

/// Sort a group ascending by ordinal, rejecting duplicate ordinals.
pub fn order_group(group: &FileGroup) -> AggregateResult<FileGroup> {
    let mut files = group.files.clone();
    files.sort_by_key(|f| f.ordinal);

    if let Some(pair) = files.windows(2).find(|w| w[0].ordinal == w[1].ordinal) {
        return Err(AggregateError::DuplicateOrdinal {
            group: group.key.clone(),
            ordinal: pair[0].ordinal,
            first: pair[0].name.clone(),
            second: pair[1].name.clone(),
        });
    }

    Ok(FileGroup {
        key: group.key.clone(),
        files,
    })
}

/// Parameters of an aggregation run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateOptions {
    /// Token whose value names a plotted line.
    pub series_token: usize,
    /// Token whose value splits files into separate charts.
    pub panel_token: Option<usize>,
    pub trim: TrimPolicy,
    /// Multiplier applied to every sample.
    pub value_scale: f64,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            series_token: CATEGORY_TOKEN,
            panel_token: Some(VARIANT_TOKEN),
            trim: TrimPolicy::None,
            value_scale: 1.0,
        }
    }
}

/// Grouping of one chart before any sample is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelPlan {
    pub key: Option<String>,
    /// Series groups, each ordered by ordinal.
    pub groups: Vec<FileGroup>,
}

/// Turns the sample files of one results directory into series.
pub struct Aggregator {
    dir: PathBuf,
    options: AggregateOptions,
    progress: ProgressBar,
}

impl Aggregator {
    /// Create an aggregator over `dir`. Progress output is off by default.
    pub fn new(dir: impl Into<PathBuf>, options: AggregateOptions) -> Self {
        Self {
            dir: dir.into(),
            options,
            progress: ProgressBar::hidden(),
        }
    }

    /// Show a progress bar while sample files are read.
    pub fn with_progress(mut self, show: bool) -> Self {
        if show {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            self.progress = pb;
        }
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Split `files` into panels and ordered series groups without reading samples.
    pub fn plan(&self, files: &[SampleFile]) -> AggregateResult<Vec<PanelPlan>> {
        let panel_groups: Vec<(Option<String>, Vec<SampleFile>)> = match self.options.panel_token {
            Some(token) => group_by_token(files, token)?
                .into_iter()
                .map(|g| (Some(g.key), g.files))
                .collect(),
            None => vec![(None, files.to_vec())],
        };

        let mut plans = Vec::with_capacity(panel_groups.len());
        for (key, panel_files) in panel_groups {
            let groups = group_by_token(&panel_files, self.options.series_token)?
                .iter()
                .map(order_group)
                .collect::<AggregateResult<Vec<_>>>()?;
            plans.push(PanelPlan { key, groups });
        }

        Ok(plans)
    }

    /// Aggregate `files` into panels of mean/standard-error series.
    pub fn aggregate(&self, files: &[SampleFile]) -> AggregateResult<Vec<Panel>> {
        let plans = self.plan(files)?;
        self.progress.set_length(files.len() as u64);

        let mut panels = Vec::with_capacity(plans.len());
        for plan in plans {
            debug!("Panel {:?}: {} series", plan.key, plan.groups.len());
            let series = self.build_series(plan.groups)?;
            panels.push(Panel {
                key: plan.key,
                series,
            });
        }

        self.progress.finish_with_message("samples read");
        info!(
            "Aggregated {} files into {} panel(s)",
            files.len(),
            panels.len()
        );

        Ok(panels)
    }

    fn build_series(&self, groups: Vec<FileGroup>) -> AggregateResult<Vec<Series>> {
        let mut series = Vec::with_capacity(groups.len());

        for ordered in groups {
            let mut points = Vec::with_capacity(ordered.files.len());

            for file in &ordered.files {
                self.progress.set_message(file.name.clone());
                let point =
                    compute_point(&self.dir, file, self.options.trim, self.options.value_scale)?;
                points.push(point);
                self.progress.inc(1);
            }

            series.push(Series {
                key: ordered.key,
                points,
            });
        }

        Ok(series)
    }

    /// Load the raw samples of every file, grouped by the series token and
    /// ordered by ordinal inside each group.
    pub fn traces(&self, files: &[SampleFile]) -> AggregateResult<Vec<TraceSeries>> {
        self.progress.set_length(files.len() as u64);

        let mut ordered = Vec::with_capacity(files.len());
        for group in group_by_token(files, self.options.series_token)? {
            ordered.extend(order_group(&group)?.files);
        }

        let mut traces = Vec::with_capacity(ordered.len());
        for file in &ordered {
            self.progress.set_message(file.name.clone());
            let mut values = read_series(&self.dir.join(&file.name))?;
            if self.options.value_scale != 1.0 {
                values.iter_mut().for_each(|v| *v *= self.options.value_scale);
            }

            let label = file
                .token(self.options.series_token)
                .unwrap_or_else(|| file.category())
                .to_string();

            traces.push(TraceSeries {
                label,
                order_key: file.ordinal,
                values,
            });
            self.progress.inc(1);
        }

        self.progress.finish_with_message("samples read");
        Ok(traces)
    }
}

/// Smallest and largest error-bar bound across all panels.
pub fn value_extent(panels: &[Panel]) -> Option<(f64, f64)> {
    panels
        .iter()
        .flat_map(|p| &p.series)
        .flat_map(|s| &s.points)
        .map(|p| p.error_bounds())
        .fold(None, |acc, (lo, hi)| match acc {
            None => Some((lo, hi)),
            Some((min, max)) => Some((min.min(lo), max.max(hi))),
        })
}
