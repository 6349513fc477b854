//! Chart rendering.
//!
//! Aggregated series are turned into a [`PlotData`] layout (pure, tested
//! here) and then drawn with plotters by the `chart` module. Every styling
//! decision lives in [`ChartSpec`].

mod chart;

pub use chart::{render_panel, render_traces};

use crate::error::RenderError;
use crate::models::{Panel, TraceSeries};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// Relative padding added around the data range.
const RANGE_PADDING: f64 = 0.05;

/// How points are placed along the x axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum XAxis {
    /// x is the ordinal taken from the filename
    #[default]
    Ordinal,
    /// x is the ordinal, labelled as 2^ordinal
    PowerOfTwo,
    /// x is the 1-based position inside the series, labelled with the ordinal
    Position,
}

/// Where the legend box goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LegendPosition {
    #[default]
    UpperRight,
    UpperLeft,
    LowerRight,
    LowerLeft,
}

/// Everything needed to style one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub line_width: u32,
    pub x_axis: XAxis,
    pub log_y: bool,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    /// Fixed y ranges keyed by panel key.
    pub panel_y_ranges: BTreeMap<String, (f64, f64)>,
    /// Legend label rewrites keyed by series key.
    pub labels: BTreeMap<String, String>,
    pub legend: LegendPosition,
}

impl Default for ChartSpec {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            width: 1600,
            height: 1000,
            font_size: 28,
            line_width: 3,
            x_axis: XAxis::Ordinal,
            log_y: false,
            y_min: None,
            y_max: None,
            panel_y_ranges: BTreeMap::new(),
            labels: BTreeMap::new(),
            legend: LegendPosition::UpperRight,
        }
    }
}

impl ChartSpec {
    /// Legend label for a series key.
    pub fn label_for(&self, key: &str) -> String {
        self.labels
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }

    /// Y axis range for a panel given the values that must stay visible.
    ///
    /// A per-panel range wins, then fixed bounds, then the padded data range.
    pub fn y_bounds(&self, panel_key: Option<&str>, values: &[f64]) -> (f64, f64) {
        if let Some(range) = panel_key.and_then(|k| self.panel_y_ranges.get(k)) {
            return *range;
        }

        let (lo, hi) = if self.log_y {
            log_padded_range(values)
        } else {
            padded_range(values)
        };

        let lo = self.y_min.unwrap_or(lo);
        let hi = self.y_max.unwrap_or(hi);
        if hi > lo {
            (lo, hi)
        } else {
            (lo, lo + 1.0)
        }
    }
}

/// Data range with relative padding; degenerate ranges get a unit span.
pub fn padded_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = match extent(values.iter().copied()) {
        Some(e) => e,
        None => return (0.0, 1.0),
    };

    let span = hi - lo;
    if span > 0.0 {
        (lo - span * RANGE_PADDING, hi + span * RANGE_PADDING)
    } else if lo != 0.0 {
        let pad = lo.abs() * RANGE_PADDING;
        (lo - pad, hi + pad)
    } else {
        (-0.5, 0.5)
    }
}

/// Positive range for a log axis; non-positive values are ignored.
pub fn log_padded_range(values: &[f64]) -> (f64, f64) {
    match extent(values.iter().copied().filter(|v| *v > 0.0)) {
        Some((lo, hi)) => (lo * (1.0 - RANGE_PADDING), hi * (1.0 + RANGE_PADDING)),
        None => (0.1, 1.0),
    }
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Image format chosen from the output path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Bitmap,
    Svg,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("svg") => OutputKind::Svg,
            _ => OutputKind::Bitmap,
        }
    }
}

/// Output path for one panel: `<stem>_<key>.<ext>` beside `base`.
pub fn panel_output_path(base: &Path, panel_key: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "benchplot".to_string());
    let key: String = panel_key
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '-' })
        .collect();

    let mut name = format!("{}_{}", stem, key);
    if let Some(ext) = base.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    base.with_file_name(name)
}

/// Output paths for a set of panels, in order.
///
/// A single panel (or an unkeyed one) is written to `base` itself. Keys that
/// sanitize to the same file name are rejected.
pub fn panel_output_paths(base: &Path, panels: &[Panel]) -> Result<Vec<PathBuf>, RenderError> {
    let mut seen: HashMap<PathBuf, &str> = HashMap::new();
    let mut paths = Vec::with_capacity(panels.len());

    for panel in panels {
        let key = panel.key.as_deref().unwrap_or("");
        let path = match panel.key {
            Some(ref key) if panels.len() > 1 => panel_output_path(base, key),
            _ => base.to_path_buf(),
        };

        if let Some(first) = seen.insert(path.clone(), key) {
            return Err(RenderError::OutputCollision {
                first: first.to_string(),
                second: key.to_string(),
                path,
            });
        }
        paths.push(path);
    }

    Ok(paths)
}

/// One drawn point; `error` holds the error bar ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotPoint {
    pub x: f64,
    pub y: f64,
    pub error: Option<(f64, f64)>,
}

/// One drawn line.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotLine {
    pub label: String,
    pub points: Vec<PlotPoint>,
}

/// Chart layout: lines, axis ranges and tick labelling.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub lines: Vec<PlotLine>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_axis: XAxis,
    /// Ordinals shown at positions 1..n in `Position` mode.
    pub position_keys: Vec<i64>,
}

impl PlotData {
    /// Lay out a panel of mean/standard-error series. `None` when it has no points.
    pub fn from_panel(panel: &Panel, spec: &ChartSpec) -> Option<Self> {
        if panel.point_count() == 0 {
            return None;
        }

        let lines: Vec<PlotLine> = panel
            .series
            .iter()
            .map(|series| PlotLine {
                label: spec.label_for(&series.key),
                points: series
                    .points
                    .iter()
                    .enumerate()
                    .map(|(idx, p)| PlotPoint {
                        x: match spec.x_axis {
                            XAxis::Position => (idx + 1) as f64,
                            XAxis::Ordinal | XAxis::PowerOfTwo => p.order_key as f64,
                        },
                        y: p.mean,
                        error: Some(p.error_bounds()),
                    })
                    .collect(),
            })
            .collect();

        let position_keys = panel
            .series
            .iter()
            .max_by_key(|s| s.points.len())
            .map(|s| s.points.iter().map(|p| p.order_key).collect())
            .unwrap_or_default();

        Some(Self::layout(lines, spec, panel.key.as_deref(), spec.x_axis, position_keys))
    }

    /// Lay out raw traces against their 1-based sample index, one line per file.
    pub fn from_traces(traces: &[TraceSeries], spec: &ChartSpec) -> Option<Self> {
        if traces.iter().all(|t| t.values.is_empty()) {
            return None;
        }

        let lines = traces
            .iter()
            .map(|trace| PlotLine {
                label: format!("{} #{}", spec.label_for(&trace.label), trace.order_key),
                points: trace
                    .values
                    .iter()
                    .enumerate()
                    .map(|(idx, v)| PlotPoint {
                        x: (idx + 1) as f64,
                        y: *v,
                        error: None,
                    })
                    .collect(),
            })
            .collect();

        Some(Self::layout(lines, spec, None, XAxis::Ordinal, Vec::new()))
    }

    fn layout(
        lines: Vec<PlotLine>,
        spec: &ChartSpec,
        panel_key: Option<&str>,
        x_axis: XAxis,
        position_keys: Vec<i64>,
    ) -> Self {
        let xs: Vec<f64> = lines.iter().flat_map(|l| &l.points).map(|p| p.x).collect();
        let ys: Vec<f64> = lines
            .iter()
            .flat_map(|l| &l.points)
            .flat_map(|p| {
                let (lo, hi) = p.error.unwrap_or((p.y, p.y));
                [lo, p.y, hi]
            })
            .collect();

        Self {
            x_range: padded_range(&xs),
            y_range: spec.y_bounds(panel_key, &ys),
            lines,
            x_axis,
            position_keys,
        }
    }

    /// Tick label for an x value; empty between integer positions.
    pub fn format_x(&self, x: f64) -> String {
        let rounded = x.round();
        let is_integer = (x - rounded).abs() < 1e-9;

        match self.x_axis {
            XAxis::Ordinal if is_integer => format!("{}", rounded as i64),
            XAxis::Ordinal => format!("{:.2}", x),
            XAxis::PowerOfTwo if is_integer => power_of_two_label(rounded as i64),
            XAxis::Position if is_integer && rounded >= 1.0 => self
                .position_keys
                .get(rounded as usize - 1)
                .map(|k| k.to_string())
                .unwrap_or_default(),
            XAxis::PowerOfTwo | XAxis::Position => String::new(),
        }
    }

    /// Number of x ticks to request from the mesh.
    pub fn x_label_count(&self) -> usize {
        let (lo, hi) = self.x_range;
        let span = (hi.floor() - lo.ceil()).clamp(0.0, 19.0) as usize + 1;
        span.max(2)
    }
}

/// `2^exp` as an integer where it fits, `2^exp` notation otherwise.
pub fn power_of_two_label(exp: i64) -> String {
    if (0..63).contains(&exp) {
        (1i64 << exp).to_string()
    } else {
        format!("2^{}", exp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Series, StatPoint};

    fn point(order_key: i64, mean: f64, standard_error: f64) -> StatPoint {
        StatPoint {
            order_key,
            mean,
            standard_error,
            samples: 10,
        }
    }

    fn panel() -> Panel {
        Panel {
            key: Some("read".to_string()),
            series: vec![
                Series {
                    key: "normal".to_string(),
                    points: vec![point(3, 1.0, 0.1), point(4, 2.0, 0.2), point(5, 4.0, 0.5)],
                },
                Series {
                    key: "fuse".to_string(),
                    points: vec![point(3, 2.0, 0.0)],
                },
            ],
        }
    }

    #[test]
    fn test_label_for() {
        let mut spec = ChartSpec::default();
        spec.labels.insert("normal".to_string(), "native FS".to_string());
        assert_eq!(spec.label_for("normal"), "native FS");
        assert_eq!(spec.label_for("fuse"), "fuse");
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[0.0, 10.0]), (-0.5, 10.5));
        assert_eq!(padded_range(&[]), (0.0, 1.0));
        assert_eq!(padded_range(&[0.0]), (-0.5, 0.5));
        let (lo, hi) = padded_range(&[2.0]);
        assert!(lo < 2.0 && hi > 2.0);
    }

    #[test]
    fn test_log_range_is_positive() {
        let (lo, hi) = log_padded_range(&[-1.0, 0.0, 2.0, 100.0]);
        assert!(lo > 0.0 && lo < 2.0);
        assert!(hi > 100.0);
        assert_eq!(log_padded_range(&[0.0]), (0.1, 1.0));
    }

    #[test]
    fn test_y_bounds_precedence() {
        let mut spec = ChartSpec::default();
        spec.panel_y_ranges.insert("read".to_string(), (0.004, 0.006));
        spec.y_max = Some(50.0);

        assert_eq!(spec.y_bounds(Some("read"), &[1.0, 2.0]), (0.004, 0.006));

        let (lo, hi) = spec.y_bounds(Some("write"), &[10.0, 20.0]);
        assert_eq!(hi, 50.0);
        assert!((lo - 9.5).abs() < 1e-9);

        spec.y_min = Some(60.0);
        let (lo, hi) = spec.y_bounds(None, &[10.0, 20.0]);
        assert!(hi > lo);
    }

    #[test]
    fn test_from_panel_ordinal() {
        let spec = ChartSpec::default();
        let plot = PlotData::from_panel(&panel(), &spec).unwrap();

        assert_eq!(plot.lines.len(), 2);
        let xs: Vec<f64> = plot.lines[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![3.0, 4.0, 5.0]);
        assert_eq!(plot.lines[0].points[2].error, Some((3.5, 4.5)));
        assert!(plot.y_range.0 < 0.9 && plot.y_range.1 > 4.5);
    }

    #[test]
    fn test_from_panel_position_labels() {
        let spec = ChartSpec {
            x_axis: XAxis::Position,
            ..ChartSpec::default()
        };
        let plot = PlotData::from_panel(&panel(), &spec).unwrap();

        let xs: Vec<f64> = plot.lines[0].points.iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(plot.position_keys, vec![3, 4, 5]);
        assert_eq!(plot.format_x(1.0), "3");
        assert_eq!(plot.format_x(3.0), "5");
        assert_eq!(plot.format_x(1.5), "");
        assert_eq!(plot.format_x(9.0), "");
    }

    #[test]
    fn test_power_of_two_labels() {
        let spec = ChartSpec {
            x_axis: XAxis::PowerOfTwo,
            ..ChartSpec::default()
        };
        let plot = PlotData::from_panel(&panel(), &spec).unwrap();
        assert_eq!(plot.format_x(3.0), "8");
        assert_eq!(plot.format_x(10.0), "1024");
        assert_eq!(plot.format_x(3.5), "");
        assert_eq!(power_of_two_label(70), "2^70");
    }

    #[test]
    fn test_from_panel_empty() {
        let empty = Panel {
            key: None,
            series: vec![],
        };
        assert!(PlotData::from_panel(&empty, &ChartSpec::default()).is_none());
    }

    #[test]
    fn test_from_traces() {
        let traces = vec![TraceSeries {
            label: "normal 10".to_string(),
            order_key: 1,
            values: vec![5.0, 6.0, 7.0],
        }];
        let plot = PlotData::from_traces(&traces, &ChartSpec::default()).unwrap();
        assert_eq!(plot.lines[0].label, "normal 10 #1");
        assert_eq!(plot.lines[0].points.len(), 3);
        assert_eq!(plot.lines[0].points[2].x, 3.0);
        assert!(plot.lines[0].points[0].error.is_none());
        assert_eq!(plot.format_x(2.0), "2");
    }

    #[test]
    fn test_output_kind_and_panel_paths() {
        assert_eq!(OutputKind::from_path(Path::new("a.svg")), OutputKind::Svg);
        assert_eq!(OutputKind::from_path(Path::new("a.SVG")), OutputKind::Svg);
        assert_eq!(OutputKind::from_path(Path::new("a.png")), OutputKind::Bitmap);

        assert_eq!(
            panel_output_path(Path::new("out/chart.png"), "read"),
            PathBuf::from("out/chart_read.png")
        );
        assert_eq!(
            panel_output_path(Path::new("chart.svg"), "rand write/4k"),
            PathBuf::from("chart_rand-write-4k.svg")
        );
    }

    #[test]
    fn test_panel_output_paths() {
        let keyed = |key: &str| Panel {
            key: Some(key.to_string()),
            series: vec![],
        };

        let single = panel_output_paths(Path::new("chart.png"), &[keyed("read")]).unwrap();
        assert_eq!(single, vec![PathBuf::from("chart.png")]);

        let paths =
            panel_output_paths(Path::new("chart.png"), &[keyed("read"), keyed("write")]).unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("chart_read.png"), PathBuf::from("chart_write.png")]
        );

        let err = panel_output_paths(Path::new("chart.png"), &[keyed("a b"), keyed("a-b")])
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::OutputCollision { ref first, ref second, .. } if first == "a b" && second == "a-b"
        ));
    }

    #[test]
    fn test_x_label_count() {
        let spec = ChartSpec::default();
        let plot = PlotData::from_panel(&panel(), &spec).unwrap();
        // x range 2.9..5.1 covers ticks 3, 4, 5
        assert_eq!(plot.x_label_count(), 3);

        let wide = Panel {
            key: None,
            series: vec![Series {
                key: "fuse".to_string(),
                points: vec![point(i64::MIN, 1.0, 0.0), point(i64::MAX, 2.0, 0.0)],
            }],
        };
        let plot = PlotData::from_panel(&wide, &spec).unwrap();
        assert_eq!(plot.x_label_count(), 20);
    }
}
