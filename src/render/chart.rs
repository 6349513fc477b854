//! plotters drawing of laid-out charts.

use super::{ChartSpec, LegendPosition, OutputKind, PlotData};
use crate::error::RenderError;
use crate::models::{Panel, TraceSeries};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::ranged1d::Ranged;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Width in pixels of the error bar caps.
const ERROR_CAP_WIDTH: u32 = 12;

/// Draw one panel of mean ± standard error series to `path`.
pub fn render_panel(panel: &Panel, spec: &ChartSpec, path: &Path) -> Result<(), RenderError> {
    let plot = PlotData::from_panel(panel, spec).ok_or_else(|| {
        RenderError::NoData(format!(
            "panel {} has no points",
            panel.key.as_deref().unwrap_or("<all>")
        ))
    })?;

    draw_to(path, spec, &plot)?;
    info!("Wrote chart {}", path.display());
    Ok(())
}

/// Draw raw sample traces to `path`.
pub fn render_traces(
    traces: &[TraceSeries],
    spec: &ChartSpec,
    path: &Path,
) -> Result<(), RenderError> {
    let plot = PlotData::from_traces(traces, spec)
        .ok_or_else(|| RenderError::NoData("no samples in any trace".to_string()))?;

    draw_to(path, spec, &plot)?;
    info!("Wrote trace chart {}", path.display());
    Ok(())
}

fn draw_to(path: &Path, spec: &ChartSpec, plot: &PlotData) -> Result<(), RenderError> {
    let size = (spec.width, spec.height);
    debug!(
        "Drawing {} line(s), x {:?}, y {:?}",
        plot.lines.len(),
        plot.x_range,
        plot.y_range
    );

    match OutputKind::from_path(path) {
        OutputKind::Svg => draw_chart(SVGBackend::new(path, size).into_drawing_area(), spec, plot),
        OutputKind::Bitmap => {
            draw_chart(BitMapBackend::new(path, size).into_drawing_area(), spec, plot)
        }
    }
}

fn backend_error<E>(err: DrawingAreaErrorKind<E>) -> RenderError
where
    E: std::error::Error + Send + Sync,
{
    RenderError::Backend(err.to_string())
}

fn font(size: u32) -> FontDesc<'static> {
    ("sans-serif", size as f64).into_font()
}

fn draw_chart<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    spec: &ChartSpec,
    plot: &PlotData,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(backend_error)?;

    let mut builder = ChartBuilder::on(&root);
    builder
        .margin(20)
        .x_label_area_size(spec.font_size * 3)
        .y_label_area_size(spec.font_size * 4);
    if !spec.title.is_empty() {
        builder.caption(&spec.title, font(spec.font_size + 8));
    }

    let (x0, x1) = plot.x_range;
    let (y0, y1) = plot.y_range;
    let x_formatter = |x: &f64| plot.format_x(*x);

    if spec.log_y {
        let mut chart = builder
            .build_cartesian_2d(x0..x1, (y0..y1).log_scale())
            .map_err(backend_error)?;
        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_labels(plot.x_label_count())
            .x_label_formatter(&x_formatter)
            .label_style(font(spec.font_size))
            .axis_desc_style(font(spec.font_size))
            .draw()
            .map_err(backend_error)?;
        draw_lines(&mut chart, spec, plot)?;
    } else {
        let mut chart = builder
            .build_cartesian_2d(x0..x1, y0..y1)
            .map_err(backend_error)?;
        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .x_labels(plot.x_label_count())
            .x_label_formatter(&x_formatter)
            .label_style(font(spec.font_size))
            .axis_desc_style(font(spec.font_size))
            .draw()
            .map_err(backend_error)?;
        draw_lines(&mut chart, spec, plot)?;
    }

    root.present().map_err(backend_error)?;
    Ok(())
}

fn draw_lines<'a, DB, Y>(
    chart: &mut ChartContext<'a, DB, Cartesian2d<RangedCoordf64, Y>>,
    spec: &ChartSpec,
    plot: &PlotData,
) -> Result<(), RenderError>
where
    DB: DrawingBackend + 'a,
    Y: Ranged<ValueType = f64>,
{
    for (idx, line) in plot.lines.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        let style = color.stroke_width(spec.line_width);

        chart
            .draw_series(LineSeries::new(
                line.points.iter().map(|p| (p.x, p.y)),
                style,
            ))
            .map_err(backend_error)?
            .label(line.label.clone())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3))
            });

        chart
            .draw_series(line.points.iter().filter_map(|p| {
                p.error
                    .map(|(lo, hi)| ErrorBar::new_vertical(p.x, lo, p.y, hi, style, ERROR_CAP_WIDTH))
            }))
            .map_err(backend_error)?;
    }

    let position = match spec.legend {
        LegendPosition::UpperRight => SeriesLabelPosition::UpperRight,
        LegendPosition::UpperLeft => SeriesLabelPosition::UpperLeft,
        LegendPosition::LowerRight => SeriesLabelPosition::LowerRight,
        LegendPosition::LowerLeft => SeriesLabelPosition::LowerLeft,
    };

    chart
        .configure_series_labels()
        .position(position)
        .label_font(font(spec.font_size))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(backend_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Series, StatPoint};
    use tempfile::TempDir;

    #[test]
    fn test_render_panel_to_svg() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chart.svg");
        let panel = Panel {
            key: Some("read".to_string()),
            series: vec![Series {
                key: "fuse".to_string(),
                points: vec![
                    StatPoint {
                        order_key: 1,
                        mean: 2.5,
                        standard_error: 0.5,
                        samples: 3,
                    },
                    StatPoint {
                        order_key: 2,
                        mean: 4.0,
                        standard_error: 0.2,
                        samples: 3,
                    },
                ],
            }],
        };
        let spec = ChartSpec {
            title: "FUSE".to_string(),
            ..ChartSpec::default()
        };

        render_panel(&panel, &spec, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn test_render_empty_panel_is_no_data() {
        let dir = TempDir::new().unwrap();
        let panel = Panel {
            key: None,
            series: vec![],
        };

        let err = render_panel(&panel, &ChartSpec::default(), &dir.path().join("x.svg")).unwrap_err();
        assert!(matches!(err, RenderError::NoData(_)));
    }
}
