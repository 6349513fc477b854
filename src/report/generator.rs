//! Markdown and JSON report generation.
//!
//! Reports list the aggregated numbers behind every chart so they can
//! be checked or reused without reading the image.

use crate::models::{Panel, Report, ReportMetadata, Series};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("# Benchmark Summary\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    if report.panels.is_empty() {
        output.push_str("No sample files were aggregated.\n\n");
    }

    for panel in &report.panels {
        output.push_str(&generate_panel_section(panel));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Directory:** `{}`\n", metadata.directory));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Files Read:** {}\n", metadata.files_read));
    section.push_str(&format!("- **Trimming:** {}\n", metadata.trim));
    if metadata.value_scale != 1.0 {
        section.push_str(&format!("- **Value Scale:** {}\n", metadata.value_scale));
    }
    if let Some(ref filter) = metadata.filter {
        section.push_str(&format!("- **Filter:** `{}`\n", filter));
    }
    section.push('\n');

    section
}

/// Generate the table for one panel.
fn generate_panel_section(panel: &Panel) -> String {
    let mut section = String::new();

    match panel.key {
        Some(ref key) => section.push_str(&format!("## {}\n\n", key)),
        None => section.push_str("## All Series\n\n"),
    }

    section.push_str("| Series | Order Key | Samples | Mean | Std. Error |\n");
    section.push_str("|:---|---:|---:|---:|---:|\n");

    for series in &panel.series {
        section.push_str(&generate_series_rows(series));
    }
    section.push('\n');

    section
}

fn generate_series_rows(series: &Series) -> String {
    series
        .points
        .iter()
        .map(|p| {
            format!(
                "| {} | {} | {} | {:.6} | {:.6} |\n",
                series.key, p.order_key, p.samples, p.mean, p.standard_error
            )
        })
        .collect()
}

/// Generate the report footer.
fn generate_footer() -> String {
    "---\n\n*Generated by benchplot*\n".to_string()
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}
