//! HTML Chart Renderer
//! Emits self-contained interactive chart documents.
//!
//! All SVG drawing happens client-side in wildfire_chart.js. This module
//! serializes the chart payload to JSON and wraps it in the HTML shell, so
//! the written file needs no network access to display.

use crate::charts::plotter::{ChartPlotter, EvolutionChart, PieChart};
use crate::data::FireTable;
use crate::stats::AggregateError;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CHART_JS: &str = include_str!("wildfire_chart.js");

pub const EVOLUTION_FILE_NAME: &str = "burnt_area_evolution_graph.html";

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Aggregation failed: {0}")]
    Aggregate(#[from] AggregateError),
    #[error("Failed to serialize chart data: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// File name of the pie chart for `year`.
pub fn pie_chart_file_name(year: i32) -> String {
    format!("pie_chart_total_burnt_area_{}.html", year)
}

pub struct HtmlChartRenderer;

impl HtmlChartRenderer {
    pub fn evolution_html(chart: &EvolutionChart) -> Result<String, ChartError> {
        Self::document(&chart.title, "line", chart)
    }

    pub fn pie_html(chart: &PieChart) -> Result<String, ChartError> {
        Self::document(&chart.title, "pie", chart)
    }

    fn document<T: Serialize>(title: &str, kind: &str, payload: &T) -> Result<String, ChartError> {
        // "</" would close the inline script early
        let data_json = serde_json::to_string(payload)?.replace("</", "<\\/");

        Ok(format!(
            r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>
  body {{ margin: 0; padding: 16px; font-family: sans-serif; background: #fff; color: #2a3f5f; }}
  h1 {{ font-size: 18px; font-weight: 600; margin: 0 0 8px 0; }}
  #wf-chart {{ position: relative; }}
  #wf-chart svg {{ display: block; }}
  .axis-label {{ font-size: 12px; fill: #2a3f5f; }}
  .tick-label {{ font-size: 11px; fill: #506784; }}
  .grid {{ stroke: #e5ecf6; stroke-width: 1; }}
  .legend-item {{ cursor: pointer; font-size: 12px; }}
  .legend-item.hidden {{ opacity: 0.35; }}
  .slice:hover {{ opacity: 0.8; }}
  .empty {{ font-size: 14px; fill: #868e96; }}
  #wf-tooltip {{ position: absolute; pointer-events: none; display: none; padding: 4px 8px;
    background: rgba(42, 63, 95, 0.9); color: #fff; font-size: 12px; border-radius: 3px; white-space: pre; }}
</style>
</head>
<body>
<h1>{title}</h1>
<div id="wf-chart"><div id="wf-tooltip"></div></div>
<script>
{chart_js}
WildfireChart.create("{kind}", document.getElementById("wf-chart"), {data_json});
</script>
</body>
</html>
"##,
            title = escape_html(title),
            chart_js = CHART_JS,
            kind = kind,
            data_json = data_json,
        ))
    }

    /// Write `html` to `output_folder/file_name`. The folder must already exist.
    pub fn write_document(
        output_folder: &Path,
        file_name: &str,
        html: &str,
    ) -> Result<PathBuf, ChartError> {
        let path = output_folder.join(file_name);
        fs::write(&path, html).map_err(|source| ChartError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Line chart of total burnt hectares per department over the years.
///
/// Written to `{output_folder}/burnt_area_evolution_graph.html`.
pub fn evolution_graph(
    table: &FireTable,
    output_folder: impl AsRef<Path>,
) -> Result<PathBuf, ChartError> {
    let chart = ChartPlotter::evolution_chart(table)?;
    let html = HtmlChartRenderer::evolution_html(&chart)?;
    let path = HtmlChartRenderer::write_document(output_folder.as_ref(), EVOLUTION_FILE_NAME, &html)?;
    info!(
        "Wrote evolution graph ({} departments, {} years) to {}",
        chart.series.len(),
        chart.years.len(),
        path.display()
    );
    Ok(path)
}

/// Pie chart of one year's burnt hectares split by department.
///
/// Written to `{output_folder}/pie_chart_total_burnt_area_{year}.html`. A year
/// without fires still produces a document, with no slices.
pub fn pie_chart_burnt_area(
    table: &FireTable,
    year: i32,
    output_folder: impl AsRef<Path>,
) -> Result<PathBuf, ChartError> {
    let chart = ChartPlotter::pie_chart(table, year)?;
    if chart.slices.is_empty() {
        warn!("No fires recorded in {}; pie chart will be empty", year);
    }
    let html = HtmlChartRenderer::pie_html(&chart)?;
    let path =
        HtmlChartRenderer::write_document(output_folder.as_ref(), &pie_chart_file_name(year), &html)?;
    info!(
        "Wrote pie chart for {} ({} departments) to {}",
        year,
        chart.slices.len(),
        path.display()
    );
    Ok(path)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
