//! Chart Plotter Module
//! Turns aggregated burnt-area tables into chart payloads for the HTML renderer.

use crate::data::schema::fire;
use crate::data::FireTable;
use crate::stats::{burnt_area_by_department, burnt_area_by_year_and_department, AggregateError};
use serde::Serialize;

pub const EVOLUTION_TITLE: &str = "Evolution of Total Burnt Area by Department Over Years";

/// Series color palette
pub const PALETTE: [&str; 10] = [
    "#636efa", // Blue
    "#ef553b", // Red
    "#00cc96", // Green
    "#ab63fa", // Purple
    "#ffa15a", // Orange
    "#19d3f3", // Cyan
    "#ff6692", // Pink
    "#b6e880", // Lime
    "#ff97ff", // Magenta
    "#fecb52", // Yellow
];

/// One line of the evolution chart. `values[i]` belongs to `EvolutionChart::years[i]`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LineSeries {
    pub name: String,
    pub color: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EvolutionChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub years: Vec<i32>,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieSlice {
    pub label: String,
    pub color: String,
    pub value: f64,
    /// Fraction of the year's total, 0 when the total is 0
    pub share: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PieChart {
    pub title: String,
    pub year: i32,
    pub total: f64,
    pub slices: Vec<PieSlice>,
}

/// Builds chart payloads from the wildfire table.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color(index: usize) -> &'static str {
        PALETTE[index % PALETTE.len()]
    }

    /// Burnt hectares per department over the years, one series per department.
    pub fn evolution_chart(table: &FireTable) -> Result<EvolutionChart, AggregateError> {
        let wide = burnt_area_by_year_and_department(table)?;
        let years: Vec<i32> = wide
            .column(fire::YEAR)?
            .i32()?
            .into_iter()
            .flatten()
            .collect();

        let mut series = Vec::with_capacity(wide.width().saturating_sub(1));
        for (i, column) in wide.get_columns().iter().skip(1).enumerate() {
            series.push(LineSeries {
                name: column.name().to_string(),
                color: Self::color(i).to_string(),
                values: column.f64()?.into_iter().collect(),
            });
        }

        Ok(EvolutionChart {
            title: EVOLUTION_TITLE.to_string(),
            x_label: "Year".to_string(),
            y_label: "Total Burnt Area".to_string(),
            years,
            series,
        })
    }

    /// Share of one year's burnt hectares per department.
    pub fn pie_chart(table: &FireTable, year: i32) -> Result<PieChart, AggregateError> {
        let totals = burnt_area_by_department(table, year)?;
        let total: f64 = totals.iter().map(|(_, v)| v).sum();

        let slices = totals
            .into_iter()
            .enumerate()
            .map(|(i, (label, value))| PieSlice {
                label,
                color: Self::color(i).to_string(),
                value,
                share: if total > 0.0 { value / total } else { 0.0 },
            })
            .collect();

        Ok(PieChart {
            title: format!("Total Burnt Area for Year {}", year),
            year,
            total,
            slices,
        })
    }
}
