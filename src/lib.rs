//! Wildfire Insight - wildfire incident log analysis.
//!
//! Loads the semicolon-delimited fire log into a normalized Polars table,
//! aggregates burnt area per year and department, and exports HTML charts.

pub mod charts;
pub mod data;
pub mod stats;

pub use charts::{evolution_graph, pie_chart_burnt_area, ChartError};
pub use data::{FireLoader, FireTable, LoaderConfig, LoaderError};
pub use stats::{burnt_area_statistics, count_fires, sum_burnt_area, AggregateError, FireFilter};
