//! Charts module - HTML chart export

mod plotter;
mod renderer;

pub use plotter::{ChartPlotter, EvolutionChart, LineSeries, PieChart, PieSlice};
pub use renderer::{
    evolution_graph, pie_chart_burnt_area, pie_chart_file_name, ChartError, HtmlChartRenderer,
    EVOLUTION_FILE_NAME,
};
