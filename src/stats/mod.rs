//! Stats module - grouped aggregations and descriptive statistics

mod aggregator;
mod calculator;

pub use aggregator::{
    burnt_area_by_department, burnt_area_by_year_and_department, burnt_area_statistics,
    count_fires, sum_burnt_area, AggregateError, FireFilter, ALL_DEPARTMENTS,
};
pub use calculator::{BurntAreaStats, StatsCalculator};
