//! Fire Aggregation Module
//! Grouped counts, sums and statistics of burnt area per (year, department).

use crate::data::schema::{aggregate, fire};
use crate::data::FireTable;
use crate::stats::calculator::StatsCalculator;
use log::{debug, info};
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// CLI sentinel meaning "every department".
pub const ALL_DEPARTMENTS: &str = "all";

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Missing column: {0}")]
    MissingColumn(String),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

const KEY_COLUMNS: [&str; 2] = [fire::YEAR, fire::DEPARTMENT];
const AREA_COLUMNS: [&str; 3] = [fire::YEAR, fire::DEPARTMENT, fire::SURFACE_HA];

fn require_columns(table: &FireTable, names: &[&str]) -> Result<(), AggregateError> {
    match names.iter().find(|n| table.data().column(n).is_err()) {
        Some(missing) => Err(AggregateError::MissingColumn(missing.to_string())),
        None => Ok(()),
    }
}

/// Optional (department, year) filter shared by every tabular aggregation.
///
/// Department matches by exact string equality, year by integer equality;
/// both together are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FireFilter {
    pub department: Option<String>,
    pub year: Option<i32>,
}

impl FireFilter {
    pub fn new(department: Option<&str>, year: Option<i32>) -> Self {
        Self {
            department: department.map(str::to_string),
            year,
        }
    }

    /// Filter from CLI arguments, where `"all"` disables the department filter.
    pub fn from_cli(department: &str, year: Option<i32>) -> Self {
        let department = (department != ALL_DEPARTMENTS).then_some(department);
        Self::new(department, year)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.department.is_none() && self.year.is_none()
    }

    fn predicate(&self) -> Option<Expr> {
        let by_department = self
            .department
            .as_ref()
            .map(|d| col(fire::DEPARTMENT).eq(lit(d.clone())));
        let by_year = self.year.map(|y| col(fire::YEAR).eq(lit(y)));

        match (by_department, by_year) {
            (Some(d), Some(y)) => Some(d.and(y)),
            (d, y) => d.or(y),
        }
    }

    /// Lazily apply the filter to the table.
    pub fn apply(&self, table: &FireTable) -> LazyFrame {
        let lf = table.data().clone().lazy();
        match self.predicate() {
            Some(predicate) => lf.filter(predicate),
            None => lf,
        }
    }
}

fn group_keys() -> [Expr; 2] {
    [col(fire::YEAR), col(fire::DEPARTMENT)]
}

fn sorted_by_keys(lf: LazyFrame) -> LazyFrame {
    lf.sort([fire::YEAR, fire::DEPARTMENT], SortMultipleOptions::default())
}

fn log_result(what: &str, filter: &FireFilter, df: &DataFrame) {
    if df.height() == 0 && filter.is_unfiltered() {
        info!("{}: the table holds no fires", what);
    } else if df.height() == 0 {
        info!("{}: no fires match {:?}", what, filter);
    } else {
        debug!("{}: {} groups for {:?}", what, df.height(), filter);
    }
}

/// Number of fires per (year, department).
///
/// Output columns: [year, department, FireCount]
pub fn count_fires(
    table: &FireTable,
    department: Option<&str>,
    year: Option<i32>,
) -> Result<DataFrame, AggregateError> {
    require_columns(table, &KEY_COLUMNS)?;
    let filter = FireFilter::new(department, year);
    let lf = filter
        .apply(table)
        .group_by(group_keys())
        .agg([len().alias(aggregate::FIRE_COUNT)]);
    let df = sorted_by_keys(lf).collect()?;

    log_result("count_fires", &filter, &df);
    Ok(df)
}

/// Total burnt hectares per (year, department). Missing areas contribute zero.
///
/// Output columns: [year, department, TotalBurntArea]
pub fn sum_burnt_area(
    table: &FireTable,
    department: Option<&str>,
    year: Option<i32>,
) -> Result<DataFrame, AggregateError> {
    require_columns(table, &AREA_COLUMNS)?;
    let filter = FireFilter::new(department, year);
    let lf = filter
        .apply(table)
        .group_by(group_keys())
        .agg([col(fire::SURFACE_HA)
            .sum()
            .alias(aggregate::TOTAL_BURNT_AREA)]);
    let df = sorted_by_keys(lf).collect()?;

    log_result("sum_burnt_area", &filter, &df);
    Ok(df)
}

/// Mean, median, Q1 and Q3 of burnt hectares per (year, department).
///
/// Only non-missing areas are used; a group without any yields NaN.
/// Output columns: [year, department, mean, median, Q1, Q3]
pub fn burnt_area_statistics(
    table: &FireTable,
    department: Option<&str>,
    year: Option<i32>,
) -> Result<DataFrame, AggregateError> {
    require_columns(table, &AREA_COLUMNS)?;
    let filter = FireFilter::new(department, year);
    let filtered = filter
        .apply(table)
        .select([col(fire::YEAR), col(fire::DEPARTMENT), col(fire::SURFACE_HA)])
        .collect()?;

    let years = filtered.column(fire::YEAR)?.i32()?;
    let departments = filtered.column(fire::DEPARTMENT)?.str()?;
    let areas = filtered.column(fire::SURFACE_HA)?.f64()?;

    let mut groups: BTreeMap<(Option<i32>, Option<String>), Vec<f64>> = BTreeMap::new();
    for ((year, department), area) in years
        .into_iter()
        .zip(departments.into_iter())
        .zip(areas.into_iter())
    {
        let values = groups
            .entry((year, department.map(str::to_string)))
            .or_default();
        if let Some(area) = area {
            values.push(area);
        }
    }

    let n = groups.len();
    let mut out_years: Vec<Option<i32>> = Vec::with_capacity(n);
    let mut out_departments: Vec<Option<String>> = Vec::with_capacity(n);
    let mut means = Vec::with_capacity(n);
    let mut medians = Vec::with_capacity(n);
    let mut q1s = Vec::with_capacity(n);
    let mut q3s = Vec::with_capacity(n);

    for ((year, department), values) in groups {
        let stats = StatsCalculator::compute_descriptive_stats(&values);
        out_years.push(year);
        out_departments.push(department);
        means.push(stats.mean);
        medians.push(stats.median);
        q1s.push(stats.q1);
        q3s.push(stats.q3);
    }

    let df = DataFrame::new(vec![
        Column::new(fire::YEAR.into(), out_years),
        Column::new(fire::DEPARTMENT.into(), out_departments),
        Column::new(aggregate::MEAN.into(), means),
        Column::new(aggregate::MEDIAN.into(), medians),
        Column::new(aggregate::Q1.into(), q1s),
        Column::new(aggregate::Q3.into(), q3s),
    ])?;

    log_result("burnt_area_statistics", &filter, &df);
    Ok(df)
}

/// Total burnt hectares reshaped wide: one row per year, one column per department.
///
/// A department without fires in a given year is null, not zero. Rows with a
/// missing year or department cannot be placed and are left out.
/// Output columns: [year, <department>...] with departments ascending.
pub fn burnt_area_by_year_and_department(table: &FireTable) -> Result<DataFrame, AggregateError> {
    let long = sum_burnt_area(table, None, None)?;
    let years = long.column(fire::YEAR)?.i32()?;
    let departments = long.column(fire::DEPARTMENT)?.str()?;
    let totals = long.column(aggregate::TOTAL_BURNT_AREA)?.f64()?;

    let mut all_years = BTreeSet::new();
    let mut by_department: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
    for ((year, department), total) in years
        .into_iter()
        .zip(departments.into_iter())
        .zip(totals.into_iter())
    {
        let (Some(year), Some(department)) = (year, department) else {
            debug!("Skipping group with a missing year or department");
            continue;
        };
        all_years.insert(year);
        by_department
            .entry(department.to_string())
            .or_default()
            .insert(year, total.unwrap_or(0.0));
    }

    let year_list: Vec<i32> = all_years.into_iter().collect();
    let mut columns = Vec::with_capacity(by_department.len() + 1);
    columns.push(Column::new(fire::YEAR.into(), year_list.clone()));
    for (department, per_year) in &by_department {
        let cells: Vec<Option<f64>> = year_list.iter().map(|y| per_year.get(y).copied()).collect();
        columns.push(Column::new(department.as_str().into(), cells));
    }

    Ok(DataFrame::new(columns)?)
}

/// Total burnt hectares per department for one year, departments ascending.
pub fn burnt_area_by_department(
    table: &FireTable,
    year: i32,
) -> Result<Vec<(String, f64)>, AggregateError> {
    require_columns(table, &AREA_COLUMNS)?;
    let df = FireFilter::new(None, Some(year))
        .apply(table)
        .group_by([col(fire::DEPARTMENT)])
        .agg([col(fire::SURFACE_HA)
            .sum()
            .alias(aggregate::TOTAL_BURNT_AREA)])
        .sort([fire::DEPARTMENT], SortMultipleOptions::default())
        .collect()?;

    let departments = df.column(fire::DEPARTMENT)?.str()?;
    let totals = df.column(aggregate::TOTAL_BURNT_AREA)?.f64()?;
    let slices = departments
        .into_iter()
        .zip(totals.into_iter())
        .filter_map(|(department, total)| Some((department?.to_string(), total.unwrap_or(0.0))))
        .collect();
    Ok(slices)
}
