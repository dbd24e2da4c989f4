//! Wildfire Insight - command line front end.
//!
//! Prints fire counts and burnt-area tables, then writes the HTML charts.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use wildfire_insight::stats::ALL_DEPARTMENTS;
use wildfire_insight::{
    burnt_area_statistics, count_fires, evolution_graph, pie_chart_burnt_area, sum_burnt_area,
    FireFilter, FireLoader,
};

#[derive(Parser, Debug)]
#[command(
    name = "wildfire-insight",
    version,
    about = "Wildfire Data Analysis Command Line Tool"
)]
struct Args {
    /// Path to the wildfire data CSV file
    #[arg(long, alias = "file_path")]
    file_path: PathBuf,

    /// Year to analyse; also selects the year of the pie chart
    #[arg(long)]
    year: Option<i32>,

    /// Department code to analyse, or 'all' for every department
    #[arg(long, default_value = ALL_DEPARTMENTS)]
    department: String,

    /// Existing folder where the HTML charts are written
    #[arg(long, alias = "output_folder", default_value = "output")]
    output_folder: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let filter = FireFilter::from_cli(&args.department, args.year);

    let table = FireLoader::new()
        .load(&args.file_path)
        .with_context(|| format!("loading {}", args.file_path.display()))?;

    let department = filter.department.as_deref();
    info!(
        "Analysing department {} for {}",
        department.unwrap_or(ALL_DEPARTMENTS),
        filter
            .year
            .map_or_else(|| "all years".to_string(), |y| y.to_string())
    );

    let fire_counts = count_fires(&table, department, filter.year).context("counting fires")?;
    println!("Fire Counts:");
    println!("{}", fire_counts);

    let burnt_area_sum =
        sum_burnt_area(&table, department, filter.year).context("summing burnt area")?;
    println!("Burnt Area Sum:");
    println!("{}", burnt_area_sum);

    let burnt_area_stats = burnt_area_statistics(&table, department, filter.year)
        .context("computing burnt area statistics")?;
    println!("Burnt Area Statistics:");
    println!("{}", burnt_area_stats);

    evolution_graph(&table, &args.output_folder).context("writing evolution graph")?;

    match filter.year {
        Some(year) => {
            pie_chart_burnt_area(&table, year, &args.output_folder)
                .context("writing pie chart")?;
        }
        None => info!("No --year given; skipping the pie chart"),
    }

    Ok(())
}
