use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dispatch_model::{DayAheadThreshold, DispatchParams};

use electrolyzer_dispatch::loaders::{da_price, h2_price, ppa};
use electrolyzer_dispatch::{assemble_and_run, weather_mapping};

/// Runs one dispatch optimization for a single optimization year against
/// workbook/CSV inputs on disk, in the spirit of the teacher's
/// `run_simple_opt_loop`: load the raw series, wire them through the
/// pipeline, print a summary.
fn run_dispatch_for_year(
    opt_year: i32,
    da_workbook: &PathBuf,
    h2_workbook: &PathBuf,
    ppa_csv: &PathBuf,
    params: &DispatchParams,
) -> Result<()> {
    let weather_year = weather_mapping::weather_year_for(opt_year)
        .with_context(|| format!("no weather-year mapping for optimization year {opt_year}"))?;

    let da_series = da_price::load_da_price_series(da_workbook, opt_year, weather_year)
        .with_context(|| format!("loading day-ahead prices for {opt_year}"))?;

    let h2_table = h2_price::load_h2_price_table(h2_workbook, opt_year, opt_year)
        .with_context(|| format!("loading hydrogen prices for {opt_year}"))?;
    let h2_monthly: HashMap<(i32, u32), f64> = h2_table.into_iter().collect();

    let raw_ppa = ppa::load_ppa_profile_from_csv(ppa_csv)
        .with_context(|| format!("loading PPA profile from {}", ppa_csv.display()))?;
    let ppa_series = ppa::remap_weather_year(&raw_ppa, weather_year, opt_year);

    let admission = DayAheadThreshold::default();

    let (result, objective) = assemble_and_run(&da_series, &h2_monthly, &ppa_series, &admission, params)
        .with_context(|| format!("dispatch optimization failed for {opt_year}"))?;

    println!("=== DISPATCH OPTIMIZATION RESULTS ({opt_year}, weather year {weather_year}) ===");
    println!("Hours dispatched: {}", result.len());
    println!("Objective value: {objective:.2}");

    let on_hours = result.rows.iter().filter(|r| r.u).count();
    let total_h2: f64 = result.rows.iter().map(|r| r.h_prod).sum();
    let total_grid: f64 = result.rows.iter().map(|r| r.b_grid).sum();
    let total_ppa_used: f64 = result.rows.iter().map(|r| r.g_ppa_used).sum();
    let total_surplus_sold: f64 = result.rows.iter().map(|r| r.s_sell).sum();

    println!("On hours: {on_hours} / {}", result.len());
    println!("Hydrogen produced (MWh eq.): {total_h2:.2}");
    println!("PPA energy used: {total_ppa_used:.2} MWh");
    println!("Grid energy purchased: {total_grid:.2} MWh");
    println!("PPA surplus sold: {total_surplus_sold:.2} MWh");
    println!("===================================");

    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let opt_year: i32 = args
        .get(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(2030);

    let da_workbook = args
        .get(2)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/da_prices.xlsx"));
    let h2_workbook = args
        .get(3)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/h2_prices.xlsx"));
    let ppa_csv = args
        .get(4)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/ppa_profile.csv"));

    let params = DispatchParams {
        p_max: 10.0,
        p_min: 2.0,
        delta_t: 1.0,
        eta_ely: 0.7,
        p_ppa: 30.0,
        policy_year: DispatchParams::DEFAULT_POLICY_YEAR,
        epsilon: DispatchParams::DEFAULT_EPSILON,
    };

    println!("Running electrolyzer dispatch optimization for {opt_year}...");
    if let Err(e) = run_dispatch_for_year(opt_year, &da_workbook, &h2_workbook, &ppa_csv, &params) {
        eprintln!("Error running dispatch optimization: {e:#}");
        std::process::exit(1);
    }

    println!("Dispatch optimization complete!");
}
