//! Hydrogen monthly price loader and hourly expansion.
//!
//! Grounded in `original_source/Quellcode/get_data/h2_prices.py`:
//! `read_h2_prices` reads a monthly `(year, month, h2_price)` table from
//! the `"€_per_MWh"` sheet, `expand_h2_prices_hourly` expands it so every
//! hour within a month carries that month's price.

use std::collections::HashMap;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::DispatchError;

/// `(year, month) -> h2_price`, filtered to `[start_year, end_year]`.
pub fn load_h2_price_table(
    workbook_path: &Path,
    start_year: i32,
    end_year: i32,
) -> Result<HashMap<(i32, u32), f64>, DispatchError> {
    let mut workbook: Xlsx<_> = open_workbook(workbook_path).map_err(|e| {
        DispatchError::input(format!(
            "failed to open hydrogen price workbook {}: {e}",
            workbook_path.display()
        ))
    })?;

    let range = workbook.worksheet_range("€_per_MWh").map_err(|e| {
        DispatchError::input(format!("missing sheet '€_per_MWh' in workbook: {e}"))
    })?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DispatchError::input("hydrogen price sheet has no header row"))?;

    let year_col = find_column(header, "year")?;
    let month_col = find_column(header, "month")?;
    let price_col = find_column(header, "h2_price")?;

    let mut table = HashMap::new();
    for (row_index, row) in rows.enumerate() {
        let year = parse_i32_cell(row.get(year_col)).ok_or_else(|| {
            DispatchError::input_at("unparseable 'year' cell", row_index)
        })?;
        if year < start_year || year > end_year {
            continue;
        }
        let month = parse_i32_cell(row.get(month_col)).ok_or_else(|| {
            DispatchError::input_at("unparseable 'month' cell", row_index)
        })? as u32;
        if !(1..=12).contains(&month) {
            return Err(DispatchError::input_at(
                format!("month {month} out of range 1-12"),
                row_index,
            ));
        }
        let price = parse_f64_cell(row.get(price_col)).ok_or_else(|| {
            DispatchError::input_at("unparseable 'h2_price' cell", row_index)
        })?;

        if table.insert((year, month), price).is_some() {
            return Err(DispatchError::input_at(
                format!("duplicate (year, month) key ({year}, {month})"),
                row_index,
            ));
        }
    }

    Ok(table)
}

/// Expands a monthly price table into one row per hour within
/// `[start_year, end_year]`, every hour of a month carrying that month's
/// price, matching `expand_h2_prices_hourly`.
pub fn expand_hourly(
    table: &HashMap<(i32, u32), f64>,
    start_year: i32,
    end_year: i32,
) -> Vec<(DateTime<Utc>, f64)> {
    let mut series = Vec::new();
    for year in start_year..=end_year {
        for month in 1..=12u32 {
            let Some(&price) = table.get(&(year, month)) else {
                continue;
            };
            let start = NaiveDate::from_ymd_opt(year, month, 1).expect("valid month start");
            let next_month_start = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            }
            .expect("valid next month start");

            let mut cursor = Utc.from_utc_datetime(&start.and_hms_opt(0, 0, 0).unwrap());
            let end = Utc.from_utc_datetime(&next_month_start.and_hms_opt(0, 0, 0).unwrap());
            while cursor < end {
                series.push((cursor, price));
                cursor += Duration::hours(1);
            }
        }
    }
    series
}

fn find_column(header: &[Data], name: &str) -> Result<usize, DispatchError> {
    header
        .iter()
        .position(|cell| cell.to_string() == name)
        .ok_or_else(|| DispatchError::input(format!("missing required column '{name}'")))
}

fn parse_f64_cell(cell: Option<&Data>) -> Option<f64> {
    match cell? {
        Data::Float(v) => Some(*v),
        Data::Int(v) => Some(*v as f64),
        Data::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_i32_cell(cell: Option<&Data>) -> Option<i32> {
    match cell? {
        Data::Int(v) => Some(*v as i32),
        Data::Float(v) => Some(*v as i32),
        Data::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}
