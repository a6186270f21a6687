//! Day-ahead price loader.
//!
//! Grounded in `original_source/Quellcode/load_data_old.py::get_da_prices`:
//! reads one workbook sheet per weather year (`WY_<weather_year>`), rounds
//! the `UTC` timestamp column to the nearest hour, keeps only the rows
//! whose original year matches the weather year, then re-stamps the year
//! onto the optimization year.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc};

use crate::error::DispatchError;

/// Loads the day-ahead price series for `opt_year`, sourced from the
/// sheet named `WY_<weather_year>` in `workbook_path`, with timestamps
/// re-stamped onto `opt_year`. Returns rows sorted ascending by instant.
pub fn load_da_price_series(
    workbook_path: &Path,
    opt_year: i32,
    weather_year: i32,
) -> Result<Vec<(DateTime<Utc>, f64)>, DispatchError> {
    let sheet_name = format!("WY_{weather_year}");

    let mut workbook: Xlsx<_> = open_workbook(workbook_path).map_err(|e| {
        DispatchError::input(format!(
            "failed to open day-ahead price workbook {}: {e}",
            workbook_path.display()
        ))
    })?;

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        DispatchError::input(format!("missing sheet '{sheet_name}' in workbook: {e}"))
    })?;

    let mut rows = range.rows();
    let header = rows.next().ok_or_else(|| {
        DispatchError::input(format!("sheet '{sheet_name}' has no header row"))
    })?;

    let utc_col = find_column(header, "UTC")?;
    let price_col = find_column(header, "DA_price")?;

    let mut series = Vec::new();
    for (row_index, row) in rows.enumerate() {
        let raw_dt = parse_datetime_cell(row.get(utc_col)).ok_or_else(|| {
            DispatchError::input_at(
                format!("sheet '{sheet_name}' has an unparseable UTC timestamp"),
                row_index,
            )
        })?;
        let price = parse_f64_cell(row.get(price_col)).ok_or_else(|| {
            DispatchError::input_at(
                format!("sheet '{sheet_name}' has an unparseable DA_price"),
                row_index,
            )
        })?;

        let rounded = round_to_hour(raw_dt);
        if rounded.year() != weather_year {
            continue;
        }

        let restamped = safe_replace_year(rounded, opt_year);
        series.push((restamped, price));
    }

    series.sort_by_key(|(dt, _)| *dt);
    Ok(series)
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

fn parse_datetime_cell(cell: Option<&Data>) -> Option<NaiveDateTime> {
    match cell? {
        Data::DateTime(excel_dt) => excel_dt.as_datetime(),
        Data::String(s) => NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%d %H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s.trim(), "%Y-%m-%dT%H:%M:%S"))
            .ok(),
        _ => None,
    }
}

/// Rounds a naive timestamp to the nearest hour, then attaches UTC.
fn round_to_hour(dt: NaiveDateTime) -> DateTime<Utc> {
    let bumped = if dt.minute() >= 30 {
        dt + chrono::Duration::hours(1)
    } else {
        dt
    };
    let rounded = bumped
        .date()
        .and_hms_opt(bumped.hour(), 0, 0)
        .expect("valid hour-truncated time");
    Utc.from_utc_datetime(&rounded)
}

/// Replaces the year of `dt` with `new_year`, mapping 29-Feb onto 28-Feb
/// when the target year is not a leap year (mirrors
/// `ppa_profiles.py::safe_replace_year`).
fn safe_replace_year(dt: DateTime<Utc>, new_year: i32) -> DateTime<Utc> {
    let naive = dt.naive_utc();
    match naive
        .date()
        .with_year(new_year)
        .and_then(|d| d.and_hms_opt(naive.hour(), naive.minute(), naive.second()))
    {
        Some(replaced) => Utc.from_utc_datetime(&replaced),
        None => {
            // 29 Feb with no counterpart in new_year.
            let fallback = chrono::NaiveDate::from_ymd_opt(new_year, 2, 28)
                .expect("28 Feb always valid")
                .and_hms_opt(naive.hour(), naive.minute(), naive.second())
                .expect("valid time");
            Utc.from_utc_datetime(&fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn safe_replace_year_maps_leap_day_to_28th() {
        let leap_day = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2008, 2, 29)
                .unwrap()
                .and_hms_opt(13, 0, 0)
                .unwrap(),
        );
        let restamped = safe_replace_year(leap_day, 2029);
        assert_eq!(restamped.month(), 2);
        assert_eq!(restamped.day(), 28);
        assert_eq!(restamped.year(), 2029);
    }

    #[test]
    fn safe_replace_year_keeps_ordinary_dates() {
        let dt = Utc.from_utc_datetime(
            &NaiveDate::from_ymd_opt(2011, 6, 15)
                .unwrap()
                .and_hms_opt(4, 0, 0)
                .unwrap(),
        );
        let restamped = safe_replace_year(dt, 2030);
        assert_eq!(restamped.year(), 2030);
        assert_eq!(restamped.month(), 6);
        assert_eq!(restamped.day(), 15);
    }

    #[test]
    fn round_to_hour_rounds_half_up() {
        let dt = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(3, 30, 0)
            .unwrap();
        let rounded = round_to_hour(dt);
        assert_eq!(rounded.hour(), 4);
        assert_eq!(rounded.minute(), 0);

        let dt2 = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_opt(3, 29, 0)
            .unwrap();
        let rounded2 = round_to_hour(dt2);
        assert_eq!(rounded2.hour(), 3);
    }
}
