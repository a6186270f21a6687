//! PPA availability profile loader.
//!
//! Grounded in `original_source/Quellcode/get_data/ppa_profiles.py`:
//! the fetch against the renewables.ninja API is an external collaborator
//! outside the optimizer's contract (see `loaders` module docs), but the
//! weather-year remap (`safe_replace_year`, applied row by row at the end
//! of `get_ppa_data`) and the `/1000` unit conversion
//! (`get_ppa_data`'s `result.loc[..., pv/wind columns] /= 1000.0`) are
//! part of the data-shaping contract the core depends on, so they are
//! reproduced here against a local CSV with `datetime, G_PPA_avail`
//! columns holding raw kWh generation.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::DispatchError;

const KWH_PER_MWH: f64 = 1000.0;

/// Reads a two-column `datetime, G_PPA_avail` CSV of raw kWh generation,
/// still stamped with its original weather-year dates, and converts to
/// MWh by dividing by 1000 (spec §6.1).
pub fn load_ppa_profile_from_csv(path: &Path) -> Result<Vec<(NaiveDateTime, f64)>, DispatchError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        DispatchError::input(format!("failed to read PPA profile {}: {e}", path.display()))
    })?;

    let mut lines = contents.lines();
    let header = lines
        .next()
        .ok_or_else(|| DispatchError::input("PPA profile CSV has no header row"))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let dt_col = columns
        .iter()
        .position(|c| *c == "datetime")
        .ok_or_else(|| DispatchError::input("PPA profile CSV missing 'datetime' column"))?;
    let value_col = columns
        .iter()
        .position(|c| *c == "G_PPA_avail")
        .ok_or_else(|| DispatchError::input("PPA profile CSV missing 'G_PPA_avail' column"))?;

    let mut series = Vec::new();
    for (row_index, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let raw_dt = fields.get(dt_col).ok_or_else(|| {
            DispatchError::input_at("missing datetime field", row_index)
        })?;
        let dt = parse_datetime(raw_dt).ok_or_else(|| {
            DispatchError::input_at(format!("unparseable datetime '{raw_dt}'"), row_index)
        })?;
        let raw_kwh: f64 = fields
            .get(value_col)
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                DispatchError::input_at("unparseable G_PPA_avail field", row_index)
            })?;
        series.push((dt, raw_kwh / KWH_PER_MWH));
    }

    Ok(series)
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

/// Re-stamps a raw weather-year profile onto `opt_year`, mapping 29-Feb to
/// 28-Feb when `opt_year` is not a leap year (matching the row-wise
/// `df_weather["datetime"].apply(safe_replace_year)` step). Consults
/// [`crate::weather_mapping::introduces_leap_day_collision`] to decide
/// whether the remap can introduce a duplicate instant at all; only when
/// it can does this collapse the duplicate by keeping the first
/// occurrence — the 29-Feb hour that lands on the same restamped instant
/// as the source year's own 28-Feb hour is dropped, per spec §6.1.
pub fn remap_weather_year(
    raw: &[(NaiveDateTime, f64)],
    weather_year: i32,
    opt_year: i32,
) -> Vec<(chrono::DateTime<Utc>, f64)> {
    let filtered = raw.iter().filter(|(dt, _)| dt.year() == weather_year);

    if !crate::weather_mapping::introduces_leap_day_collision(opt_year, weather_year) {
        return filtered
            .map(|(dt, value)| (safe_replace_year(*dt, opt_year), *value))
            .collect();
    }

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for (dt, value) in filtered {
        let restamped = safe_replace_year(*dt, opt_year);
        if seen.insert(restamped) {
            out.push((restamped, *value));
        }
    }
    out
}

fn safe_replace_year(dt: NaiveDateTime, new_year: i32) -> chrono::DateTime<Utc> {
    let replaced = dt
        .date()
        .with_year(new_year)
        .and_then(|d| d.and_hms_opt(dt.hour(), dt.minute(), dt.second()));
    let naive = replaced.unwrap_or_else(|| {
        NaiveDate::from_ymd_opt(new_year, 2, 28)
            .expect("28 Feb always valid")
            .and_hms_opt(dt.hour(), dt.minute(), dt.second())
            .expect("valid time")
    });
    Utc.from_utc_datetime(&naive)
}
