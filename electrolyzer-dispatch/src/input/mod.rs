//! Input Assembler: expands the monthly hydrogen price into an hourly
//! series (spec §4.1 step 1), inner-joins the three hourly streams,
//! derives the admission flag, and validates invariants I1-I3 before the
//! optimizer ever sees a row.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use dispatch_model::{AdmissionPolicy, HourRow, HourTable};

use crate::error::DispatchError;
use crate::loaders::h2_price;

/// Joins `da_series`, the hourly expansion of `h2_monthly`, and
/// `ppa_series` on instant, derives `v(h)` via `admission`, and returns
/// the assembled, validated table. `horizon`, when given, drops any
/// instant outside `[start, end]` before the join so callers can bound a
/// run without pre-filtering every series themselves.
pub fn assemble(
    da_series: &[(DateTime<Utc>, f64)],
    h2_monthly: &HashMap<(i32, u32), f64>,
    ppa_series: &[(DateTime<Utc>, f64)],
    admission: &dyn AdmissionPolicy,
    horizon: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> Result<HourTable, DispatchError> {
    let Some((start_year, end_year)) = year_span(da_series) else {
        return Ok(HourTable::from_sorted_rows(Vec::new()));
    };

    let h2_by_instant: HashMap<DateTime<Utc>, f64> =
        h2_price::expand_hourly(h2_monthly, start_year, end_year)
            .into_iter()
            .collect();
    let ppa_by_instant: HashMap<DateTime<Utc>, f64> = ppa_series.iter().copied().collect();

    let mut rows = Vec::with_capacity(da_series.len());
    for &(instant, da_price) in da_series {
        if let Some((start, end)) = horizon {
            if instant < start || instant > end {
                continue;
            }
        }

        let Some(&g_ppa_avail) = ppa_by_instant.get(&instant) else {
            continue;
        };

        let Some(&h2_price) = h2_by_instant.get(&instant) else {
            continue;
        };

        let v = admission.admits(da_price);
        rows.push(HourRow::new(instant, da_price, h2_price, g_ppa_avail, v));
    }

    rows.sort_by_key(|row| row.datetime);

    println!("input assembler: joined {} of {} day-ahead rows", rows.len(), da_series.len());

    validate_well_formed(&rows)?;
    validate_monotone_stride(&rows)?;

    Ok(HourTable::from_sorted_rows(rows))
}

/// Smallest `(min_year, max_year)` span covering `series`, the range
/// `expand_hourly` needs to produce the hydrogen hourly series before the
/// join. `None` for an empty series.
fn year_span(series: &[(DateTime<Utc>, f64)]) -> Option<(i32, i32)> {
    let mut years = series.iter().map(|(dt, _)| dt.year());
    let first = years.next()?;
    let (min, max) = years.fold((first, first), |(min, max), y| (min.min(y), max.max(y)));
    Some((min, max))
}

fn validate_well_formed(rows: &[HourRow]) -> Result<(), DispatchError> {
    for (index, row) in rows.iter().enumerate() {
        if !row.is_well_formed() {
            return Err(DispatchError::input_at(
                "row violates I1: non-finite field or negative PPA availability",
                index,
            ));
        }
    }
    Ok(())
}

fn validate_monotone_stride(rows: &[HourRow]) -> Result<(), DispatchError> {
    for index in 1..rows.len() {
        let prev = &rows[index - 1];
        let curr = &rows[index];
        if curr.datetime <= prev.datetime {
            return Err(DispatchError::input_at(
                "hours are not strictly increasing",
                index,
            ));
        }
        if curr.year == prev.year && curr.datetime - prev.datetime != chrono::Duration::hours(1) {
            return Err(DispatchError::input_at(
                "gap in hourly stride within a contiguous year",
                index,
            ));
        }
    }
    Ok(())
}
