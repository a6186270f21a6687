use std::ops::Range;

use chrono::{DateTime, Datelike, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One assembled hour of the optimization horizon.
///
/// Produced by the Input Assembler, consumed by the Dispatch Optimizer,
/// never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourRow {
    pub datetime: DateTime<Utc>,
    pub year: i32,
    pub month: u32,
    /// Day-ahead spot price, currency per MWh. Any sign permitted.
    pub da_price: f64,
    /// Hydrogen sale price, currency per MWh-equivalent. Constant within a month.
    pub h2_price: f64,
    /// PPA-available energy this hour, MWh. Must be non-negative.
    pub g_ppa_avail: f64,
    /// Exogenous admission flag for grid purchase.
    pub v: bool,
}

impl HourRow {
    pub fn new(
        datetime: DateTime<Utc>,
        da_price: f64,
        h2_price: f64,
        g_ppa_avail: f64,
        v: bool,
    ) -> Self {
        Self {
            datetime,
            year: datetime.year(),
            month: datetime.month(),
            da_price,
            h2_price,
            g_ppa_avail,
            v,
        }
    }

    /// Invariant I1: every field is finite and the physically-bounded
    /// fields respect their bounds.
    pub fn is_well_formed(&self) -> bool {
        self.da_price.is_finite()
            && self.h2_price.is_finite()
            && self.g_ppa_avail.is_finite()
            && self.g_ppa_avail >= 0.0
    }
}

/// The hours assembled for one optimization run, sorted ascending by
/// instant, with a precomputed `(year, month) -> [start, end)` index so
/// the monthly PPA constraint never has to rescan the rows.
#[derive(Debug, Clone)]
pub struct HourTable {
    rows: Vec<HourRow>,
    month_spans: IndexMap<(i32, u32), Range<usize>>,
}

impl HourTable {
    /// Builds the table from rows already sorted ascending by instant.
    /// Does not itself check I1-I3; callers validate before constructing
    /// one, since the table is assumed well-formed everywhere else.
    pub fn from_sorted_rows(rows: Vec<HourRow>) -> Self {
        let mut month_spans = IndexMap::new();
        for (index, row) in rows.iter().enumerate() {
            let key = (row.year, row.month);
            match month_spans.get_mut(&key) {
                Some(range) => *range = (*range).start..(index + 1),
                None => {
                    month_spans.insert(key, index..(index + 1));
                }
            }
        }
        Self { rows, month_spans }
    }

    pub fn rows(&self) -> &[HourRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates `((year, month), hour_indices)` in first-seen order.
    pub fn month_spans(&self) -> impl Iterator<Item = (&(i32, u32), &Range<usize>)> {
        self.month_spans.iter()
    }

    pub fn span_for(&self, year: i32, month: u32) -> Option<Range<usize>> {
        self.month_spans.get(&(year, month)).cloned()
    }
}
