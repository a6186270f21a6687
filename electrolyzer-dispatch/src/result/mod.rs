//! Result Projector: cleans up the raw primal before it leaves the
//! workspace. Per spec §4.3, this never changes a decision beyond
//! clipping LP-style micro-negatives and rounding display noise — it is
//! not allowed to alter the economics the optimizer already settled.

use dispatch_model::{ResultRow, ResultTable};

const ROUNDING_DECIMALS: u32 = 10;

/// Rounds every decision column to 10 decimal places and clips `S(h)` at
/// zero. `objective_value` and `status` pass through untouched.
pub fn project(table: ResultTable) -> ResultTable {
    let rows = table.rows.into_iter().map(project_row).collect();
    ResultTable {
        rows,
        objective_value: round(table.objective_value),
        status: table.status,
    }
}

fn project_row(row: ResultRow) -> ResultRow {
    ResultRow {
        hour: row.hour,
        e_ely: round(row.e_ely),
        g_ppa_used: round(row.g_ppa_used),
        b_grid: round(row.b_grid),
        s_sell: round(row.s_sell.max(0.0)),
        h_prod: round(row.h_prod),
        u: row.u,
    }
}

fn round(value: f64) -> f64 {
    let scale = 10f64.powi(ROUNDING_DECIMALS as i32);
    (value * scale).round() / scale
}
