use serde::{Deserialize, Serialize};

use crate::hour::HourRow;

/// Mirrors an [`HourRow`] and adds the primal values of the decision
/// vector for that hour. Written once by the optimizer, never mutated
/// thereafter (the Result Projector returns a new, cleaned-up table
/// rather than mutating in place).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub hour: HourRow,
    /// Electrical energy drawn by the electrolyzer, MWh.
    pub e_ely: f64,
    /// PPA energy directed to the electrolyzer, MWh.
    pub g_ppa_used: f64,
    /// Grid purchase energy, MWh.
    pub b_grid: f64,
    /// PPA surplus sold to spot, MWh.
    pub s_sell: f64,
    /// Hydrogen produced, as energy equivalent, MWh.
    pub h_prod: f64,
    /// Commitment (on/off) indicator.
    pub u: bool,
}

/// Outcome of a solver call: either a certified-optimal solution or a
/// feasible-but-unproven-optimal incumbent that the caller must decide
/// whether to accept. `NonOptimalWarning` from the error design is
/// represented here, not as an error variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolveStatus {
    Optimal,
    Feasible { warning: String },
}

impl SolveStatus {
    pub fn is_optimal(&self) -> bool {
        matches!(self, SolveStatus::Optimal)
    }
}

/// Ordered result rows plus the scalar objective value, as returned by
/// the Dispatch Optimizer and cleaned up by the Result Projector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    pub rows: Vec<ResultRow>,
    pub objective_value: f64,
    pub status: SolveStatus,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
