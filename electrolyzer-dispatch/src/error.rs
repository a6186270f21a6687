use thiserror::Error;

/// The four non-recoverable error kinds from the error handling design.
/// `NonOptimalWarning` is deliberately absent here — it is represented by
/// [`dispatch_model::SolveStatus::Feasible`] alongside a valid result
/// table, not by a variant that aborts the caller.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Invariants I1-I3 violated, a required column is missing, or hours
    /// are misaligned. Raised before solver setup.
    #[error("input error at row {row_index:?}: {message}")]
    InputError {
        message: String,
        row_index: Option<usize>,
    },

    /// The MILP backend could not be instantiated. Raised before any
    /// variable is created.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),

    /// The solver returned INFEASIBLE, UNBOUNDED, or an internal error.
    #[error("solver error (status: {status}): {detail}")]
    SolverError { status: String, detail: String },

    /// The primal solution violates I4-I6 by more than 1e-6 after readout.
    #[error("solution integrity error: {0}")]
    SolutionIntegrityError(String),
}

impl DispatchError {
    pub fn input(message: impl Into<String>) -> Self {
        DispatchError::InputError {
            message: message.into(),
            row_index: None,
        }
    }

    pub fn input_at(message: impl Into<String>, row_index: usize) -> Self {
        DispatchError::InputError {
            message: message.into(),
            row_index: Some(row_index),
        }
    }
}
