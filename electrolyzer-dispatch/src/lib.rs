//! MILP dispatch optimizer for an electrolyzer fed by a PPA, conditional
//! grid purchases at day-ahead spot price, and PPA surplus resale.
//!
//! Module order mirrors the dependency chain in spec §2: loaders feed the
//! [`input`] assembler, which feeds [`optimizer::optimize`], whose raw
//! output is cleaned up by [`result::project`].

pub mod error;
pub mod input;
pub mod loaders;
pub mod optimizer;
pub mod result;
pub mod weather_mapping;

pub use error::DispatchError;

use dispatch_model::{AdmissionPolicy, DispatchParams, HourTable, ResultTable};

/// Runs the full core pipeline — Input Assembler, Dispatch Optimizer,
/// Result Projector — over already-loaded series, returning the
/// projected result table and objective value.
pub fn run_dispatch(
    table: &HourTable,
    params: &DispatchParams,
) -> Result<(ResultTable, f64), DispatchError> {
    let (raw, objective) = optimizer::optimize(table, params)?;
    Ok((result::project(raw), objective))
}

/// Assembles the three hourly streams and then runs the full pipeline.
/// Convenience wrapper used by the CLI binary.
pub fn assemble_and_run(
    da_series: &[(chrono::DateTime<chrono::Utc>, f64)],
    h2_monthly: &std::collections::HashMap<(i32, u32), f64>,
    ppa_series: &[(chrono::DateTime<chrono::Utc>, f64)],
    admission: &dyn AdmissionPolicy,
    params: &DispatchParams,
) -> Result<(ResultTable, f64), DispatchError> {
    let table = input::assemble(da_series, h2_monthly, ppa_series, admission, None)?;
    run_dispatch(&table, params)
}
