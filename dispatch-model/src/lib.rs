pub mod admission;
pub mod decision;
pub mod hour;
pub mod params;

pub use admission::{AdmissionPolicy, DayAheadThreshold};
pub use decision::{ResultRow, ResultTable, SolveStatus};
pub use hour::{HourRow, HourTable};
pub use params::DispatchParams;
