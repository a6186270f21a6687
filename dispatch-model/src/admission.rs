use std::fmt::Debug;

/// Pluggable policy deciding the exogenous grid-purchase admission flag
/// `v(h)` for a given hour. The system default is [`DayAheadThreshold`]
/// (`v(h) = 1 iff DA(h) < 20`), but the Input Assembler only depends on
/// this trait so the policy can be replaced — e.g. by a CO2-price
/// criterion — without touching the optimizer.
pub trait AdmissionPolicy: Debug {
    fn admits(&self, da_price: f64) -> bool;
}

/// The system-defined admission rule: grid purchase is admitted whenever
/// the day-ahead price is below `threshold`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayAheadThreshold {
    pub threshold: f64,
}

impl DayAheadThreshold {
    pub const DEFAULT_THRESHOLD: f64 = 20.0;
}

impl Default for DayAheadThreshold {
    fn default() -> Self {
        Self {
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

impl AdmissionPolicy for DayAheadThreshold {
    fn admits(&self, da_price: f64) -> bool {
        da_price < self.threshold
    }
}
