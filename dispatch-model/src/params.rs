use serde::{Deserialize, Serialize};

/// Process-wide parameter set (`Θ`), immutable for the duration of one
/// optimization run. Every field is required; there are no implicit
/// defaults for the physical plant parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Electrolyzer maximum electrical power, MW.
    pub p_max: f64,
    /// Electrolyzer minimum electrical power while committed, MW.
    pub p_min: f64,
    /// Hour length, hours (typically 1.0).
    pub delta_t: f64,
    /// Electrical-to-hydrogen conversion efficiency, 0 < eta <= 1.
    pub eta_ely: f64,
    /// Fixed PPA price paid per MWh of available generation, pay-as-produced.
    pub p_ppa: f64,
    /// First calendar year in which hourly PPA accounting is enforced.
    pub policy_year: i32,
    /// Tie-break epsilon, currency per MWh. Fixed at 1e-3 by the default.
    pub epsilon: f64,
}

impl DispatchParams {
    pub const DEFAULT_EPSILON: f64 = 1e-3;
    pub const DEFAULT_POLICY_YEAR: i32 = 2030;

    /// Checks invariant I3: `P_min * delta_t <= P_max * delta_t` and
    /// `eta_ely` in `(0, 1]`. Does not check sign of `p_ppa` (any
    /// non-negative price is valid) beyond the obvious non-negativity.
    pub fn validate(&self) -> Result<(), String> {
        if self.delta_t <= 0.0 {
            return Err(format!("delta_t must be positive, got {}", self.delta_t));
        }
        if self.p_min < 0.0 {
            return Err(format!("p_min must be non-negative, got {}", self.p_min));
        }
        if self.p_min > self.p_max {
            return Err(format!(
                "p_min ({}) must not exceed p_max ({})",
                self.p_min, self.p_max
            ));
        }
        if !(self.eta_ely > 0.0 && self.eta_ely <= 1.0) {
            return Err(format!(
                "eta_ely must be in (0, 1], got {}",
                self.eta_ely
            ));
        }
        if self.p_ppa < 0.0 {
            return Err(format!("p_ppa must be non-negative, got {}", self.p_ppa));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DispatchParams {
        DispatchParams {
            p_max: 1.0,
            p_min: 0.2,
            delta_t: 1.0,
            eta_ely: 0.7,
            p_ppa: 30.0,
            policy_year: DispatchParams::DEFAULT_POLICY_YEAR,
            epsilon: DispatchParams::DEFAULT_EPSILON,
        }
    }

    #[test]
    fn validates_sane_params() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_min_above_max() {
        let mut p = sample();
        p.p_min = 2.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_eta_out_of_range() {
        let mut p = sample();
        p.eta_ely = 0.0;
        assert!(p.validate().is_err());

        p.eta_ely = 1.5;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_negative_delta_t() {
        let mut p = sample();
        p.delta_t = 0.0;
        assert!(p.validate().is_err());
    }
}
