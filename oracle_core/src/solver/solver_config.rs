use crate::common::oracle_error::OracleError;

#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Fractional half-width of the window re-centred on each candidate
    pub tight_window: f64,
    /// Fractional half-width used for the deviation measurement
    pub deviation_window: f64,
    pub max_iterations: usize,
}

impl SolverConfig {
    pub fn new(
        tight_window: Option<f64>,
        deviation_window: Option<f64>,
        max_iterations: Option<usize>,
    ) -> Result<Self, OracleError> {
        let default = Self::default();
        let conf = Self {
            tight_window: tight_window.unwrap_or(default.tight_window),
            deviation_window: deviation_window.unwrap_or(default.deviation_window),
            max_iterations: max_iterations.unwrap_or(default.max_iterations),
        };
        for (name, value) in [
            ("tight_window", conf.tight_window),
            ("deviation_window", conf.deviation_window),
        ] {
            if !(value > 0.0 && value < 1.0) {
                return Err(OracleError::para(format!(
                    "{}={} must be in (0, 1)",
                    name, value
                )));
            }
        }
        if conf.max_iterations == 0 {
            return Err(OracleError::para("max_iterations must be positive"));
        }
        Ok(conf)
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tight_window: 0.05,
            deviation_window: 0.10,
            max_iterations: 1000,
        }
    }
}
