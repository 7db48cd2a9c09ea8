use crate::common::oracle_error::OracleError;

/// Transaction and output filter thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct TxFilterConfig {
    pub max_inputs: usize,
    /// Exactly this many outputs (payment plus change)
    pub required_outputs: usize,
    /// Cap on each witness item and on the per-input witness total
    pub max_witness_bytes: usize,
    /// Exclusive lower bound, native units
    pub min_output_amount: f64,
    /// Exclusive upper bound, native units
    pub max_output_amount: f64,
}

impl TxFilterConfig {
    pub fn new(
        max_inputs: Option<usize>,
        required_outputs: Option<usize>,
        max_witness_bytes: Option<usize>,
        min_output_amount: Option<f64>,
        max_output_amount: Option<f64>,
    ) -> Result<Self, OracleError> {
        let default = Self::default();
        let conf = Self {
            max_inputs: max_inputs.unwrap_or(default.max_inputs),
            required_outputs: required_outputs.unwrap_or(default.required_outputs),
            max_witness_bytes: max_witness_bytes.unwrap_or(default.max_witness_bytes),
            min_output_amount: min_output_amount.unwrap_or(default.min_output_amount),
            max_output_amount: max_output_amount.unwrap_or(default.max_output_amount),
        };
        if conf.max_inputs == 0 || conf.required_outputs == 0 {
            return Err(OracleError::para(
                "max_inputs and required_outputs must be positive",
            ));
        }
        if !(conf.min_output_amount > 0.0 && conf.min_output_amount < conf.max_output_amount) {
            return Err(OracleError::para(format!(
                "output amount range ({}, {}) is empty",
                conf.min_output_amount, conf.max_output_amount
            )));
        }
        Ok(conf)
    }

    pub fn amount_in_range(&self, amount: f64) -> bool {
        amount > self.min_output_amount && amount < self.max_output_amount
    }
}

impl Default for TxFilterConfig {
    fn default() -> Self {
        Self {
            max_inputs: 5,
            required_outputs: 2,
            max_witness_bytes: 500,
            min_output_amount: 1e-5,
            max_output_amount: 1e5,
        }
    }
}
