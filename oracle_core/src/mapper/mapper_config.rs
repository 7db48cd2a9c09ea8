use crate::common::oracle_error::OracleError;

pub const DEFAULT_USD_DENOMINATIONS: [f64; 14] = [
    5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0, 1000.0,
];

#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    pub usd_denominations: Vec<f64>,
    /// Fractional half-width of the window around each expected amount
    pub wide_tolerance: f64,
    /// Fractional half-width around each round native-unit amount
    pub round_amount_tolerance: f64,
}

impl MapperConfig {
    pub fn new(
        usd_denominations: Option<Vec<f64>>,
        wide_tolerance: Option<f64>,
        round_amount_tolerance: Option<f64>,
    ) -> Result<Self, OracleError> {
        let default = Self::default();
        let conf = Self {
            usd_denominations: usd_denominations.unwrap_or(default.usd_denominations),
            wide_tolerance: wide_tolerance.unwrap_or(default.wide_tolerance),
            round_amount_tolerance: round_amount_tolerance
                .unwrap_or(default.round_amount_tolerance),
        };
        if conf.usd_denominations.is_empty()
            || conf.usd_denominations.iter().any(|usd| !(*usd > 0.0 && usd.is_finite()))
        {
            return Err(OracleError::para(
                "usd_denominations must be a non-empty list of positive amounts",
            ));
        }
        if !(conf.wide_tolerance > 0.0 && conf.wide_tolerance < 1.0) {
            return Err(OracleError::para(format!(
                "wide_tolerance={} must be in (0, 1)",
                conf.wide_tolerance
            )));
        }
        if !(conf.round_amount_tolerance >= 0.0 && conf.round_amount_tolerance < 0.01) {
            return Err(OracleError::para(format!(
                "round_amount_tolerance={} must be in [0, 0.01)",
                conf.round_amount_tolerance
            )));
        }
        Ok(conf)
    }
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            usd_denominations: DEFAULT_USD_DENOMINATIONS.to_vec(),
            wide_tolerance: 0.25,
            round_amount_tolerance: 0.0001,
        }
    }
}
