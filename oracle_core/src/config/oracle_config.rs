use std::collections::HashMap;
use std::fs;
use std::path::Path;

use super::config_check::ConfigWithCheck;
use crate::common::{
    enums::Stage,
    oracle_error::{ErrCode, OracleError},
};
use crate::decoder::filter_config::TxFilterConfig;
use crate::histogram::histogram_config::HistogramConfig;
use crate::mapper::mapper_config::MapperConfig;
use crate::solver::solver_config::SolverConfig;
use crate::stencil::stencil_config::StencilConfig;

/// Oracle pipeline configuration
#[derive(Debug, Clone)]
pub struct OracleConfig {
    pub filter_conf: TxFilterConfig,
    pub histogram_conf: HistogramConfig,
    pub stencil_conf: StencilConfig,
    pub mapper_conf: MapperConfig,
    pub solver_conf: SolverConfig,
    /// Decode blocks on the rayon pool before the ordered same-day fold
    pub parallel_decode: bool,
}

impl OracleConfig {
    pub fn new(conf: Option<HashMap<String, serde_json::Value>>) -> Result<Self, OracleError> {
        let mut conf = ConfigWithCheck::new(conf.unwrap_or_default());

        let filter_conf = TxFilterConfig::new(
            conf.get("max_inputs"),
            conf.get("required_outputs"),
            conf.get("max_witness_bytes"),
            conf.get("min_output_amount"),
            conf.get("max_output_amount"),
        )?;

        let histogram_conf = HistogramConfig::new(conf.get("clip_ceiling"))?;

        let stencil_conf = StencilConfig::new(
            conf.get("smooth_weight"),
            conf.get("min_slide"),
            conf.get("max_slide"),
            conf.get("smooth_cutoff_slide"),
        )?;

        let mapper_conf = MapperConfig::new(
            conf.get("usd_denominations"),
            conf.get("wide_tolerance"),
            conf.get("round_amount_tolerance"),
        )?;

        let solver_conf = SolverConfig::new(
            conf.get("tight_window"),
            conf.get("deviation_window"),
            conf.get("max_iterations"),
        )?;

        let config = Self {
            filter_conf,
            histogram_conf,
            stencil_conf,
            mapper_conf,
            solver_conf,
            parallel_decode: conf.get("parallel_decode").unwrap_or(true),
        };

        conf.check()?;
        Ok(config)
    }

    /// Load a flat JSON object of config keys
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OracleError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            OracleError::new(
                Stage::Config,
                ErrCode::ConfigError,
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        let conf: HashMap<String, serde_json::Value> =
            serde_json::from_str(&text).map_err(|e| {
                OracleError::new(
                    Stage::Config,
                    ErrCode::ConfigError,
                    format!("{} is not a JSON object: {}", path.display(), e),
                )
            })?;
        Self::new(Some(conf))
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            filter_conf: TxFilterConfig::default(),
            histogram_conf: HistogramConfig::default(),
            stencil_conf: StencilConfig::default(),
            mapper_conf: MapperConfig::default(),
            solver_conf: SolverConfig::default(),
            parallel_decode: true,
        }
    }
}
