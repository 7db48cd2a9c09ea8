use crate::common::oracle_error::OracleError;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramConfig {
    /// Upper limit for any normalized bin
    pub clip_ceiling: f64,
}

impl HistogramConfig {
    pub fn new(clip_ceiling: Option<f64>) -> Result<Self, OracleError> {
        let clip_ceiling = clip_ceiling.unwrap_or(Self::default().clip_ceiling);
        if !(clip_ceiling > 0.0 && clip_ceiling <= 1.0) {
            return Err(OracleError::para(format!(
                "clip_ceiling={} must be in (0, 1]",
                clip_ceiling
            )));
        }
        Ok(Self { clip_ceiling })
    }
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            clip_ceiling: 0.008,
        }
    }
}
