use crate::common::oracle_error::OracleError;

#[derive(Debug, Clone, PartialEq)]
pub struct StencilConfig {
    /// Factor applied to the smooth score before adding it to the spike score
    pub smooth_weight: f64,
    /// Inclusive
    pub min_slide: i64,
    /// Exclusive
    pub max_slide: i64,
    /// Slides at or above this score the spike stencil only
    pub smooth_cutoff_slide: i64,
}

impl StencilConfig {
    pub fn new(
        smooth_weight: Option<f64>,
        min_slide: Option<i64>,
        max_slide: Option<i64>,
        smooth_cutoff_slide: Option<i64>,
    ) -> Result<Self, OracleError> {
        let default = Self::default();
        let conf = Self {
            smooth_weight: smooth_weight.unwrap_or(default.smooth_weight),
            min_slide: min_slide.unwrap_or(default.min_slide),
            max_slide: max_slide.unwrap_or(default.max_slide),
            smooth_cutoff_slide: smooth_cutoff_slide.unwrap_or(default.smooth_cutoff_slide),
        };
        if conf.min_slide >= conf.max_slide {
            return Err(OracleError::para(format!(
                "slide range [{}, {}) is empty",
                conf.min_slide, conf.max_slide
            )));
        }
        if !(conf.smooth_weight >= 0.0 && conf.smooth_weight.is_finite()) {
            return Err(OracleError::para(format!(
                "smooth_weight={} must be a non-negative number",
                conf.smooth_weight
            )));
        }
        Ok(conf)
    }

    pub fn slide_count(&self) -> usize {
        (self.max_slide - self.min_slide) as usize
    }
}

impl Default for StencilConfig {
    fn default() -> Self {
        Self {
            smooth_weight: 0.65,
            min_slide: -141, // $500k
            max_slide: 201,  // $5k
            smooth_cutoff_slide: 150,
        }
    }
}
