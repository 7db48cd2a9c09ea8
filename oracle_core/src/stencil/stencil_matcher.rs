//! Slide the calibrated stencils across the histogram to find a rough price.

use serde::Serialize;
use tracing::debug;

use super::stencil_config::StencilConfig;
use crate::calibration::Calibration;
use crate::common::{
    enums::Stage,
    oracle_error::{ErrCode, OracleError},
};
use crate::histogram::bins::NUM_EDGES;
use crate::histogram::output_histogram::OutputHistogram;

/// The two calibrated weight arrays, equal length
#[derive(Debug, Clone, PartialEq)]
pub struct Stencil {
    pub spike: Vec<f64>,
    pub smooth: Vec<f64>,
}

impl Stencil {
    pub fn from_calibration(calibration: &Calibration) -> Self {
        Self {
            spike: calibration.spike_stencil(),
            smooth: calibration.smooth_stencil(),
        }
    }

    pub fn len(&self) -> usize {
        self.spike.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spike.is_empty()
    }
}

fn dot(window: &[f64], weights: &[f64]) -> f64 {
    window.iter().zip(weights).map(|(c, w)| c * w).sum()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoughEstimate {
    pub best_slide: i64,
    pub best_score: f64,
    /// +1 or -1
    pub neighbor_offset: i64,
    pub neighbor_score: f64,
    pub total_score: f64,
    pub slide_count: usize,
    pub best_price: f64,
    pub neighbor_price: f64,
    /// Truncated weighted blend of the best and neighbour prices
    pub rough_price: f64,
}

#[derive(Debug, Clone)]
pub struct StencilMatcher {
    stencil: Stencil,
    conf: StencilConfig,
    center_bin: usize,
    center_usd: f64,
    half: usize,
}

impl StencilMatcher {
    /// Fails if any window, neighbour windows included, would leave the histogram
    pub fn new(calibration: &Calibration, conf: &StencilConfig) -> Result<Self, OracleError> {
        let stencil = Stencil::from_calibration(calibration);
        if stencil.is_empty() || stencil.spike.len() != stencil.smooth.len() {
            return Err(OracleError::para("stencils must be non-empty and of equal length"));
        }
        let half = (stencil.len() + 1) / 2;
        let center = calibration.center_bin as i64;
        let lowest_left = center - half as i64 + conf.min_slide - 1;
        let highest_right = center - half as i64 + conf.max_slide + stencil.len() as i64;
        let lowest_price_bin = center + conf.min_slide - 1;
        if lowest_left < 0 || lowest_price_bin < 1 || highest_right > NUM_EDGES as i64 {
            return Err(OracleError::para(format!(
                "slide range [{}, {}) moves the stencil outside the histogram",
                conf.min_slide, conf.max_slide
            )));
        }
        Ok(Self {
            stencil,
            conf: conf.clone(),
            center_bin: calibration.center_bin,
            center_usd: calibration.center_usd,
            half,
        })
    }

    fn window<'h>(&self, counts: &'h [f64], slide: i64) -> &'h [f64] {
        let left = (self.center_bin as i64 - self.half as i64 + slide) as usize;
        &counts[left..left + self.stencil.len()]
    }

    pub fn spike_score(&self, counts: &[f64], slide: i64) -> f64 {
        dot(self.window(counts, slide), &self.stencil.spike)
    }

    pub fn slide_score(&self, counts: &[f64], slide: i64) -> f64 {
        let window = self.window(counts, slide);
        let spike = dot(window, &self.stencil.spike);
        if slide < self.conf.smooth_cutoff_slide {
            spike + dot(window, &self.stencil.smooth) * self.conf.smooth_weight
        } else {
            spike
        }
    }

    fn price_at(&self, hist: &OutputHistogram, slide: i64) -> f64 {
        let bin = (self.center_bin as i64 + slide) as usize;
        self.center_usd / hist.edges().edge(bin)
    }

    pub fn match_histogram(&self, hist: &OutputHistogram) -> Result<RoughEstimate, OracleError> {
        let counts = hist.counts();

        let mut best_slide = 0i64;
        let mut best_score = 0.0f64;
        let mut total_score = 0.0f64;
        for slide in self.conf.min_slide..self.conf.max_slide {
            let score = self.slide_score(counts, slide);
            if score > best_score {
                best_score = score;
                best_slide = slide;
            }
            total_score += score;
        }

        let up_score = self.spike_score(counts, best_slide + 1);
        let down_score = self.spike_score(counts, best_slide - 1);
        let (neighbor_offset, neighbor_score) = if down_score > up_score {
            (-1, down_score)
        } else {
            (1, up_score)
        };

        let best_price = self.price_at(hist, best_slide);
        let neighbor_price = self.price_at(hist, best_slide + neighbor_offset);

        let slide_count = self.conf.slide_count();
        let avg_score = total_score / slide_count as f64;
        let w1 = best_score - avg_score;
        let w2 = (neighbor_score - avg_score).abs();
        if w1 + w2 == 0.0 {
            return Err(OracleError::new(
                Stage::Stencil,
                ErrCode::DegenerateWeighting,
                format!(
                    "best and neighbour scores both equal the average {} at slide {}",
                    avg_score, best_slide
                ),
            ));
        }
        let rough_price =
            ((w1 / (w1 + w2)) * best_price + (w2 / (w1 + w2)) * neighbor_price).trunc();
        if !(rough_price > 0.0 && rough_price.is_finite()) {
            return Err(OracleError::insufficient(
                Stage::Stencil,
                format!("rough price {} is not positive", rough_price),
            ));
        }

        debug!(
            "best slide {} (score {:.6}), neighbour {:+} (score {:.6}), rough price {}",
            best_slide, best_score, neighbor_offset, neighbor_score, rough_price
        );

        Ok(RoughEstimate {
            best_slide,
            best_score,
            neighbor_offset,
            neighbor_score,
            total_score,
            slide_count,
            best_price,
            neighbor_price,
            rough_price,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CURRENT;
    use crate::histogram::histogram_config::HistogramConfig;

    fn histogram(amounts: &[(f64, usize)]) -> OutputHistogram {
        let mut hist = OutputHistogram::new();
        for &(amount, n) in amounts {
            for _ in 0..n {
                hist.insert(amount);
            }
        }
        hist.finalize(CURRENT.round_unit_bins, &HistogramConfig::default())
            .unwrap();
        hist
    }

    #[test]
    fn test_default_range_is_valid() {
        assert!(StencilMatcher::new(&CURRENT, &StencilConfig::default()).is_ok());
    }

    #[test]
    fn test_out_of_bounds_range_rejected() {
        let conf = StencilConfig::new(None, Some(-400), None, None).unwrap();
        assert!(StencilMatcher::new(&CURRENT, &conf).is_err());
        let conf = StencilConfig::new(None, None, Some(1500), None).unwrap();
        assert!(StencilMatcher::new(&CURRENT, &conf).is_err());
    }

    #[test]
    fn test_degenerate_weighting() {
        // every slide window misses the histogram mass entirely
        let hist = histogram(&[(2.5, 10), (3.7, 10), (5.5, 5)]);
        let matcher = StencilMatcher::new(&CURRENT, &StencilConfig::default()).unwrap();
        let err = matcher.match_histogram(&hist).unwrap_err();
        assert_eq!(err.errcode, ErrCode::DegenerateWeighting);
        assert_eq!(err.stage, Stage::Stencil);
    }

    /// Ten outputs at each of four prices around every round USD amount for $100k
    fn round_usd_amounts() -> Vec<f64> {
        let mut amounts = Vec::new();
        const USD: [f64; 14] = [
            5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0,
            1000.0,
        ];
        for usd in USD {
            for f in [0.9925f64, 0.9975, 1.0025, 1.0075] {
                let sats = (usd * 1000.0 * f).round();
                amounts.extend(std::iter::repeat(sats / 1e8).take(10));
            }
        }
        amounts
    }

    #[test]
    fn test_round_usd_amounts_find_slide_zero() {
        let mut hist = OutputHistogram::new();
        for amount in round_usd_amounts() {
            hist.insert(amount);
        }
        hist.finalize(CURRENT.round_unit_bins, &HistogramConfig::default())
            .unwrap();
        let matcher = StencilMatcher::new(&CURRENT, &StencilConfig::default()).unwrap();
        let rough = matcher.match_histogram(&hist).unwrap();
        assert_eq!(rough.best_slide, 0);
        assert_eq!(rough.neighbor_offset, 1);
        assert_eq!(rough.slide_count, 342);
        assert!((rough.best_price - 100_000.0).abs() < 1e-6);
        assert_eq!(rough.rough_price, rough.rough_price.trunc());
        assert!((rough.rough_price - 100_000.0).abs() / 100_000.0 < 0.02);
    }
}
