use serde::Serialize;

use super::oracle::PriceEstimate;
use crate::decoder::scanner::ScanStats;
use crate::mapper::price_point::PricePoint;

/// Price band for plotting, widened as the deviation grows
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PresentationBounds {
    /// Half-width as a fraction of the price, in [0.05, 0.20]
    pub ax_range: f64,
    pub low: f64,
    pub high: f64,
}

impl PresentationBounds {
    pub const MIN_RANGE: f64 = 0.05;
    pub const MAX_RANGE: f64 = 0.20;

    pub fn from_deviation(central_price: f64, deviation_pct: f64) -> Self {
        let slope = (0.15 - 0.05) / (0.20 - 0.17);
        let ax_range =
            (0.05 + (deviation_pct - 0.17) * slope).clamp(Self::MIN_RANGE, Self::MAX_RANGE);
        Self {
            ax_range,
            low: central_price - ax_range * central_price,
            high: central_price + ax_range * central_price,
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        self.low < price && price < self.high
    }
}

/// Everything one oracle run produces
#[derive(Debug, Clone, Serialize)]
pub struct OracleReport {
    pub window: String,
    pub first_height: u32,
    pub last_height: u32,
    pub final_price: f64,
    pub central_price: f64,
    pub rough_price: f64,
    pub deviation_pct: f64,
    pub iterations: usize,
    pub bounds: PresentationBounds,
    pub stats: ScanStats,
    pub calibration_version: String,
    pub price_points: Vec<PricePoint>,
}

impl OracleReport {
    pub fn new(
        window: impl Into<String>,
        heights: (u32, u32),
        stats: ScanStats,
        estimate: PriceEstimate,
        calibration_version: &str,
    ) -> Self {
        let solution = &estimate.solution;
        Self {
            window: window.into(),
            first_height: heights.0,
            last_height: heights.1,
            final_price: solution.final_price,
            central_price: solution.central_price,
            rough_price: estimate.rough.rough_price,
            deviation_pct: solution.deviation_pct,
            iterations: solution.iterations,
            bounds: PresentationBounds::from_deviation(
                solution.central_price,
                solution.deviation_pct,
            ),
            stats,
            calibration_version: calibration_version.to_string(),
            price_points: estimate.points,
        }
    }

    /// Price points strictly inside the presentation bounds, in block order
    pub fn plot_points(&self) -> Vec<PricePoint> {
        self.price_points
            .iter()
            .filter(|p| self.bounds.contains(p.implied_price))
            .copied()
            .collect()
    }
}
