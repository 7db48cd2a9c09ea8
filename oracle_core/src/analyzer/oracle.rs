use serde::Serialize;
use tracing::info;

use super::report::OracleReport;
use crate::calibration::{Calibration, CURRENT};
use crate::common::{enums::Stage, oracle_error::OracleError};
use crate::config::oracle_config::OracleConfig;
use crate::decoder::{raw_output::RawOutput, scanner::scan_blocks};
use crate::histogram::output_histogram::OutputHistogram;
use crate::mapper::{intraday_mapper::IntradayMapper, price_point::PricePoint};
use crate::solver::convergence::{CentralTendencySolver, SolverResult};
use crate::source::{
    block_source::{BlockRef, BlockSource},
    block_window::BlockWindow,
};
use crate::stencil::stencil_matcher::{RoughEstimate, StencilMatcher};

/// Result of the estimation stages for one set of outputs
#[derive(Debug, Clone, Serialize)]
pub struct PriceEstimate {
    pub rough: RoughEstimate,
    pub solution: SolverResult,
    pub points: Vec<PricePoint>,
}

/// Runs decode, histogram, stencil match, mapping and solving for a block window
#[derive(Debug)]
pub struct Oracle {
    config: OracleConfig,
    calibration: &'static Calibration,
    matcher: StencilMatcher,
    mapper: IntradayMapper,
    solver: CentralTendencySolver,
}

impl Oracle {
    pub fn new(config: OracleConfig) -> Result<Self, OracleError> {
        Self::with_calibration(config, &CURRENT)
    }

    pub fn with_calibration(
        config: OracleConfig,
        calibration: &'static Calibration,
    ) -> Result<Self, OracleError> {
        Ok(Self {
            matcher: StencilMatcher::new(calibration, &config.stencil_conf)?,
            mapper: IntradayMapper::new(&config.mapper_conf),
            solver: CentralTendencySolver::new(&config.solver_conf),
            calibration,
            config,
        })
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    pub fn calibration(&self) -> &'static Calibration {
        self.calibration
    }

    /// Histogram, stencil match, mapping and solving over already filtered outputs
    pub fn estimate_from_outputs(
        &self,
        outputs: &[RawOutput],
    ) -> Result<PriceEstimate, OracleError> {
        let hist = OutputHistogram::build(
            outputs,
            self.calibration.round_unit_bins,
            &self.config.histogram_conf,
        )?;
        info!(
            "histogram built from {} outputs ({} out of range)",
            hist.inserted(),
            hist.rejected()
        );

        let rough = self.matcher.match_histogram(&hist)?;
        info!(
            "rough price ${} at slide {}",
            rough.rough_price, rough.best_slide
        );

        let points = self.mapper.map_outputs(outputs, rough.rough_price);
        info!("{} price points", points.len());

        let prices: Vec<f64> = points.iter().map(|p| p.implied_price).collect();
        let solution = self.solver.solve(&prices, rough.rough_price)?;
        info!(
            "central price ${:.2}, deviation {:.4} after {} iterations",
            solution.central_price, solution.deviation_pct, solution.iterations
        );

        Ok(PriceEstimate {
            rough,
            solution,
            points,
        })
    }

    pub fn run<S: BlockSource + ?Sized>(
        &self,
        source: &S,
        window: &BlockWindow,
    ) -> Result<OracleReport, OracleError> {
        self.run_with_progress(source, window, |_| {})
    }

    /// As [`Oracle::run`], calling `on_block` as each block is loaded
    pub fn run_with_progress<S, F>(
        &self,
        source: &S,
        window: &BlockWindow,
        on_block: F,
    ) -> Result<OracleReport, OracleError>
    where
        S: BlockSource + ?Sized,
        F: Fn(&BlockRef) + Sync,
    {
        let (Some(first), Some(last)) = (window.first_height(), window.last_height()) else {
            return Err(OracleError::insufficient(Stage::Source, "block window is empty"));
        };
        info!(
            "scanning {} blocks ({}..={}) from {}",
            window.blocks.len(),
            first,
            last,
            source.name()
        );

        source.prepare(&window.blocks)?;
        let scan = scan_blocks(
            source,
            &window.blocks,
            &self.config.filter_conf,
            self.config.parallel_decode,
            on_block,
        )?;
        info!(
            "{} of {} transactions qualified, {} outputs",
            scan.stats.qualifying_txs, scan.stats.transactions, scan.stats.outputs
        );

        let estimate = self.estimate_from_outputs(&scan.outputs)?;
        let report = OracleReport::new(
            window.label(),
            (first, last),
            scan.stats,
            estimate,
            self.calibration.version,
        );
        info!("{} price: ${}", report.window, report.final_price);
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::oracle_error::ErrCode;

    fn outputs_at_100k() -> Vec<RawOutput> {
        let mut outputs = Vec::new();
        const USD: [f64; 14] = [
            5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0, 100.0, 150.0, 200.0, 300.0, 500.0,
            1000.0,
        ];
        for usd in USD {
            for f in [0.9925f64, 0.9975, 1.0025, 1.0075] {
                let amount = (usd * 1000.0 * f).round() / 1e8;
                for i in 0..10 {
                    outputs.push(RawOutput::new(amount, 830_000 + i, 1_710_000_000));
                }
            }
        }
        outputs
    }

    #[test]
    fn test_estimate_from_outputs() {
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let estimate = oracle.estimate_from_outputs(&outputs_at_100k()).unwrap();
        assert_eq!(estimate.rough.best_slide, 0);
        assert!((estimate.solution.final_price - 100_000.0).abs() / 100_000.0 < 0.01);
        assert_eq!(estimate.solution.final_price, estimate.solution.central_price.round());
        assert!(!estimate.points.is_empty());
    }

    #[test]
    fn test_only_round_amounts_are_smoothed_away() {
        let mut outputs = vec![RawOutput::new(0.002, 830_000, 1_710_000_000); 500];
        outputs.extend(vec![RawOutput::new(0.001, 830_001, 1_710_000_600); 300]);
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let err = oracle.estimate_from_outputs(&outputs).unwrap_err();
        assert_eq!(err.errcode, ErrCode::InsufficientData);
        assert_eq!(err.stage, Stage::Histogram);
    }

    #[test]
    fn test_empty_outputs() {
        let oracle = Oracle::new(OracleConfig::default()).unwrap();
        let err = oracle.estimate_from_outputs(&[]).unwrap_err();
        assert_eq!(err.errcode, ErrCode::InsufficientData);
    }
}
