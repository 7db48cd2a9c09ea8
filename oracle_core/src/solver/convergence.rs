//! Iterative window search for the representative price.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use super::central::find_central;
use super::solver_config::SolverConfig;
use crate::common::{
    enums::Stage,
    oracle_error::{ErrCode, OracleError},
};

/// Working window plus every candidate centre visited so far
#[derive(Debug, Clone, Default)]
pub struct ConvergenceState {
    pub price_low: f64,
    pub price_high: f64,
    visited: HashSet<u64>,
    history: Vec<f64>,
}

impl ConvergenceState {
    pub fn new(center: f64, pct: f64) -> Self {
        let mut state = Self::default();
        state.recenter(center, pct);
        state
    }

    pub fn recenter(&mut self, center: f64, pct: f64) {
        self.price_low = center - pct * center;
        self.price_high = center + pct * center;
    }

    /// Record a candidate; true if it was already visited
    pub fn visit(&mut self, candidate: f64) -> bool {
        self.history.push(candidate);
        !self.visited.insert(candidate.to_bits())
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }

    pub fn last(&self) -> Option<f64> {
        self.history.last().copied()
    }

    /// Re-centring steps taken after the first candidate
    pub fn iterations(&self) -> usize {
        self.history.len().saturating_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolverResult {
    /// Terminal candidate, unrounded
    pub central_price: f64,
    /// Terminal candidate rounded to whole currency units
    pub final_price: f64,
    /// MAD over the deviation window, as a fraction of that window's width
    pub deviation_pct: f64,
    pub mad: f64,
    /// Re-centring steps until a candidate recurred
    pub iterations: usize,
    /// Candidates in visit order, ending with the recurring one
    pub candidates: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct CentralTendencySolver {
    conf: SolverConfig,
}

impl CentralTendencySolver {
    pub fn new(conf: &SolverConfig) -> Self {
        Self { conf: conf.clone() }
    }

    /// Re-centre on the L1-central point until a candidate recurs.
    ///
    /// The returned state's history ends with the recurring candidate.
    pub fn converge(
        &self,
        prices: &[f64],
        rough_price: f64,
    ) -> Result<ConvergenceState, OracleError> {
        let pct = self.conf.tight_window;
        let mut state = ConvergenceState::new(rough_price, pct);
        let mut candidate = find_central(prices, state.price_low, state.price_high)?.price;
        state.visit(candidate);

        loop {
            if state.iterations() >= self.conf.max_iterations {
                return Err(OracleError::new(
                    Stage::Solver,
                    ErrCode::NoConvergence,
                    format!(
                        "no recurring candidate after {} iterations, last {:.2}",
                        state.iterations(),
                        candidate
                    ),
                ));
            }
            state.recenter(candidate, pct);
            candidate = find_central(prices, state.price_low, state.price_high)?.price;
            if state.visit(candidate) {
                return Ok(state);
            }
        }
    }

    pub fn solve(&self, prices: &[f64], rough_price: f64) -> Result<SolverResult, OracleError> {
        let state = self.converge(prices, rough_price)?;
        let Some(central_price) = state.last() else {
            return Err(OracleError::insufficient(Stage::Solver, "no candidate visited"));
        };
        let iterations = state.iterations();

        let pct = self.conf.deviation_window;
        let low = central_price - pct * central_price;
        let high = central_price + pct * central_price;
        let spread = find_central(prices, low, high)?;
        let deviation_pct = spread.mad / (high - low);

        debug!(
            "converged on {:.2} after {} iterations, deviation {:.4}",
            central_price, iterations, deviation_pct
        );

        Ok(SolverResult {
            central_price,
            final_price: central_price.round(),
            deviation_pct,
            mad: spread.mad,
            iterations,
            candidates: state.history,
        })
    }
}
