use tracing::debug;

use super::mapper_config::MapperConfig;
use super::price_point::PricePoint;
use super::round_amounts::RoundAmounts;
use crate::common::utils::within_pct;
use crate::decoder::raw_output::RawOutput;

/// Turns outputs into implied prices around each round USD denomination
#[derive(Debug, Clone)]
pub struct IntradayMapper {
    conf: MapperConfig,
    round_amounts: RoundAmounts,
}

impl IntradayMapper {
    pub fn new(conf: &MapperConfig) -> Self {
        Self {
            round_amounts: RoundAmounts::new(conf.round_amount_tolerance),
            conf: conf.clone(),
        }
    }

    /// Points for one output, one per denomination whose window holds the amount
    pub fn map_output(&self, output: &RawOutput, rough_price: f64) -> Vec<PricePoint> {
        let amount = output.amount;
        let mut points = Vec::new();
        for &usd in &self.conf.usd_denominations {
            let expected = usd / rough_price;
            if within_pct(amount, expected, self.conf.wide_tolerance)
                && !self.round_amounts.is_round(amount)
            {
                points.push(PricePoint::new(
                    usd / amount,
                    output.block_height,
                    output.block_time,
                ));
            }
        }
        points
    }

    /// Points in output order; overlapping denomination windows keep every match
    pub fn map_outputs(&self, outputs: &[RawOutput], rough_price: f64) -> Vec<PricePoint> {
        let points: Vec<PricePoint> = outputs
            .iter()
            .flat_map(|output| self.map_output(output, rough_price))
            .collect();
        debug!(
            "mapped {} outputs to {} price points at rough price {}",
            outputs.len(),
            points.len(),
            rough_price
        );
        points
    }
}
