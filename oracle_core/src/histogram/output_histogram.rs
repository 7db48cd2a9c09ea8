use tracing::debug;

use super::bins::{BinEdges, ACTIVE_BEGIN, ACTIVE_END};
use super::histogram_config::HistogramConfig;
use crate::common::{enums::Stage, oracle_error::OracleError};
use crate::decoder::raw_output::RawOutput;

/// Exclusive amount bounds for insertion, native units
pub const INSERT_MIN: f64 = 1e-5;
pub const INSERT_MAX: f64 = 1e5;

/// Log-scale histogram of output amounts.
///
/// Counts are raw until [`OutputHistogram::finalize`] trims, smooths,
/// normalizes and clips them.
#[derive(Debug, Clone)]
pub struct OutputHistogram {
    edges: BinEdges,
    counts: Vec<f64>,
    inserted: usize,
    rejected: usize,
    normalized: bool,
}

impl OutputHistogram {
    pub fn new() -> Self {
        let edges = BinEdges::new();
        let counts = vec![0.0; edges.len()];
        Self {
            edges,
            counts,
            inserted: 0,
            rejected: 0,
            normalized: false,
        }
    }

    /// Build and finalize in one step
    pub fn build<'a>(
        outputs: impl IntoIterator<Item = &'a RawOutput>,
        round_bins: &[usize],
        conf: &HistogramConfig,
    ) -> Result<Self, OracleError> {
        let mut hist = Self::new();
        for output in outputs {
            hist.insert(output.amount);
        }
        hist.finalize(round_bins, conf)?;
        Ok(hist)
    }

    pub fn insert(&mut self, amount: f64) -> bool {
        if !(amount > INSERT_MIN && amount < INSERT_MAX) {
            self.rejected += 1;
            return false;
        }
        match self.edges.bin_index(amount) {
            Some(idx) => {
                self.counts[idx] += 1.0;
                self.inserted += 1;
                true
            }
            None => {
                self.rejected += 1;
                false
            }
        }
    }

    pub fn finalize(
        &mut self,
        round_bins: &[usize],
        conf: &HistogramConfig,
    ) -> Result<(), OracleError> {
        self.trim_to_active();
        self.smooth_round_bins(round_bins);
        self.normalize()?;
        self.clip(conf.clip_ceiling);
        debug!(
            "histogram finalized: {} inserted, {} rejected",
            self.inserted, self.rejected
        );
        Ok(())
    }

    /// Zero every bin outside the active range
    pub fn trim_to_active(&mut self) {
        let len = self.counts.len();
        self.counts[..ACTIVE_BEGIN].fill(0.0);
        self.counts[ACTIVE_END.min(len)..].fill(0.0);
    }

    /// Replace each round native-unit bin by the mean of its neighbours
    pub fn smooth_round_bins(&mut self, round_bins: &[usize]) {
        for &r in round_bins {
            if r == 0 || r + 1 >= self.counts.len() {
                continue;
            }
            self.counts[r] = 0.5 * (self.counts[r + 1] + self.counts[r - 1]);
        }
    }

    pub fn normalize(&mut self) -> Result<(), OracleError> {
        let sum: f64 = self.counts[ACTIVE_BEGIN..ACTIVE_END].iter().sum();
        if sum <= 0.0 {
            return Err(OracleError::insufficient(
                Stage::Histogram,
                format!(
                    "no outputs in range ({} inserted, {} rejected)",
                    self.inserted, self.rejected
                ),
            ));
        }
        for count in &mut self.counts[ACTIVE_BEGIN..ACTIVE_END] {
            *count /= sum;
        }
        self.normalized = true;
        Ok(())
    }

    pub fn clip(&mut self, ceiling: f64) {
        for count in &mut self.counts[ACTIVE_BEGIN..ACTIVE_END] {
            if *count > ceiling {
                *count = ceiling;
            }
        }
    }

    pub fn edges(&self) -> &BinEdges {
        &self.edges
    }

    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    pub fn inserted(&self) -> usize {
        self.inserted
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }
}

impl Default for OutputHistogram {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::CURRENT;
    use crate::common::oracle_error::ErrCode;

    /// An amount in the middle of bin `i`
    fn mid(edges: &BinEdges, i: usize) -> f64 {
        (edges.edge(i) * edges.edge(i + 1)).sqrt()
    }

    #[test]
    fn test_normalized_sum_and_ceiling() {
        let mut hist = OutputHistogram::new();
        let edges = BinEdges::new();
        for i in ACTIVE_BEGIN..ACTIVE_END {
            hist.insert(mid(&edges, i));
        }
        hist.finalize(CURRENT.round_unit_bins, &HistogramConfig::default())
            .unwrap();
        let sum: f64 = hist.counts()[ACTIVE_BEGIN..ACTIVE_END].iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);
        assert!(hist.counts().iter().all(|c| *c <= 0.008));
        assert!(hist.is_normalized());
    }

    #[test]
    fn test_clip_caps_spikes() {
        let mut hist = OutputHistogram::new();
        for _ in 0..1000 {
            hist.insert(0.00123);
        }
        for i in 0..50 {
            hist.insert(0.01 * (1.0 + i as f64 * 0.07));
        }
        hist.finalize(CURRENT.round_unit_bins, &HistogramConfig::default())
            .unwrap();
        let spike = hist.edges().bin_index(0.00123).unwrap();
        assert_eq!(hist.counts()[spike], 0.008);
        assert!(hist.counts().iter().all(|c| *c <= 0.008));
    }

    #[test]
    fn test_round_bins_take_neighbour_mean() {
        let mut hist = OutputHistogram::new();
        let edges = BinEdges::new();
        for _ in 0..4 {
            hist.insert(mid(&edges, 600));
        }
        for _ in 0..9 {
            hist.insert(0.001);
        }
        hist.insert(mid(&edges, 602));
        hist.insert(mid(&edges, 602));
        hist.trim_to_active();
        hist.smooth_round_bins(CURRENT.round_unit_bins);
        assert_eq!(hist.counts()[601], 3.0);
        for &r in CURRENT.round_unit_bins {
            let c = hist.counts();
            assert_eq!(c[r], 0.5 * (c[r - 1] + c[r + 1]));
        }
    }

    #[test]
    fn test_trim_drops_out_of_range_bins() {
        let mut hist = OutputHistogram::new();
        assert!(hist.insert(5e-5));
        assert!(hist.insert(500.0));
        assert!(!hist.insert(1e-5));
        assert!(!hist.insert(2e5));
        hist.trim_to_active();
        let total: f64 = hist.counts().iter().sum();
        assert_eq!(total, 1.0);
        assert_eq!(hist.rejected(), 2);
    }

    #[test]
    fn test_empty_is_insufficient_data() {
        let none: Vec<RawOutput> = Vec::new();
        let err =
            OutputHistogram::build(&none, CURRENT.round_unit_bins, &HistogramConfig::default())
                .unwrap_err();
        assert_eq!(err.errcode, ErrCode::InsufficientData);
        assert_eq!(err.stage, Stage::Histogram);

        let only_large = [RawOutput::new(5000.0, 1, 0)];
        let err = OutputHistogram::build(
            only_large.iter(),
            CURRENT.round_unit_bins,
            &HistogramConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err.errcode, ErrCode::InsufficientData);
    }
}
