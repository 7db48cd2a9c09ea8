//! Logarithmic bin edges: 200 bins per decade from 1e-6 to 1e6 native units.

pub const BINS_PER_DECADE: usize = 200;
pub const MIN_EXPONENT: i32 = -6;
pub const MAX_EXPONENT: i32 = 6;
/// A leading zero edge plus 200 edges for each of the 12 decades
pub const NUM_EDGES: usize = (MAX_EXPONENT - MIN_EXPONENT) as usize * BINS_PER_DECADE + 1;

/// First and one-past-last bin of the range kept after trimming (1e-5 to 1e2)
pub const ACTIVE_BEGIN: usize = 201;
pub const ACTIVE_END: usize = 1601;

#[derive(Debug, Clone, PartialEq)]
pub struct BinEdges {
    edges: Vec<f64>,
}

impl BinEdges {
    pub fn new() -> Self {
        let mut edges = Vec::with_capacity(NUM_EDGES);
        edges.push(0.0);
        for exponent in MIN_EXPONENT..MAX_EXPONENT {
            for b in 0..BINS_PER_DECADE {
                edges.push(10f64.powf(exponent as f64 + b as f64 / BINS_PER_DECADE as f64));
            }
        }
        Self { edges }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Lower bound of bin `i`
    pub fn edge(&self, i: usize) -> f64 {
        self.edges[i]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the last edge not above `amount`, or `None` outside the span
    pub fn bin_index(&self, amount: f64) -> Option<usize> {
        let last = self.edges.len() - 1;
        if !(amount >= self.edges[1] && amount.is_finite()) {
            return None;
        }
        let span = (MAX_EXPONENT - MIN_EXPONENT) as f64;
        let pct = (amount.log10() - MIN_EXPONENT as f64) / span;
        let mut idx = ((pct * self.edges.len() as f64) as usize).min(last);

        while idx > 0 && self.edges[idx] > amount {
            idx -= 1;
        }
        while idx < last && self.edges[idx + 1] <= amount {
            idx += 1;
        }
        if idx == last && amount >= 10f64.powi(MAX_EXPONENT) {
            return None;
        }
        Some(idx)
    }
}

impl Default for BinEdges {
    fn default() -> Self {
        Self::new()
    }
}
