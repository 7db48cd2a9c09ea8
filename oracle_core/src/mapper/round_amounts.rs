//! Perfectly round native-unit amounts, excluded from price mapping.

/// (start, end, step) in native units; each range is half-open
const ROUND_RANGES: [(f64, f64, f64); 5] = [
    (0.00005, 0.0001, 0.00001),
    (0.0001, 0.001, 0.00001),
    (0.001, 0.01, 0.0001),
    (0.01, 0.1, 0.001),
    (0.1, 1.0, 0.01),
];

#[derive(Debug, Clone)]
pub struct RoundAmounts {
    /// Sorted ascending
    values: Vec<f64>,
    tolerance: f64,
}

impl RoundAmounts {
    pub fn new(tolerance: f64) -> Self {
        let mut values = Vec::new();
        for (start, end, step) in ROUND_RANGES {
            // accumulated, so the grid keeps the drift of repeated addition
            let mut v = start;
            while v < end {
                values.push(v);
                v += step;
            }
        }
        values.sort_by(f64::total_cmp);
        Self { values, tolerance }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True if `amount` is strictly within the tolerance of a round value
    pub fn is_round(&self, amount: f64) -> bool {
        // first value whose upper bound lies above the amount
        let idx = self
            .values
            .partition_point(|r| r + self.tolerance * r <= amount);
        self.values[idx..]
            .iter()
            .take_while(|r| *r - self.tolerance * *r < amount)
            .any(|r| amount < r + self.tolerance * r)
    }
}
