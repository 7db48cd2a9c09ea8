use serde::Serialize;

use crate::common::{enums::Stage, oracle_error::OracleError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CentralEstimate {
    /// The point minimizing the summed absolute distance to all others in the window
    pub price: f64,
    /// Median absolute deviation around `price`
    pub mad: f64,
    /// Points strictly inside the window
    pub count: usize,
}

/// L1-central point and its MAD among `prices` strictly inside `(low, high)`
pub fn find_central(prices: &[f64], low: f64, high: f64) -> Result<CentralEstimate, OracleError> {
    let mut window: Vec<f64> = prices
        .iter()
        .copied()
        .filter(|p| low < *p && *p < high)
        .collect();
    if window.is_empty() {
        return Err(OracleError::insufficient(
            Stage::Solver,
            format!("no price points in ({:.2}, {:.2})", low, high),
        ));
    }
    window.sort_by(f64::total_cmp);

    let n = window.len();
    let total: f64 = window.iter().sum();
    let mut left_sum = 0.0;
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (i, x) in window.iter().enumerate() {
        let right_sum = total - left_sum - x;
        let dist = (x * i as f64 - left_sum) + (right_sum - x * (n - i - 1) as f64);
        if dist < best_dist {
            best_dist = dist;
            best_idx = i;
        }
        left_sum += x;
    }
    let price = window[best_idx];

    let mut deviations: Vec<f64> = window.iter().map(|x| (x - price).abs()).collect();
    deviations.sort_by(f64::total_cmp);
    let mad = if n % 2 == 0 {
        (deviations[n / 2 - 1] + deviations[n / 2]) / 2.0
    } else {
        deviations[n / 2]
    };

    Ok(CentralEstimate {
        price,
        mad,
        count: n,
    })
}
