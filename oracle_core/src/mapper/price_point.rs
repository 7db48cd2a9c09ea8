use serde::{Deserialize, Serialize};

/// USD price implied by one output under one round denomination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub implied_price: f64,
    pub block_height: u32,
    pub block_time: u64,
}

impl PricePoint {
    pub fn new(implied_price: f64, block_height: u32, block_time: u64) -> Self {
        Self {
            implied_price,
            block_height,
            block_time,
        }
    }
}
