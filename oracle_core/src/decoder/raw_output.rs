use serde::{Deserialize, Serialize};

/// A qualifying transaction output
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawOutput {
    /// Native units
    pub amount: f64,
    pub block_height: u32,
    /// Block header time, seconds since the epoch
    pub block_time: u64,
}

impl RawOutput {
    pub fn new(amount: f64, block_height: u32, block_time: u64) -> Self {
        Self {
            amount,
            block_height,
            block_time,
        }
    }
}
