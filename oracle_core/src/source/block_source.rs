use serde::{Deserialize, Serialize};

use crate::common::oracle_error::OracleError;

/// One row of the block manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockRef {
    pub height: u32,
    /// Display-order hex
    pub hash: String,
    /// Header time, seconds since the epoch
    pub time: u64,
}

impl BlockRef {
    pub fn new(height: u32, hash: impl Into<String>, time: u64) -> Self {
        Self {
            height,
            hash: hash.into(),
            time,
        }
    }

    pub fn hash_matches(&self, hash_hex: &str) -> bool {
        self.hash.trim().eq_ignore_ascii_case(hash_hex)
    }
}

/// Read access to raw block bytes.
///
/// Implementations fail with `LedgerUnavailable` when a block cannot be
/// produced; callers may retry those.
pub trait BlockSource: Send + Sync {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError>;

    fn name(&self) -> &str;

    /// Called once with the full window before any block is fetched
    fn prepare(&self, _blocks: &[BlockRef]) -> Result<(), OracleError> {
        Ok(())
    }
}

impl<T: BlockSource + ?Sized> BlockSource for Box<T> {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError> {
        (**self).block_bytes(block)
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn prepare(&self, blocks: &[BlockRef]) -> Result<(), OracleError> {
        (**self).prepare(blocks)
    }
}
