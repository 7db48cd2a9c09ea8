use std::collections::HashMap;

use super::block_source::{BlockRef, BlockSource};
use crate::common::oracle_error::OracleError;

/// Blocks held in memory, keyed by lowercase display-order hash
#[derive(Debug, Clone, Default)]
pub struct MemoryBlockSource {
    blocks: HashMap<String, Vec<u8>>,
}

impl MemoryBlockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, hash: impl AsRef<str>, bytes: Vec<u8>) {
        self.blocks.insert(hash.as_ref().trim().to_lowercase(), bytes);
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockSource for MemoryBlockSource {
    fn block_bytes(&self, block: &BlockRef) -> Result<Vec<u8>, OracleError> {
        self.blocks
            .get(&block.hash.trim().to_lowercase())
            .cloned()
            .ok_or_else(|| {
                OracleError::ledger(format!(
                    "block {} at height {} not loaded",
                    block.hash, block.height
                ))
            })
    }

    fn name(&self) -> &str {
        "memory"
    }
}
