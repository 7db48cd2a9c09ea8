//! Block scanning: fetch, decode and apply the same-day filter in block order.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use super::block::{decode_block, DecodedBlock};
use super::filter_config::TxFilterConfig;
use super::raw_output::RawOutput;
use super::seen_txids::SeenTxids;
use crate::common::oracle_error::OracleError;
use crate::source::block_source::{BlockRef, BlockSource};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub blocks: usize,
    pub transactions: usize,
    /// Passed the per-transaction filters
    pub candidate_txs: usize,
    /// Candidates dropped for spending a txid seen earlier in the run
    pub same_day_spends: usize,
    pub qualifying_txs: usize,
    pub outputs: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub outputs: Vec<RawOutput>,
    pub stats: ScanStats,
}

/// Fetch and decode one block, checking it is the block the manifest names
pub fn load_block<S: BlockSource + ?Sized>(
    source: &S,
    block: &BlockRef,
    filter: &TxFilterConfig,
) -> Result<DecodedBlock, OracleError> {
    let bytes = source.block_bytes(block)?;
    let decoded = decode_block(&bytes, filter)?;
    let hash = decoded.hash_hex();
    if !block.hash_matches(&hash) {
        return Err(OracleError::decode(format!(
            "{} returned block {} for height {}, expected {}",
            source.name(),
            hash,
            block.height,
            block.hash
        )));
    }
    debug!(
        "decoded block {} ({} txs, {} candidates)",
        block.height,
        decoded.tx_count(),
        decoded.candidates.len()
    );
    Ok(decoded)
}

/// Apply the same-day filter to one decoded block.
///
/// Each txid is recorded before that transaction's inputs are checked, so a
/// spend of an earlier transaction in the same block is excluded too.
pub fn fold_block(
    block: &DecodedBlock,
    height: u32,
    seen: &mut SeenTxids,
    stats: &mut ScanStats,
) -> Vec<RawOutput> {
    let time = block.header.time as u64;
    let mut outputs = Vec::new();
    let mut candidates = block.candidates.iter().peekable();

    for (tx_index, txid) in block.txids.iter().enumerate() {
        seen.insert(*txid);
        let Some(candidate) = candidates.next_if(|c| c.tx_index == tx_index) else {
            continue;
        };
        stats.candidate_txs += 1;
        if seen.spends_seen(&candidate.input_txids) {
            stats.same_day_spends += 1;
            continue;
        }
        stats.qualifying_txs += 1;
        outputs.extend(
            candidate
                .amounts
                .iter()
                .map(|amount| RawOutput::new(*amount, height, time)),
        );
    }

    stats.blocks += 1;
    stats.transactions += block.tx_count();
    stats.outputs += outputs.len();
    outputs
}

/// Lazily yields each block's qualifying outputs in manifest order.
///
/// Stops after the first error.
pub struct OutputScanner<'a, S: BlockSource + ?Sized> {
    source: &'a S,
    blocks: std::slice::Iter<'a, BlockRef>,
    filter: &'a TxFilterConfig,
    seen: SeenTxids,
    stats: ScanStats,
    failed: bool,
}

impl<'a, S: BlockSource + ?Sized> OutputScanner<'a, S> {
    pub fn new(source: &'a S, blocks: &'a [BlockRef], filter: &'a TxFilterConfig) -> Self {
        Self {
            source,
            blocks: blocks.iter(),
            filter,
            seen: SeenTxids::new(),
            stats: ScanStats::default(),
            failed: false,
        }
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }
}

impl<S: BlockSource + ?Sized> Iterator for OutputScanner<'_, S> {
    type Item = Result<Vec<RawOutput>, OracleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let block = self.blocks.next()?;
        match load_block(self.source, block, self.filter) {
            Ok(decoded) => Some(Ok(fold_block(
                &decoded,
                block.height,
                &mut self.seen,
                &mut self.stats,
            ))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

/// Scan `blocks` into a flat output list.
///
/// With `parallel`, blocks are fetched and decoded on the current rayon pool
/// and then folded sequentially in manifest order; the result is identical to
/// the sequential scan. `on_block` is called once per loaded block.
pub fn scan_blocks<S, F>(
    source: &S,
    blocks: &[BlockRef],
    filter: &TxFilterConfig,
    parallel: bool,
    on_block: F,
) -> Result<ScanResult, OracleError>
where
    S: BlockSource + ?Sized,
    F: Fn(&BlockRef) + Sync,
{
    if !parallel {
        let mut scanner = OutputScanner::new(source, blocks, filter);
        let mut outputs = Vec::new();
        for (block, block_outputs) in blocks.iter().zip(scanner.by_ref()) {
            outputs.extend(block_outputs?);
            on_block(block);
        }
        return Ok(ScanResult {
            outputs,
            stats: scanner.stats().clone(),
        });
    }

    let decoded = blocks
        .par_iter()
        .map(|block| {
            let decoded = load_block(source, block, filter);
            on_block(block);
            decoded
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen = SeenTxids::new();
    let mut stats = ScanStats::default();
    let mut outputs = Vec::new();
    for (block, decoded) in blocks.iter().zip(decoded.iter()) {
        outputs.extend(fold_block(decoded, block.height, &mut seen, &mut stats));
    }
    Ok(ScanResult { outputs, stats })
}
