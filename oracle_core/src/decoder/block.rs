use tracing::warn;

use super::byte_reader::ByteReader;
use super::filter_config::TxFilterConfig;
use super::transaction::{Transaction, MIN_TX_SIZE};
use super::txid::Txid;
use super::varint::write_varint;
use crate::common::oracle_error::OracleError;
use crate::common::utils::{reversed, sha256d};

pub const HEADER_SIZE: usize = 80;
pub const SATS_PER_UNIT: f64 = 100_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_blockhash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn parse(reader: &mut ByteReader<'_>) -> Result<Self, OracleError> {
        Ok(Self {
            version: reader.read_u32_le()? as i32,
            prev_blockhash: reader.read_array()?,
            merkle_root: reader.read_array()?,
            time: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }

    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&self.version.to_le_bytes());
        out[4..36].copy_from_slice(&self.prev_blockhash);
        out[36..68].copy_from_slice(&self.merkle_root);
        out[68..72].copy_from_slice(&self.time.to_le_bytes());
        out[72..76].copy_from_slice(&self.bits.to_le_bytes());
        out[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        out
    }

    /// Block hash in display order
    pub fn hash(&self) -> [u8; 32] {
        reversed(sha256d(&self.encode()))
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash())
    }
}

/// A transaction that passed every per-transaction filter except same-day reuse
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTx {
    /// Position within the block
    pub tx_index: usize,
    pub input_txids: Vec<Txid>,
    /// Output amounts inside the configured range, native units
    pub amounts: Vec<f64>,
}

/// Owned result of decoding one block, independent of any run state
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedBlock {
    pub header: BlockHeader,
    /// Every txid in block order
    pub txids: Vec<Txid>,
    /// Ordered by `tx_index`
    pub candidates: Vec<CandidateTx>,
}

impl DecodedBlock {
    pub fn hash_hex(&self) -> String {
        self.header.hash_hex()
    }

    pub fn tx_count(&self) -> usize {
        self.txids.len()
    }
}

fn passes_filter(tx: &Transaction<'_>, filter: &TxFilterConfig) -> bool {
    tx.inputs.len() <= filter.max_inputs
        && tx.outputs.len() == filter.required_outputs
        && !tx.is_coinbase()
        && !tx.has_op_return()
        && !tx.witness_exceeds(filter.max_witness_bytes)
}

/// Decode raw block bytes and apply the per-transaction filters
pub fn decode_block(bytes: &[u8], filter: &TxFilterConfig) -> Result<DecodedBlock, OracleError> {
    let mut reader = ByteReader::new(bytes);
    let header = BlockHeader::parse(&mut reader)?;
    let tx_count = reader.read_length(MIN_TX_SIZE)?;

    let mut txids = Vec::with_capacity(tx_count);
    let mut candidates = Vec::new();
    for tx_index in 0..tx_count {
        let tx = Transaction::parse(&mut reader)?;
        txids.push(tx.txid);
        if !passes_filter(&tx, filter) {
            continue;
        }
        candidates.push(CandidateTx {
            tx_index,
            input_txids: tx.inputs.iter().map(|input| input.prev_txid).collect(),
            amounts: tx
                .outputs
                .iter()
                .map(|output| output.value as f64 / SATS_PER_UNIT)
                .filter(|amount| filter.amount_in_range(*amount))
                .collect(),
        });
    }

    if !reader.is_empty() {
        warn!(
            "block {}: {} trailing bytes after {} transactions",
            header.hash_hex(),
            reader.remaining(),
            tx_count
        );
    }

    Ok(DecodedBlock {
        header,
        txids,
        candidates,
    })
}

/// Serialize a header and already-encoded transactions into block bytes
pub fn encode_block(header: &BlockHeader, txs: &[Vec<u8>]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_SIZE + 9 + txs.iter().map(Vec::len).sum::<usize>());
    out.extend_from_slice(&header.encode());
    write_varint(&mut out, txs.len() as u64);
    for tx in txs {
        out.extend_from_slice(tx);
    }
    out
}
