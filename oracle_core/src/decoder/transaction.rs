//! Transaction parsing with witness-aware txid computation.

use super::byte_reader::ByteReader;
use super::txid::Txid;
use super::varint::write_varint;
use crate::common::oracle_error::OracleError;

pub const OP_RETURN: u8 = 0x6a;
pub const COINBASE_VOUT: u32 = 0xffff_ffff;
/// Smallest possible serialized transaction: version, one input, one output, lock time
pub const MIN_TX_SIZE: usize = 60;
const MIN_INPUT_SIZE: usize = 41;
const MIN_OUTPUT_SIZE: usize = 9;
const SEGWIT_MARKER: [u8; 2] = [0x00, 0x01];

#[derive(Debug, Clone, PartialEq)]
pub struct TxIn<'a> {
    pub prev_txid: Txid,
    pub prev_vout: u32,
    pub script_sig: &'a [u8],
    pub sequence: u32,
    pub witness: Vec<&'a [u8]>,
}

impl TxIn<'_> {
    pub fn is_coinbase(&self) -> bool {
        self.prev_txid == Txid::ZERO && self.prev_vout == COINBASE_VOUT
    }

    pub fn witness_len(&self) -> usize {
        self.witness.iter().map(|item| item.len()).sum()
    }

    /// Any single item, or the running total, above `max_bytes`
    pub fn witness_exceeds(&self, max_bytes: usize) -> bool {
        let mut total = 0usize;
        for item in &self.witness {
            total += item.len();
            if item.len() > max_bytes || total > max_bytes {
                return true;
            }
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TxOut<'a> {
    /// Value in the smallest indivisible unit
    pub value: u64,
    pub script_pubkey: &'a [u8],
}

impl TxOut<'_> {
    pub fn is_op_return(&self) -> bool {
        self.script_pubkey.first() == Some(&OP_RETURN)
    }
}

/// A decoded transaction borrowing scripts and witness items from the block bytes
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction<'a> {
    pub version: i32,
    pub inputs: Vec<TxIn<'a>>,
    pub outputs: Vec<TxOut<'a>>,
    pub lock_time: u32,
    pub has_witness: bool,
    pub txid: Txid,
}

impl<'a> Transaction<'a> {
    pub fn parse(reader: &mut ByteReader<'a>) -> Result<Self, OracleError> {
        let start = reader.position();
        let version = reader.read_u32_le()? as i32;

        let has_witness = reader.peek_array::<2>() == Some(SEGWIT_MARKER);
        if has_witness {
            reader.skip(2)?;
        }

        let body_start = reader.position();
        let input_count = reader.read_length(MIN_INPUT_SIZE)?;
        let mut inputs = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let prev_txid = Txid(reader.read_array::<32>()?);
            let prev_vout = reader.read_u32_le()?;
            let script_len = reader.read_length(1)?;
            let script_sig = reader.read_bytes(script_len)?;
            let sequence = reader.read_u32_le()?;
            inputs.push(TxIn {
                prev_txid,
                prev_vout,
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let output_count = reader.read_length(MIN_OUTPUT_SIZE)?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = reader.read_u64_le()?;
            let script_len = reader.read_length(1)?;
            let script_pubkey = reader.read_bytes(script_len)?;
            outputs.push(TxOut {
                value,
                script_pubkey,
            });
        }
        let body_end = reader.position();

        if has_witness {
            for input in inputs.iter_mut() {
                let item_count = reader.read_length(1)?;
                let mut witness = Vec::with_capacity(item_count);
                for _ in 0..item_count {
                    let item_len = reader.read_length(1)?;
                    witness.push(reader.read_bytes(item_len)?);
                }
                input.witness = witness;
            }
        }

        let lock_start = reader.position();
        let lock_time = reader.read_u32_le()?;
        let end = reader.position();

        let txid = if has_witness {
            let mut stripped = Vec::with_capacity(4 + (body_end - body_start) + 4);
            stripped.extend_from_slice(reader.slice(start, start + 4));
            stripped.extend_from_slice(reader.slice(body_start, body_end));
            stripped.extend_from_slice(reader.slice(lock_start, end));
            Txid::from_serialization(&stripped)
        } else {
            Txid::from_serialization(reader.slice(start, end))
        };

        Ok(Self {
            version,
            inputs,
            outputs,
            lock_time,
            has_witness,
            txid,
        })
    }

    pub fn is_coinbase(&self) -> bool {
        self.inputs.iter().any(|input| input.is_coinbase())
    }

    pub fn has_op_return(&self) -> bool {
        self.outputs.iter().any(|output| output.is_op_return())
    }

    pub fn witness_exceeds(&self, max_bytes: usize) -> bool {
        self.inputs.iter().any(|input| input.witness_exceeds(max_bytes))
    }

    /// Serialize; witness data is written only when `with_witness` is set and present
    pub fn encode(&self, with_witness: bool) -> Vec<u8> {
        let with_witness = with_witness && self.inputs.iter().any(|i| !i.witness.is_empty());
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        if with_witness {
            out.extend_from_slice(&SEGWIT_MARKER);
        }
        write_varint(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            out.extend_from_slice(&input.prev_txid.0);
            out.extend_from_slice(&input.prev_vout.to_le_bytes());
            write_varint(&mut out, input.script_sig.len() as u64);
            out.extend_from_slice(input.script_sig);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }
        write_varint(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            out.extend_from_slice(&output.value.to_le_bytes());
            write_varint(&mut out, output.script_pubkey.len() as u64);
            out.extend_from_slice(output.script_pubkey);
        }
        if with_witness {
            for input in &self.inputs {
                write_varint(&mut out, input.witness.len() as u64);
                for item in &input.witness {
                    write_varint(&mut out, item.len() as u64);
                    out.extend_from_slice(item);
                }
            }
        }
        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    pub fn compute_txid(&self) -> Txid {
        Txid::from_serialization(&self.encode(false))
    }
}
