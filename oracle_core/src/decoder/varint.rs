//! Compact-size unsigned integers as used in the ledger's serialization.

use super::byte_reader::ByteReader;
use crate::common::oracle_error::OracleError;

/// Read a varint: one byte below 0xfd, otherwise a marker followed by 2/4/8 LE bytes
pub fn read_varint(reader: &mut ByteReader<'_>) -> Result<u64, OracleError> {
    let marker = reader.read_u8()?;
    match marker {
        0xfd => Ok(reader.read_u16_le()? as u64),
        0xfe => Ok(reader.read_u32_le()? as u64),
        0xff => reader.read_u64_le(),
        n => Ok(n as u64),
    }
}

/// Append the varint encoding of `n` to `out`
pub fn write_varint(out: &mut Vec<u8>, n: u64) {
    if n < 0xfd {
        out.push(n as u8);
    } else if n <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(n as u16).to_le_bytes());
    } else if n <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(n as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&n.to_le_bytes());
    }
}

pub fn encode_varint(n: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(9);
    write_varint(&mut out, n);
    out
}

/// Decode a varint at the start of `bytes`, returning the value and bytes consumed
pub fn decode_varint(bytes: &[u8]) -> Result<(u64, usize), OracleError> {
    let mut reader = ByteReader::new(bytes);
    let value = read_varint(&mut reader)?;
    Ok((value, reader.position()))
}
