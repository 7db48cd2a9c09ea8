use crate::common::oracle_error::OracleError;

/// Forward-only cursor over a byte slice; every read is bounds-checked
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Bytes between two absolute offsets already passed by the cursor
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.buf[start..end]
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], OracleError> {
        if n > self.remaining() {
            return Err(OracleError::decode(format!(
                "truncated data: need {} bytes at offset {}, {} left",
                n,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), OracleError> {
        self.read_bytes(n).map(|_| ())
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], OracleError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn peek_array<const N: usize>(&self) -> Option<[u8; N]> {
        if N > self.remaining() {
            return None;
        }
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        Some(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, OracleError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, OracleError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, OracleError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64_le(&mut self) -> Result<u64, OracleError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_varint(&mut self) -> Result<u64, OracleError> {
        super::varint::read_varint(self)
    }

    /// Read a varint that announces a length or count of items at least
    /// `min_item_size` bytes each, failing if it cannot fit in what is left.
    pub fn read_length(&mut self, min_item_size: usize) -> Result<usize, OracleError> {
        let at = self.pos;
        let n = self.read_varint()?;
        let needed = (n as u128) * (min_item_size.max(1) as u128);
        if needed > self.remaining() as u128 {
            return Err(OracleError::decode(format!(
                "declared length {} at offset {} exceeds the {} bytes left",
                n,
                at,
                self.remaining()
            )));
        }
        Ok(n as usize)
    }
}
