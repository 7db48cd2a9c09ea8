use std::fmt;

use crate::common::utils::{hash_from_hex, reversed, sha256d};
use crate::common::oracle_error::OracleError;

/// Transaction id in internal (hashed) byte order; displays byte-reversed
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    pub const ZERO: Txid = Txid([0u8; 32]);

    pub fn from_serialization(bytes: &[u8]) -> Self {
        Txid(sha256d(bytes))
    }

    /// Parse the conventional reversed-hex rendering
    pub fn from_hex(s: &str) -> Result<Self, OracleError> {
        Ok(Txid(reversed(hash_from_hex(s)?)))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(reversed(self.0))
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({})", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_is_reversed() {
        let mut raw = [0u8; 32];
        raw[0] = 0xab;
        let txid = Txid(raw);
        assert!(txid.to_hex().ends_with("ab"));
        assert_eq!(Txid::from_hex(&txid.to_hex()).unwrap(), txid);
    }
}
