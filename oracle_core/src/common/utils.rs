use sha2::{Digest, Sha256};

use super::oracle_error::OracleError;

/// Double SHA-256, as used for txids and block hashes
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Reverse a 32-byte hash into display (big-endian) order
pub fn reversed(hash: [u8; 32]) -> [u8; 32] {
    let mut out = hash;
    out.reverse();
    out
}

/// Parse a 64-char hex string into 32 bytes, keeping the byte order as written
pub fn hash_from_hex(s: &str) -> Result<[u8; 32], OracleError> {
    let bytes = hex::decode(s.trim())
        .map_err(|e| OracleError::para(format!("bad hash {:?}: {}", s, e)))?;
    if bytes.len() != 32 {
        return Err(OracleError::para(format!(
            "hash {:?} has {} bytes, expected 32",
            s,
            bytes.len()
        )));
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Ok(out)
}

/// Check if `value` lies strictly inside `(center * (1 - pct), center * (1 + pct))`
pub fn within_pct(value: f64, center: f64, pct: f64) -> bool {
    let dn = center - pct * center;
    let up = center + pct * center;
    dn < value && value < up
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256d_empty() {
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }

    #[test]
    fn test_reversed() {
        let mut h = [0u8; 32];
        h[0] = 1;
        assert_eq!(reversed(h)[31], 1);
    }

    #[test]
    fn test_hash_from_hex() {
        let s = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
        let h = hash_from_hex(s).unwrap();
        assert_eq!(hex::encode(h), s);
        assert!(hash_from_hex("abcd").is_err());
        assert!(hash_from_hex("zz").is_err());
    }

    #[test]
    fn test_within_pct() {
        assert!(within_pct(1.2, 1.0, 0.25));
        assert!(!within_pct(1.25, 1.0, 0.25));
        assert!(!within_pct(0.75, 1.0, 0.25));
    }
}
