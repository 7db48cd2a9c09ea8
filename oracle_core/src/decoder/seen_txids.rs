use std::collections::HashSet;

use super::txid::Txid;

/// Txids observed so far in one run; grows monotonically in block order
#[derive(Debug, Clone, Default)]
pub struct SeenTxids {
    txids: HashSet<Txid>,
}

impl SeenTxids {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, txid: Txid) -> bool {
        self.txids.insert(txid)
    }

    pub fn contains(&self, txid: &Txid) -> bool {
        self.txids.contains(txid)
    }

    /// True if any of `inputs` spends a txid already seen
    pub fn spends_seen(&self, inputs: &[Txid]) -> bool {
        inputs.iter().any(|txid| self.txids.contains(txid))
    }

    pub fn len(&self) -> usize {
        self.txids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spends_seen() {
        let mut seen = SeenTxids::new();
        assert!(seen.insert(Txid([1; 32])));
        assert!(!seen.insert(Txid([1; 32])));
        assert!(seen.spends_seen(&[Txid([9; 32]), Txid([1; 32])]));
        assert!(!seen.spends_seen(&[Txid([9; 32])]));
        assert!(!seen.spends_seen(&[]));
        assert_eq!(seen.len(), 1);
    }
}
