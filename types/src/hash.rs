//! Transaction hash.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SHA-256 of a transaction's signature payload. Depends on the network the
/// transaction was hashed for, so the same transaction has one hash per
/// network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TxHash([u8; 32]);

impl TxHash {
    pub fn new(digest: [u8; 32]) -> Self {
        Self(digest)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex, as the ledger API reports hashes.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxHash({}…)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_abbreviated() {
        let hash = TxHash::new([0xab; 32]);
        assert_eq!(format!("{hash:?}"), "TxHash(abababab…)");
        assert_eq!(hash.to_string().len(), 64);
    }
}
