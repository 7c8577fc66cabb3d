//! Account address type (`G…` strkey).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Stellar account address: the strkey encoding of an Ed25519 public key.
///
/// Always 56 characters starting with `G`. Checksum validation lives in
/// `stellar_wallet_crypto::strkey`, which is the only place addresses should
/// be derived from key material.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountAddress(String);

impl AccountAddress {
    /// Version prefix character for account ids.
    pub const PREFIX: char = 'G';
    /// Length of an encoded account id.
    pub const ENCODED_LEN: usize = 56;

    /// Wrap an already-encoded address string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Return the raw address string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Cheap shape check: prefix and length only, no checksum.
    pub fn has_account_shape(&self) -> bool {
        self.0.len() == Self::ENCODED_LEN && self.0.starts_with(Self::PREFIX)
    }
}

impl fmt::Display for AccountAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AccountAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
