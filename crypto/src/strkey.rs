//! Strkey encoding for account ids and secret seeds.
//!
//! The codec itself (base32 body, version byte, CRC16-XModem trailer) comes
//! from `stellar-strkey`; this module pins it to the two key kinds the wallet
//! handles and maps failures into [`StrkeyError`].

use stellar_strkey::{ed25519, DecodeError};
use stellar_wallet_types::{AccountAddress, PublicKey, SecretSeed};
use thiserror::Error;
use zeroize::Zeroize;

/// Length of every encoded key.
pub const ENCODED_LEN: usize = 56;

const ACCOUNT_PREFIX: char = 'G';
const SEED_PREFIX: char = 'S';

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StrkeyError {
    #[error("expected {ENCODED_LEN} characters, got {0}")]
    InvalidLength(usize),

    #[error("unexpected key type")]
    WrongVersion,

    #[error("malformed strkey: {0}")]
    Malformed(#[from] DecodeError),
}

/// Length and version checks the codec folds into one opaque error.
fn check_shape(encoded: &str, prefix: char) -> Result<(), StrkeyError> {
    if encoded.len() != ENCODED_LEN {
        return Err(StrkeyError::InvalidLength(encoded.len()));
    }
    match encoded.chars().next() {
        Some(c) if c == prefix => Ok(()),
        _ => Err(StrkeyError::WrongVersion),
    }
}

/// Encode a public key as a `G…` account id.
pub fn encode_account_id(public_key: &PublicKey) -> AccountAddress {
    AccountAddress::new(ed25519::PublicKey(*public_key.as_bytes()).to_string())
}

/// Decode a `G…` account id back into its public key.
pub fn decode_account_id(address: &str) -> Result<PublicKey, StrkeyError> {
    check_shape(address, ACCOUNT_PREFIX)?;
    let decoded = ed25519::PublicKey::from_string(address)?;
    Ok(PublicKey(decoded.0))
}

/// Validate that an address string is a well-formed account id.
pub fn validate_account_id(address: &str) -> bool {
    decode_account_id(address).is_ok()
}

/// Encode a secret seed as an `S…` strkey.
pub fn encode_secret_seed(seed: &SecretSeed) -> String {
    let mut key = ed25519::PrivateKey(*seed.as_bytes());
    let encoded = key.to_string();
    key.0.zeroize();
    encoded
}

/// Decode an `S…` strkey into a secret seed.
pub fn decode_secret_seed(encoded: &str) -> Result<SecretSeed, StrkeyError> {
    check_shape(encoded, SEED_PREFIX)?;
    let mut key = ed25519::PrivateKey::from_string(encoded)?;
    let seed = SecretSeed(key.0);
    key.0.zeroize();
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Published strkey test vector.
    const KNOWN_ACCOUNT: &str = "GA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQHES5";

    #[test]
    fn decodes_known_account_id() {
        let key = decode_account_id(KNOWN_ACCOUNT).unwrap();
        assert_eq!(encode_account_id(&key).as_str(), KNOWN_ACCOUNT);
    }

    #[test]
    fn account_and_seed_prefixes() {
        let payload = [7u8; 32];
        assert!(encode_account_id(&PublicKey(payload)).as_str().starts_with('G'));
        assert!(encode_secret_seed(&SecretSeed(payload)).starts_with('S'));
        assert_eq!(encode_account_id(&PublicKey(payload)).as_str().len(), ENCODED_LEN);
    }

    #[test]
    fn seed_is_not_an_account_id() {
        let seed = encode_secret_seed(&SecretSeed([9u8; 32]));
        assert_eq!(decode_account_id(&seed), Err(StrkeyError::WrongVersion));
        assert!(decode_secret_seed(&seed).is_ok());
        assert_eq!(
            decode_secret_seed(KNOWN_ACCOUNT).map(|s| s.0),
            Err(StrkeyError::WrongVersion)
        );
    }

    #[test]
    fn checksum_detects_single_char_change() {
        let mut bad = KNOWN_ACCOUNT.to_string();
        let last = bad.pop().unwrap();
        bad.push(if last == 'A' { 'B' } else { 'A' });
        assert!(matches!(decode_account_id(&bad), Err(StrkeyError::Malformed(_))));
    }

    #[test]
    fn rejects_wrong_length_and_alphabet() {
        assert_eq!(decode_account_id("GABC"), Err(StrkeyError::InvalidLength(4)));
        let mut lower = KNOWN_ACCOUNT.to_lowercase();
        lower.replace_range(..1, "G");
        assert!(matches!(decode_account_id(&lower), Err(StrkeyError::Malformed(_))));
        assert!(!validate_account_id(""));
    }
}
