//! Ed25519 key pair ownership.

use std::fmt;

use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use stellar_wallet_types::{AccountAddress, PublicKey, SecretSeed, Signature};
use zeroize::Zeroizing;

use crate::strkey::{self, StrkeyError};

/// The wallet's key pair.
///
/// The public key is always derived from the secret seed at construction, so
/// the two can never drift apart. The seed never leaves this type except as a
/// zeroizing strkey string for persistence, and `Debug` redacts it.
pub struct KeyPair {
    public: PublicKey,
    secret: SecretSeed,
}

impl KeyPair {
    /// Generate a new key pair from a secure random source.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_seed(SecretSeed(signing_key.to_bytes()))
    }

    /// Reconstruct the key pair from a 32-byte seed (deterministic).
    pub fn from_seed(secret: SecretSeed) -> Self {
        let signing_key = SigningKey::from_bytes(secret.as_bytes());
        let public = PublicKey(signing_key.verifying_key().to_bytes());
        Self { public, secret }
    }

    /// Reconstruct the key pair from an `S…` secret seed string.
    pub fn from_secret_strkey(encoded: &str) -> Result<Self, StrkeyError> {
        strkey::decode_secret_seed(encoded).map(Self::from_seed)
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }

    /// The `G…` account id of this key pair.
    pub fn address(&self) -> AccountAddress {
        strkey::encode_account_id(&self.public)
    }

    /// The `S…` seed, wiped from memory when dropped.
    pub fn secret_strkey(&self) -> Zeroizing<String> {
        Zeroizing::new(strkey::encode_secret_seed(&self.secret))
    }

    /// Display form of the seed: the type prefix followed by a full-length mask.
    pub fn masked_secret(&self) -> String {
        format!("S{}", "*".repeat(strkey::ENCODED_LEN - 1))
    }

    /// Sign a message with the secret seed.
    pub fn sign(&self, message: &[u8]) -> Signature {
        crate::sign::sign_message(message, &self.secret)
    }
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public == other.public && self.secret.as_bytes() == other.secret.as_bytes()
    }
}

impl Eq for KeyPair {}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address().as_str())
            .field("secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_keys() {
        let kp1 = KeyPair::generate();
        let kp2 = KeyPair::generate();
        assert_ne!(kp1.public(), kp2.public());
        assert_ne!(kp1.public().0, [0u8; 32]);
    }

    #[test]
    fn address_is_derived_from_secret() {
        let kp = KeyPair::generate();
        let restored = KeyPair::from_secret_strkey(&kp.secret_strkey()).unwrap();
        assert_eq!(restored.address(), kp.address());
        assert_eq!(restored, kp);
    }

    #[test]
    fn from_seed_is_deterministic() {
        let kp1 = KeyPair::from_seed(SecretSeed([42u8; 32]));
        let kp2 = KeyPair::from_seed(SecretSeed([42u8; 32]));
        assert_eq!(kp1.address(), kp2.address());
    }

    #[test]
    fn rejects_account_id_as_seed() {
        let kp = KeyPair::generate();
        assert!(KeyPair::from_secret_strkey(kp.address().as_str()).is_err());
    }

    #[test]
    fn debug_and_mask_hide_secret() {
        let kp = KeyPair::generate();
        let secret = kp.secret_strkey();
        let debug = format!("{kp:?}");
        assert!(!debug.contains(secret.as_str()));
        assert!(debug.contains("<redacted>"));

        let masked = kp.masked_secret();
        assert_eq!(masked.len(), secret.len());
        assert_ne!(masked, *secret);
        assert!(masked.starts_with('S'));
    }
}
