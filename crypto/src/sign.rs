//! Ed25519 message signing and verification.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use stellar_wallet_types::{PublicKey, SecretSeed, Signature};

/// Sign a message with a secret seed, returning the signature.
pub fn sign_message(message: &[u8], secret: &SecretSeed) -> Signature {
    let signing_key = SigningKey::from_bytes(secret.as_bytes());
    let sig = signing_key.sign(message);
    Signature(sig.to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(public_key.as_bytes()) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    verifying_key.verify(message, &dalek_sig).is_ok()
}
