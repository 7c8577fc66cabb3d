//! Cryptographic primitives for the Stellar wallet engine.
//!
//! - **Ed25519** for signing and signature verification
//! - **SHA-256** for network ids and transaction hashes
//! - **strkey** encoding for account ids (`G…`) and secret seeds (`S…`)

pub mod hash;
pub mod keys;
pub mod sign;
pub mod strkey;

pub use hash::{network_id, sha256};
pub use keys::KeyPair;
pub use sign::{sign_message, verify_signature};
pub use strkey::{
    decode_account_id, decode_secret_seed, encode_account_id, encode_secret_seed,
    validate_account_id, StrkeyError,
};
