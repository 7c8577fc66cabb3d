//! Fundamental types for the Stellar wallet engine.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, key material, native amounts, network selection, hashes
//! and timestamps.

pub mod address;
pub mod amount;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod time;

pub use address::AccountAddress;
pub use amount::NativeAmount;
pub use error::TypesError;
pub use hash::TxHash;
pub use keys::{PublicKey, SecretSeed, Signature};
pub use network::Network;
pub use time::Timestamp;
