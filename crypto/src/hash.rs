//! SHA-256 hashing for network ids and transaction hashes.

use sha2::{Digest, Sha256};
use stellar_wallet_types::Network;

/// Compute the SHA-256 digest of arbitrary data.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// The network id: SHA-256 of the network passphrase.
///
/// Mixed into every signature payload, so a signature made for one network
/// never verifies on another.
pub fn network_id(network: Network) -> [u8; 32] {
    sha256(network.passphrase().as_bytes())
}
