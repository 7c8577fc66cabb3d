//! Network selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// Passphrase of the public test network.
pub const TEST_NETWORK_PASSPHRASE: &str = "Test SDF Network ; September 2015";
/// Passphrase of the production network.
pub const PUBLIC_NETWORK_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// Identifies which ledger the wallet is bound to.
///
/// Serialized as `"testnet"` / `"public"` in the wallet record file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// The public test network (Friendbot-funded).
    #[default]
    #[serde(rename = "testnet")]
    Test,
    /// The production network.
    #[serde(rename = "public")]
    Production,
}

impl Network {
    /// The passphrase mixed into every transaction signature for this network.
    pub fn passphrase(&self) -> &'static str {
        match self {
            Self::Test => TEST_NETWORK_PASSPHRASE,
            Self::Production => PUBLIC_NETWORK_PASSPHRASE,
        }
    }

    /// Human-readable name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "testnet",
            Self::Production => "public",
        }
    }

    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "testnet" | "test" => Ok(Self::Test),
            "public" | "production" | "mainnet" | "pubnet" => Ok(Self::Production),
            other => Err(TypesError::UnknownNetwork(other.to_string())),
        }
    }
}
