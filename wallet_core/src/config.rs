//! Wallet configuration with TOML file support.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stellar_wallet_types::Network;
use stellar_wallet_utils::LogFormat;

use crate::WalletError;

/// Configuration for the wallet engine and its network endpoints.
///
/// Can be loaded from a TOML file via [`WalletConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). Every field has a default, so an
/// empty file is a valid configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalletConfig {
    /// Directory holding the wallet record file.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// File name of the wallet record inside `data_dir`.
    #[serde(default = "default_wallet_file")]
    pub wallet_file: String,

    /// Horizon endpoint for the test network.
    #[serde(default = "default_testnet_horizon_url")]
    pub testnet_horizon_url: String,

    /// Horizon endpoint for the production network.
    #[serde(default = "default_public_horizon_url")]
    pub public_horizon_url: String,

    /// Friendbot endpoint (test network only).
    #[serde(default = "default_friendbot_url")]
    pub friendbot_url: String,

    /// Upper bound on a whole HTTP request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Upper bound on establishing a connection, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Number of entries `history` fetches when no limit is given.
    #[serde(default = "default_history_limit")]
    pub default_history_limit: u32,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_wallet_file() -> String {
    "stellar_wallet.json".to_string()
}

fn default_testnet_horizon_url() -> String {
    "https://horizon-testnet.stellar.org".to_string()
}

fn default_public_horizon_url() -> String {
    "https://horizon.stellar.org".to_string()
}

fn default_friendbot_url() -> String {
    "https://friendbot.stellar.org".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_history_limit() -> u32 {
    crate::history::DEFAULT_HISTORY_LIMIT
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl WalletConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, WalletError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| WalletError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, WalletError> {
        let config: Self = toml::from_str(s).map_err(|e| WalletError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but leave the wallet unusable.
    ///
    /// A zero timeout expires every request immediately.
    pub fn validate(&self) -> Result<(), WalletError> {
        if self.request_timeout_secs == 0 {
            return Err(WalletError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.connect_timeout_secs == 0 {
            return Err(WalletError::Config(
                "connect_timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, WalletError> {
        toml::to_string_pretty(self).map_err(|e| WalletError::Config(e.to_string()))
    }

    /// Full path of the wallet record file.
    pub fn wallet_path(&self) -> PathBuf {
        self.data_dir.join(&self.wallet_file)
    }

    /// Horizon endpoint for the given network.
    pub fn horizon_url(&self, network: Network) -> &str {
        match network {
            Network::Test => &self.testnet_horizon_url,
            Network::Production => &self.public_horizon_url,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            wallet_file: default_wallet_file(),
            testnet_horizon_url: default_testnet_horizon_url(),
            public_horizon_url: default_public_horizon_url(),
            friendbot_url: default_friendbot_url(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_history_limit: default_history_limit(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
        }
    }
}
