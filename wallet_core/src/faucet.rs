//! Test-network funding service (Friendbot).

use std::time::Duration;

use async_trait::async_trait;
use stellar_wallet_types::{AccountAddress, Network};
use tracing::{debug, info};

use crate::client::build_http;
use crate::config::WalletConfig;
use crate::WalletError;

/// Creates and funds a fresh account. Only meaningful on a test network.
#[async_trait]
pub trait FundingService: Send + Sync {
    async fn fund(&self, network: Network, address: &AccountAddress) -> Result<(), WalletError>;
}

/// HTTP client for the Friendbot faucet.
pub struct FriendbotClient {
    http: reqwest::Client,
    url: String,
}

impl FriendbotClient {
    pub fn new(
        url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, WalletError> {
        Ok(Self {
            http: build_http(request_timeout, connect_timeout)?,
            url: url.into(),
        })
    }

    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        Self::new(
            config.friendbot_url.clone(),
            config.request_timeout(),
            config.connect_timeout(),
        )
    }
}

#[async_trait]
impl FundingService for FriendbotClient {
    async fn fund(&self, network: Network, address: &AccountAddress) -> Result<(), WalletError> {
        if !network.is_test() {
            return Err(WalletError::TestnetOnly);
        }
        debug!(url = %self.url, %address, "friendbot request");

        let response = self
            .http
            .get(&self.url)
            .query(&[("addr", address.as_str())])
            .send()
            .await
            .map_err(|e| WalletError::unreachable("account funding", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WalletError::FundingRejected {
                status: status.as_u16(),
            });
        }
        info!(%address, "account funded by friendbot");
        Ok(())
    }
}
