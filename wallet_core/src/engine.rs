//! The wallet engine: one record, one bound ledger client.
//!
//! [`WalletEngine`] owns the [`WalletRecord`] and the client bound to the
//! record's network. Every state-changing operation takes `&mut self` and
//! persists the record before returning. Wrap the engine in
//! [`SharedWalletEngine`] to share it between tasks.

use std::sync::Arc;

use stellar_wallet_crypto::decode_account_id;
use stellar_wallet_types::{AccountAddress, NativeAmount, Network};
use tracing::{info, warn};

use crate::balance::{self, BalanceSummary};
use crate::client::{HorizonBinder, LedgerApi, LedgerBinder};
use crate::clock::{Clock, SystemClock};
use crate::config::WalletConfig;
use crate::error::AccountRole;
use crate::faucet::{FriendbotClient, FundingService};
use crate::history::{self, TransactionHistory};
use crate::record::{LoadedRecord, RecordStore, WalletRecord};
use crate::transaction_builder::{build_payment, sign_transaction, text_memo, PaymentParams};
use crate::WalletError;

/// An engine shared between tasks; operations run one at a time.
pub type SharedWalletEngine = Arc<tokio::sync::Mutex<WalletEngine>>;

/// External collaborators of the engine.
#[derive(Clone)]
pub struct WalletServices {
    pub binder: Arc<dyn LedgerBinder>,
    pub faucet: Arc<dyn FundingService>,
    pub clock: Arc<dyn Clock>,
}

impl WalletServices {
    /// Horizon, Friendbot, and the system clock, as configured.
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        Ok(Self {
            binder: Arc::new(HorizonBinder::from_config(config)?),
            faucet: Arc::new(FriendbotClient::from_config(config)?),
            clock: Arc::new(SystemClock),
        })
    }
}

/// How the engine came up.
#[derive(Debug)]
pub enum StartupReport {
    /// An existing record was loaded.
    Loaded,
    /// A new record was created and persisted.
    Created { funding: FundingOutcome },
}

/// Result of the funding request made when a wallet is created.
#[derive(Debug)]
pub enum FundingOutcome {
    Funded,
    /// Funding failed. The wallet was still created.
    Failed(WalletError),
}

/// A payment as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentRequest {
    pub destination: String,
    /// Decimal amount in native units, e.g. `"10.5"`.
    pub amount: String,
    pub memo: Option<String>,
}

impl PaymentRequest {
    pub fn new(destination: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            amount: amount.into(),
            memo: None,
        }
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }
}

/// Outcome of an accepted payment.
#[derive(Debug)]
pub struct SendReceipt {
    /// Hash reported by the ledger.
    pub hash: String,
    pub ledger: Option<u64>,
    /// The balance refresh run after submission. Its failure does not undo
    /// the payment.
    pub refresh: Result<BalanceSummary, WalletError>,
}

pub struct WalletEngine {
    record: WalletRecord,
    store: RecordStore,
    client: Box<dyn LedgerApi>,
    services: WalletServices,
}

impl WalletEngine {
    /// Load the record at `store`, or create, fund, and persist a new one.
    ///
    /// A corrupt record is fatal. Funding failure is not: it is reported in
    /// [`StartupReport::Created`].
    pub async fn load_or_create(
        store: RecordStore,
        services: WalletServices,
    ) -> Result<(Self, StartupReport), WalletError> {
        let (record, report) = match store.load()? {
            LoadedRecord::Existing(record) => {
                info!(address = %record.address(), network = %record.network, "wallet loaded");
                (record, StartupReport::Loaded)
            }
            LoadedRecord::Missing => {
                let record = WalletRecord::generate();
                let address = record.address();
                info!(%address, network = %record.network, "new wallet created");

                let funding = match services.faucet.fund(record.network, &address).await {
                    Ok(()) => FundingOutcome::Funded,
                    Err(e) => {
                        warn!(%address, error = %e, "funding of new wallet failed");
                        FundingOutcome::Failed(e)
                    }
                };
                store.save(&record)?;
                (record, StartupReport::Created { funding })
            }
        };

        let client = services.binder.bind(record.network);
        Ok((
            Self {
                record,
                store,
                client,
                services,
            },
            report,
        ))
    }

    pub fn into_shared(self) -> SharedWalletEngine {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn record(&self) -> &WalletRecord {
        &self.record
    }

    pub fn address(&self) -> AccountAddress {
        self.record.address()
    }

    pub fn network(&self) -> Network {
        self.record.network
    }

    pub fn cached_balance(&self) -> &str {
        &self.record.cached_balance
    }

    /// Select `network`, persist the choice, and rebind the client.
    ///
    /// Switching to the current network is a no-op apart from the save.
    pub async fn switch_network(&mut self, network: Network) -> Result<(), WalletError> {
        let previous = std::mem::replace(&mut self.record.network, network);
        if let Err(e) = self.store.save(&self.record) {
            self.record.network = previous;
            return Err(e);
        }
        self.client = self.services.binder.bind(network);
        if previous != network {
            info!(from = %previous, to = %network, "network switched");
        }
        Ok(())
    }

    /// Fetch the native balance and cache it in the record.
    pub async fn refresh_balance(&mut self) -> Result<BalanceSummary, WalletError> {
        let summary = balance::refresh(self.client.as_ref(), &self.record.address()).await?;
        if let BalanceSummary::Funded { balance } = &summary {
            if *balance != self.record.cached_balance {
                let previous = std::mem::replace(&mut self.record.cached_balance, balance.clone());
                if let Err(e) = self.store.save(&self.record) {
                    self.record.cached_balance = previous;
                    return Err(e);
                }
            }
        }
        Ok(summary)
    }

    /// Build, sign, and submit one native payment, then refresh the balance.
    ///
    /// Checks run in order and each stops the send before anything is
    /// submitted: empty fields, memo length, destination format, destination
    /// existence, source existence, amount.
    pub async fn send_payment(
        &mut self,
        request: PaymentRequest,
    ) -> Result<SendReceipt, WalletError> {
        let destination = request.destination.trim();
        let amount = request.amount.trim();
        if destination.is_empty() {
            return Err(WalletError::InvalidInput("destination is required".into()));
        }
        if amount.is_empty() {
            return Err(WalletError::InvalidInput("amount is required".into()));
        }
        let memo = request.memo.as_deref();
        text_memo(memo)?;

        let destination_key = decode_account_id(destination).map_err(|e| {
            WalletError::InvalidInput(format!("destination is not an account id: {e}"))
        })?;
        let destination = AccountAddress::new(destination);

        if self.client.account(&destination).await?.is_none() {
            return Err(WalletError::AccountNotFound {
                role: AccountRole::Destination,
                address: destination.to_string(),
            });
        }

        let source = self.record.address();
        let Some(source_account) = self.client.account(&source).await? else {
            return Err(WalletError::AccountNotFound {
                role: AccountRole::Source,
                address: source.to_string(),
            });
        };

        let amount = amount
            .parse::<NativeAmount>()
            .map_err(|e| WalletError::InvalidAmount(e.to_string()))?;

        let tx = build_payment(&PaymentParams {
            source: self.record.keys().public(),
            source_sequence: source_account.sequence,
            destination: &destination_key,
            amount,
            memo,
            now: self.services.clock.now(),
        })?;
        let signed = sign_transaction(tx, self.record.keys(), self.client.network())?;
        let envelope = signed.to_base64()?;

        info!(%destination, %amount, hash = %signed.hash, "submitting payment");
        let outcome = self.client.submit(&envelope).await?;
        info!(hash = %outcome.hash, ledger = ?outcome.ledger, "payment accepted");

        let refresh = self.refresh_balance().await;
        if let Err(e) = &refresh {
            warn!(error = %e, "balance refresh after payment failed");
        }

        Ok(SendReceipt {
            hash: outcome.hash,
            ledger: outcome.ledger,
            refresh,
        })
    }

    /// Fetch up to `limit` recent transactions, newest first.
    pub async fn list_history(&self, limit: u32) -> Result<TransactionHistory, WalletError> {
        history::list(self.client.as_ref(), &self.record.address(), limit).await
    }
}
