//! Nullable faucet — funds accounts on the in-memory test ledger.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use stellar_wallet_core::{FundingService, WalletError};
use stellar_wallet_types::amount::STROOPS_PER_UNIT;
use stellar_wallet_types::{AccountAddress, Network};

use crate::ledger::NullLedgerNetwork;

/// What Friendbot grants a new account: 10,000 XLM.
pub const GRANT_STROOPS: i64 = 10_000 * STROOPS_PER_UNIT;

#[derive(Debug, Clone, Copy)]
enum Failure {
    Rejected(u16),
    Unreachable,
}

/// A faucet that creates accounts on a [`NullLedgerNetwork`] test ledger.
///
/// Records every request, including refused ones.
pub struct NullFaucet {
    ledgers: NullLedgerNetwork,
    requests: Mutex<Vec<(Network, AccountAddress)>>,
    failure: Mutex<Option<Failure>>,
}

impl NullFaucet {
    pub fn new(ledgers: NullLedgerNetwork) -> Self {
        Self {
            ledgers,
            requests: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Answer every later request with this HTTP status.
    pub fn reject_with(&self, status: u16) {
        *lock(&self.failure) = Some(Failure::Rejected(status));
    }

    /// Fail every later request as a transport error.
    pub fn set_unreachable(&self) {
        *lock(&self.failure) = Some(Failure::Unreachable);
    }

    pub fn requests(&self) -> Vec<(Network, AccountAddress)> {
        lock(&self.requests).clone()
    }

    fn fund_now(&self, network: Network, address: &AccountAddress) -> Result<(), WalletError> {
        lock(&self.requests).push((network, address.clone()));
        if !network.is_test() {
            return Err(WalletError::TestnetOnly);
        }
        match *lock(&self.failure) {
            Some(Failure::Rejected(status)) => return Err(WalletError::FundingRejected { status }),
            Some(Failure::Unreachable) => {
                return Err(WalletError::NetworkUnreachable {
                    operation: "account funding",
                    reason: "simulated outage".into(),
                })
            }
            None => {}
        }
        // Friendbot refuses to fund an account twice.
        if self.ledgers.account_exists(Network::Test, address) {
            return Err(WalletError::FundingRejected { status: 400 });
        }
        self.ledgers.create_account(Network::Test, address, GRANT_STROOPS);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl FundingService for NullFaucet {
    async fn fund(&self, network: Network, address: &AccountAddress) -> Result<(), WalletError> {
        self.fund_now(network, address)
    }
}
