//! Native balance lookup.

use stellar_wallet_types::AccountAddress;
use tracing::debug;

use crate::client::LedgerApi;
use crate::WalletError;

/// What the ledger says about an account's native balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceSummary {
    /// The account exists and holds this native balance (decimal string).
    Funded { balance: String },
    /// The account does not exist on the bound ledger yet.
    Unfunded,
    /// The account exists but reports no native balance line.
    NoNativeBalance,
}

impl BalanceSummary {
    pub fn balance(&self) -> Option<&str> {
        match self {
            Self::Funded { balance } => Some(balance),
            Self::Unfunded | Self::NoNativeBalance => None,
        }
    }
}

/// Query the current native balance of `address`.
///
/// An absent account is [`BalanceSummary::Unfunded`], not an error.
pub async fn refresh(
    client: &dyn LedgerApi,
    address: &AccountAddress,
) -> Result<BalanceSummary, WalletError> {
    let Some(account) = client.account(address).await? else {
        debug!(%address, network = %client.network(), "account not on ledger");
        return Ok(BalanceSummary::Unfunded);
    };
    Ok(match account.native_balance() {
        Some(balance) => BalanceSummary::Funded {
            balance: balance.to_string(),
        },
        None => BalanceSummary::NoNativeBalance,
    })
}
