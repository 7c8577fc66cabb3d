//! Recent transaction listing.

use stellar_wallet_types::amount::format_stroops;
use stellar_wallet_types::AccountAddress;

use crate::client::{LedgerApi, LedgerTransaction, MAX_PAGE_LIMIT};
use crate::WalletError;

/// Number of entries listed when the caller does not choose.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// One transaction in an account's history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxSummary {
    pub hash: String,
    /// Close time of the ledger that included the transaction.
    pub ledger_close_time: String,
    /// Fee charged, in stroops.
    pub fee_charged: i64,
}

impl TxSummary {
    /// Fee rendered in native units, e.g. `0.0000100`.
    pub fn fee_display(&self) -> String {
        format_stroops(self.fee_charged)
    }
}

impl From<LedgerTransaction> for TxSummary {
    fn from(tx: LedgerTransaction) -> Self {
        Self {
            hash: tx.hash,
            ledger_close_time: tx.created_at,
            fee_charged: tx.fee_charged,
        }
    }
}

/// A single fetched page of history, most recent first.
///
/// Consumed once; iterating again requires another fetch.
#[derive(Debug)]
pub struct TransactionHistory {
    entries: std::vec::IntoIter<TxSummary>,
}

impl TransactionHistory {
    fn new(entries: Vec<TxSummary>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

impl Iterator for TransactionHistory {
    type Item = TxSummary;

    fn next(&mut self) -> Option<TxSummary> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl ExactSizeIterator for TransactionHistory {}

/// Fetch up to `limit` recent transactions for `address`.
///
/// `limit` must be at least 1 and is capped at the server's page maximum.
pub async fn list(
    client: &dyn LedgerApi,
    address: &AccountAddress,
    limit: u32,
) -> Result<TransactionHistory, WalletError> {
    if limit == 0 {
        return Err(WalletError::InvalidInput(
            "history limit must be at least 1".into(),
        ));
    }
    let limit = limit.min(MAX_PAGE_LIMIT);
    let entries = client
        .transactions(address, limit)
        .await?
        .into_iter()
        .take(limit as usize)
        .map(TxSummary::from)
        .collect();
    Ok(TransactionHistory::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{AccountSnapshot, SubmitOutcome};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use stellar_wallet_types::Network;

    /// Returns more records than asked for, to check truncation.
    struct ChattyLedger {
        requested: AtomicU32,
    }

    #[async_trait]
    impl LedgerApi for ChattyLedger {
        fn network(&self) -> Network {
            Network::Test
        }

        async fn account(
            &self,
            _address: &AccountAddress,
        ) -> Result<Option<AccountSnapshot>, WalletError> {
            Ok(None)
        }

        async fn transactions(
            &self,
            _address: &AccountAddress,
            limit: u32,
        ) -> Result<Vec<LedgerTransaction>, WalletError> {
            self.requested.store(limit, Ordering::SeqCst);
            Ok((0..limit + 3)
                .map(|i| LedgerTransaction {
                    hash: format!("{i:064x}"),
                    created_at: "2024-01-01T00:00:00Z".into(),
                    fee_charged: 100,
                })
                .collect())
        }

        async fn submit(&self, _envelope_xdr: &str) -> Result<SubmitOutcome, WalletError> {
            unreachable!("history never submits")
        }
    }

    fn ledger() -> ChattyLedger {
        ChattyLedger {
            requested: AtomicU32::new(0),
        }
    }

    fn address() -> AccountAddress {
        AccountAddress::new(format!("G{}", "B".repeat(55)))
    }

    #[tokio::test]
    async fn truncates_to_limit() {
        let ledger = ledger();
        let history = list(&ledger, &address(), 5).await.unwrap();
        assert_eq!(history.len(), 5);
        let hashes: Vec<_> = history.map(|tx| tx.hash).collect();
        assert_eq!(hashes[0], format!("{:064x}", 0));
    }

    #[tokio::test]
    async fn zero_limit_rejected_without_request() {
        let ledger = ledger();
        let err = list(&ledger, &address(), 0).await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidInput(_)));
        assert_eq!(ledger.requested.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn limit_capped_at_page_maximum() {
        let ledger = ledger();
        let history = list(&ledger, &address(), 10_000).await.unwrap();
        assert_eq!(ledger.requested.load(Ordering::SeqCst), MAX_PAGE_LIMIT);
        assert_eq!(history.len(), MAX_PAGE_LIMIT as usize);
    }

    #[test]
    fn fee_display_in_native_units() {
        let tx = TxSummary {
            hash: "ab".into(),
            ledger_close_time: "2024-01-01T00:00:00Z".into(),
            fee_charged: 100,
        };
        assert_eq!(tx.fee_display(), "0.0000100");
    }
}
