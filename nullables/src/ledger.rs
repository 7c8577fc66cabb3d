//! Nullable ledger — two in-memory networks that validate and apply payments.
//!
//! Each network keeps its own accounts and transaction log. Submissions are
//! checked the way a real ledger checks them: the source must exist, the
//! time-bounds and fee must be acceptable, the sequence number must be the
//! account's next one, and a signature must verify against the hash computed
//! with *this* network's passphrase. Rejected submissions change nothing.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use stellar_wallet_core::transaction_builder::{
    decode_envelope, transaction_hash, BASE_FEE_STROOPS,
};
use stellar_wallet_core::{
    AccountSnapshot, BalanceLine, Clock, LedgerApi, LedgerBinder, LedgerTransaction,
    SubmitOutcome, WalletError,
};
use stellar_wallet_crypto::{encode_account_id, verify_signature};
use stellar_wallet_types::amount::format_stroops;
use stellar_wallet_types::{AccountAddress, Network, PublicKey, Signature};
use stellar_xdr::curr::{
    Asset, DecoratedSignature, MuxedAccount, OperationBody, Preconditions, TransactionEnvelope,
};

use crate::clock::NullClock;

/// Clock reading used by [`NullLedgerNetwork::new`] (2023-11-14T22:13:20Z).
pub const DEFAULT_TIME: u64 = 1_700_000_000;

/// One call to `submit`, accepted or not.
#[derive(Debug, Clone)]
pub struct SubmissionRecord {
    pub network: Network,
    /// `None` when the payload did not decode.
    pub envelope: Option<TransactionEnvelope>,
    /// Transaction hash on acceptance, the rejection reason otherwise.
    pub result: Result<String, String>,
}

#[derive(Debug)]
struct AccountEntry {
    sequence: i64,
    /// Native balance in stroops; `None` for an account without a native line.
    native: Option<i64>,
}

#[derive(Debug)]
struct TxEntry {
    hash: String,
    participants: Vec<AccountAddress>,
    close_time: u64,
    fee_charged: i64,
}

#[derive(Debug)]
struct LedgerState {
    accounts: HashMap<AccountAddress, AccountEntry>,
    /// Applied transactions, oldest first.
    transactions: Vec<TxEntry>,
    ledger_seq: u64,
}

impl LedgerState {
    fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            transactions: Vec::new(),
            ledger_seq: 2,
        }
    }

    /// New accounts start at sequence `ledger << 32`, as on the real ledger.
    fn starting_sequence(&self) -> i64 {
        (self.ledger_seq as i64) << 32
    }

    fn apply(
        &mut self,
        envelope: &TransactionEnvelope,
        network: Network,
        now: u64,
    ) -> Result<SubmitOutcome, String> {
        let TransactionEnvelope::Tx(v1) = envelope else {
            return Err("tx_not_supported".into());
        };
        let tx = &v1.tx;

        let source_key = muxed_key(&tx.source_account);
        let source = encode_account_id(&source_key);
        let (sequence, available) = match self.accounts.get(&source) {
            Some(entry) => (entry.sequence, entry.native.unwrap_or(0)),
            None => return Err("tx_no_source_account".into()),
        };

        if let Preconditions::Time(bounds) = &tx.cond {
            if bounds.max_time.0 != 0 && now > bounds.max_time.0 {
                return Err("tx_too_late".into());
            }
            if now < bounds.min_time.0 {
                return Err("tx_too_early".into());
            }
        }

        let op_count = tx.operations.len() as u32;
        if tx.fee < BASE_FEE_STROOPS.saturating_mul(op_count.max(1)) {
            return Err("tx_insufficient_fee".into());
        }
        if Some(tx.seq_num.0) != sequence.checked_add(1) {
            return Err("tx_bad_seq".into());
        }

        let hash = transaction_hash(tx, network).map_err(|_| "tx_malformed".to_string())?;
        let authorized = v1
            .signatures
            .iter()
            .any(|decorated| signed_by(decorated, &source_key, hash.as_bytes()));
        if !authorized {
            return Err("tx_bad_auth".into());
        }

        let fee = i64::from(tx.fee);
        let mut debit = fee;
        let mut credits = Vec::with_capacity(tx.operations.len());
        for op in tx.operations.iter() {
            let OperationBody::Payment(payment) = &op.body else {
                return Err("tx_failed: op_not_supported".into());
            };
            if payment.asset != Asset::Native {
                return Err("tx_failed: op_not_supported".into());
            }
            if payment.amount <= 0 {
                return Err("tx_failed: op_malformed".into());
            }
            let destination = encode_account_id(&muxed_key(&payment.destination));
            if !self.accounts.contains_key(&destination) {
                return Err("tx_failed: op_no_destination".into());
            }
            debit = debit.saturating_add(payment.amount);
            credits.push((destination, payment.amount));
        }
        if debit > available {
            return Err("tx_failed: op_underfunded".into());
        }

        self.ledger_seq += 1;
        if let Some(entry) = self.accounts.get_mut(&source) {
            entry.sequence = tx.seq_num.0;
            entry.native = Some(available - debit);
        }
        let mut participants = vec![source];
        for (destination, amount) in credits {
            if let Some(entry) = self.accounts.get_mut(&destination) {
                entry.native = Some(entry.native.unwrap_or(0) + amount);
            }
            participants.push(destination);
        }

        let hash = hash.to_hex();
        self.transactions.push(TxEntry {
            hash: hash.clone(),
            participants,
            close_time: now,
            fee_charged: fee,
        });
        Ok(SubmitOutcome {
            hash,
            ledger: Some(self.ledger_seq),
        })
    }
}

fn muxed_key(account: &MuxedAccount) -> PublicKey {
    match account {
        MuxedAccount::Ed25519(key) => PublicKey(key.0),
        MuxedAccount::MuxedEd25519(muxed) => PublicKey(muxed.ed25519.0),
    }
}

fn signed_by(decorated: &DecoratedSignature, key: &PublicKey, message: &[u8]) -> bool {
    if decorated.hint.0 != key.signature_hint() {
        return false;
    }
    match <[u8; 64]>::try_from(decorated.signature.0.to_vec()) {
        Ok(raw) => verify_signature(message, &Signature(raw), key),
        Err(_) => false,
    }
}

struct State {
    ledgers: HashMap<Network, LedgerState>,
    unreachable: bool,
    disconnect_after_submit: bool,
    requests: usize,
    submissions: Vec<SubmissionRecord>,
}

impl State {
    fn ledger(&mut self, network: Network) -> &mut LedgerState {
        self.ledgers.entry(network).or_insert_with(LedgerState::new)
    }

    /// Count a request and fail it if the network is "down".
    fn request(&mut self, operation: &'static str) -> Result<(), WalletError> {
        self.requests += 1;
        if self.unreachable {
            return Err(WalletError::NetworkUnreachable {
                operation,
                reason: "simulated outage".into(),
            });
        }
        Ok(())
    }
}

/// In-memory test and production ledgers sharing one clock.
///
/// Cloning yields another handle to the same ledgers.
#[derive(Clone)]
pub struct NullLedgerNetwork {
    state: Arc<Mutex<State>>,
    clock: Arc<NullClock>,
}

impl NullLedgerNetwork {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(NullClock::new(DEFAULT_TIME)))
    }

    pub fn with_clock(clock: Arc<NullClock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                ledgers: HashMap::new(),
                unreachable: false,
                disconnect_after_submit: false,
                requests: 0,
                submissions: Vec::new(),
            })),
            clock,
        }
    }

    /// The clock the ledgers check time-bounds against.
    pub fn clock(&self) -> Arc<NullClock> {
        Arc::clone(&self.clock)
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create (or replace) an account holding `stroops` of the native asset.
    pub fn create_account(&self, network: Network, address: &AccountAddress, stroops: i64) {
        let mut state = self.state();
        let ledger = state.ledger(network);
        let sequence = ledger.starting_sequence();
        ledger.accounts.insert(
            address.clone(),
            AccountEntry {
                sequence,
                native: Some(stroops),
            },
        );
    }

    /// Create an account that reports no native balance line.
    pub fn create_account_without_native(&self, network: Network, address: &AccountAddress) {
        let mut state = self.state();
        let ledger = state.ledger(network);
        let sequence = ledger.starting_sequence();
        ledger.accounts.insert(
            address.clone(),
            AccountEntry {
                sequence,
                native: None,
            },
        );
    }

    pub fn account_exists(&self, network: Network, address: &AccountAddress) -> bool {
        self.state().ledger(network).accounts.contains_key(address)
    }

    pub fn sequence(&self, network: Network, address: &AccountAddress) -> Option<i64> {
        self.state()
            .ledger(network)
            .accounts
            .get(address)
            .map(|a| a.sequence)
    }

    /// Native balance in stroops.
    pub fn native_balance(&self, network: Network, address: &AccountAddress) -> Option<i64> {
        self.state()
            .ledger(network)
            .accounts
            .get(address)
            .and_then(|a| a.native)
    }

    /// Make every request fail as unreachable (or succeed again).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state().unreachable = unreachable;
    }

    /// Go unreachable right after the next accepted submission.
    pub fn disconnect_after_next_submit(&self) {
        self.state().disconnect_after_submit = true;
    }

    /// Number of ledger requests received, on either network.
    pub fn request_count(&self) -> usize {
        self.state().requests
    }

    /// Every submission received, in order.
    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.state().submissions.clone()
    }

    fn lookup(
        &self,
        network: Network,
        address: &AccountAddress,
    ) -> Result<Option<AccountSnapshot>, WalletError> {
        let mut state = self.state();
        state.request("account lookup")?;
        Ok(state.ledger(network).accounts.get(address).map(|entry| {
            let balances = match entry.native {
                Some(stroops) => vec![BalanceLine {
                    asset_type: "native".into(),
                    balance: format_stroops(stroops),
                }],
                None => vec![BalanceLine {
                    asset_type: "credit_alphanum4".into(),
                    balance: format_stroops(0),
                }],
            };
            AccountSnapshot {
                address: address.clone(),
                sequence: entry.sequence,
                balances,
            }
        }))
    }

    fn list(
        &self,
        network: Network,
        address: &AccountAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, WalletError> {
        let mut state = self.state();
        state.request("transaction listing")?;
        Ok(state
            .ledger(network)
            .transactions
            .iter()
            .rev()
            .filter(|tx| tx.participants.contains(address))
            .take(limit as usize)
            .map(|tx| LedgerTransaction {
                hash: tx.hash.clone(),
                created_at: rfc3339(tx.close_time),
                fee_charged: tx.fee_charged,
            })
            .collect())
    }

    fn accept(&self, network: Network, envelope_xdr: &str) -> Result<SubmitOutcome, WalletError> {
        let now = self.clock.now().as_secs();
        let mut state = self.state();
        state.request("transaction submission")?;

        let envelope = decode_envelope(envelope_xdr).ok();
        let result = match &envelope {
            Some(envelope) => state.ledger(network).apply(envelope, network, now),
            None => Err("tx_malformed".to_string()),
        };
        state.submissions.push(SubmissionRecord {
            network,
            envelope,
            result: result.as_ref().map(|o| o.hash.clone()).map_err(Clone::clone),
        });
        if result.is_ok() && state.disconnect_after_submit {
            state.disconnect_after_submit = false;
            state.unreachable = true;
        }
        result.map_err(|reason| WalletError::SubmissionFailure { reason })
    }
}

impl Default for NullLedgerNetwork {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerBinder for NullLedgerNetwork {
    fn bind(&self, network: Network) -> Box<dyn LedgerApi> {
        Box::new(NullLedger {
            network,
            ledgers: self.clone(),
        })
    }
}

/// A client bound to one of the in-memory ledgers.
pub struct NullLedger {
    network: Network,
    ledgers: NullLedgerNetwork,
}

#[async_trait]
impl LedgerApi for NullLedger {
    fn network(&self) -> Network {
        self.network
    }

    async fn account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<AccountSnapshot>, WalletError> {
        self.ledgers.lookup(self.network, address)
    }

    async fn transactions(
        &self,
        address: &AccountAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, WalletError> {
        self.ledgers.list(self.network, address, limit)
    }

    async fn submit(&self, envelope_xdr: &str) -> Result<SubmitOutcome, WalletError> {
        self.ledgers.accept(self.network, envelope_xdr)
    }
}

/// `YYYY-MM-DDTHH:MM:SSZ` for a Unix time, as Horizon renders `created_at`.
fn rfc3339(secs: u64) -> String {
    let secs = i64::try_from(secs).unwrap_or(i64::MAX);
    DateTime::<Utc>::from_timestamp(secs, 0)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}
