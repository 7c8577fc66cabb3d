//! Single-account Stellar wallet engine.
//!
//! Provides everything a wallet front end needs:
//! - Durable wallet record (key pair, network, cached balance)
//! - Ledger client binding for the test and production networks
//! - Friendbot funding of newly created wallets
//! - Native balance refresh and transaction history
//! - Payment building, signing, and submission

pub mod balance;
pub mod client;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod faucet;
pub mod history;
pub mod record;
pub mod transaction_builder;

#[cfg(test)]
mod test_server;

pub use balance::BalanceSummary;
pub use client::{
    AccountSnapshot, BalanceLine, HorizonBinder, HorizonClient, LedgerApi, LedgerBinder,
    LedgerTransaction, SubmitOutcome,
};
pub use clock::{Clock, SystemClock};
pub use config::WalletConfig;
pub use engine::{
    FundingOutcome, PaymentRequest, SendReceipt, SharedWalletEngine, StartupReport,
    WalletEngine, WalletServices,
};
pub use error::{AccountRole, WalletError};
pub use faucet::{FriendbotClient, FundingService};
pub use history::{TransactionHistory, TxSummary};
pub use record::{LoadedRecord, RecordStore, WalletRecord};
