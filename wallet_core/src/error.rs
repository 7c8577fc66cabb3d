use std::fmt;

use thiserror::Error;

/// Which side of a payment an account lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountRole {
    Source,
    Destination,
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source => f.write_str("source"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("wallet record is corrupt: {0}")]
    Deserialization(String),

    #[error("{operation} failed: network unreachable: {reason}")]
    NetworkUnreachable {
        operation: &'static str,
        reason: String,
    },

    #[error("{operation} failed: unexpected response: {reason}")]
    InvalidResponse {
        operation: &'static str,
        reason: String,
    },

    #[error("{role} account {address} does not exist on the ledger")]
    AccountNotFound { role: AccountRole, address: String },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("memo is {len} bytes, the limit is {max}")]
    MemoTooLong { len: usize, max: usize },

    #[error("transaction rejected by the network: {reason}")]
    SubmissionFailure { reason: String },

    #[error("funding request rejected with HTTP {status}")]
    FundingRejected { status: u16 },

    #[error("funding is only available on the test network")]
    TestnetOnly,

    #[error("transaction encoding error: {0}")]
    Encoding(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl WalletError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn unreachable(operation: &'static str, reason: impl fmt::Display) -> Self {
        Self::NetworkUnreachable {
            operation,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn invalid_response(operation: &'static str, reason: impl fmt::Display) -> Self {
        Self::InvalidResponse {
            operation,
            reason: reason.to_string(),
        }
    }
}
