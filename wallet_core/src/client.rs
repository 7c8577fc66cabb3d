//! Ledger client: account lookup, transaction listing, transaction submission.
//!
//! [`LedgerApi`] is the seam the engine talks to; [`HorizonClient`] is the
//! HTTP implementation against a Horizon server. A client is bound to exactly
//! one [`Network`]; [`LedgerBinder::bind`] selects the endpoint for a network
//! without doing any I/O.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use stellar_wallet_types::{AccountAddress, Network};
use tracing::debug;

use crate::config::WalletConfig;
use crate::WalletError;

/// Upper bound Horizon accepts for a page `limit`.
pub const MAX_PAGE_LIMIT: u32 = 200;

/// An account as the ledger currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub address: AccountAddress,
    /// Current sequence number. The next transaction must use `sequence + 1`.
    pub sequence: i64,
    pub balances: Vec<BalanceLine>,
}

impl AccountSnapshot {
    /// The native-asset balance line, if the account has one.
    pub fn native_balance(&self) -> Option<&str> {
        self.balances
            .iter()
            .find(|b| b.is_native())
            .map(|b| b.balance.as_str())
    }
}

/// One asset balance held by an account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BalanceLine {
    pub asset_type: String,
    /// Decimal string, exactly as the ledger reports it.
    pub balance: String,
}

impl BalanceLine {
    pub fn is_native(&self) -> bool {
        self.asset_type == "native"
    }
}

/// A transaction touching an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    pub hash: String,
    /// Close time of the ledger that included the transaction.
    pub created_at: String,
    /// Fee actually charged, in stroops.
    pub fee_charged: i64,
}

/// Result of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub hash: String,
    pub ledger: Option<u64>,
}

/// Query/submit interface to one ledger network.
#[async_trait]
pub trait LedgerApi: Send + Sync {
    /// The network this client is bound to.
    fn network(&self) -> Network;

    /// Look up an account. `Ok(None)` means the account does not exist.
    async fn account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<AccountSnapshot>, WalletError>;

    /// Up to `limit` most recent transactions for an account, newest first.
    /// An account that does not exist has no transactions.
    async fn transactions(
        &self,
        address: &AccountAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, WalletError>;

    /// Submit a base64 transaction envelope. Rejection by the network is
    /// [`WalletError::SubmissionFailure`] carrying the network's reason.
    async fn submit(&self, envelope_xdr: &str) -> Result<SubmitOutcome, WalletError>;
}

/// Produces a client bound to a given network.
pub trait LedgerBinder: Send + Sync {
    fn bind(&self, network: Network) -> Box<dyn LedgerApi>;
}

// ── Horizon ────────────────────────────────────────────────────────────

/// HTTP client for a Horizon server.
///
/// Wraps `reqwest::Client` with the server's base URL and the network it
/// serves. Every request is bounded by the client's timeouts.
#[derive(Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
    network: Network,
}

impl HorizonClient {
    /// Create a client targeting `base_url` (e.g. `https://horizon-testnet.stellar.org`).
    pub fn new(
        base_url: impl Into<String>,
        network: Network,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, WalletError> {
        let http = build_http(request_timeout, connect_timeout)?;
        Ok(Self::with_http(http, base_url, network))
    }

    fn with_http(http: reqwest::Client, base_url: impl Into<String>, network: Network) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            network,
        }
    }

    /// The configured server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

pub(crate) fn build_http(
    request_timeout: Duration,
    connect_timeout: Duration,
) -> Result<reqwest::Client, WalletError> {
    reqwest::Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .build()
        .map_err(|e| WalletError::Config(format!("failed to create HTTP client: {e}")))
}

#[async_trait]
impl LedgerApi for HorizonClient {
    fn network(&self) -> Network {
        self.network
    }

    async fn account(
        &self,
        address: &AccountAddress,
    ) -> Result<Option<AccountSnapshot>, WalletError> {
        const OP: &str = "account lookup";
        let url = format!("{}/accounts/{}", self.base_url, address);
        debug!(%url, "horizon request");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(status_error(OP, response.status(), None));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;
        parse_account(&body).map(Some)
    }

    async fn transactions(
        &self,
        address: &AccountAddress,
        limit: u32,
    ) -> Result<Vec<LedgerTransaction>, WalletError> {
        const OP: &str = "transaction listing";
        let limit = limit.clamp(1, MAX_PAGE_LIMIT);
        let url = format!("{}/accounts/{}/transactions", self.base_url, address);
        debug!(%url, limit, "horizon request");

        let response = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("order", "desc".to_string())])
            .send()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(status_error(OP, response.status(), None));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;
        parse_transactions(&body)
    }

    async fn submit(&self, envelope_xdr: &str) -> Result<SubmitOutcome, WalletError> {
        const OP: &str = "transaction submission";
        let url = format!("{}/transactions", self.base_url);
        debug!(%url, "horizon submission");

        let response = self
            .http
            .post(&url)
            .form(&[("tx", envelope_xdr)])
            .send()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WalletError::unreachable(OP, e))?;

        if status.is_success() {
            let accepted: HorizonSubmitResponse = serde_json::from_str(&body)
                .map_err(|e| WalletError::invalid_response(OP, e))?;
            return Ok(SubmitOutcome {
                hash: accepted.hash,
                ledger: accepted.ledger,
            });
        }
        if status == StatusCode::BAD_REQUEST {
            return Err(WalletError::SubmissionFailure {
                reason: submission_failure_reason(&body),
            });
        }
        Err(status_error(OP, status, Some(submission_failure_reason(&body))))
    }
}

/// Error for a status the operation has no specific meaning for.
///
/// A 4xx is an answer from a reachable server, so it is an unexpected
/// response; a 5xx means the server is not serving and counts as unreachable.
fn status_error(
    operation: &'static str,
    status: StatusCode,
    detail: Option<String>,
) -> WalletError {
    let reason = match detail {
        Some(detail) if !detail.is_empty() => format!("HTTP {status}: {detail}"),
        _ => format!("HTTP {status}"),
    };
    if status.is_client_error() {
        WalletError::invalid_response(operation, reason)
    } else {
        WalletError::unreachable(operation, reason)
    }
}

/// Binds [`HorizonClient`]s to the endpoints in a [`WalletConfig`].
///
/// All bound clients share one connection pool.
#[derive(Clone)]
pub struct HorizonBinder {
    http: reqwest::Client,
    testnet_url: String,
    public_url: String,
}

impl HorizonBinder {
    pub fn from_config(config: &WalletConfig) -> Result<Self, WalletError> {
        Ok(Self {
            http: build_http(config.request_timeout(), config.connect_timeout())?,
            testnet_url: config.horizon_url(Network::Test).to_string(),
            public_url: config.horizon_url(Network::Production).to_string(),
        })
    }
}

impl LedgerBinder for HorizonBinder {
    fn bind(&self, network: Network) -> Box<dyn LedgerApi> {
        let url = match network {
            Network::Test => &self.testnet_url,
            Network::Production => &self.public_url,
        };
        Box::new(HorizonClient::with_http(self.http.clone(), url.as_str(), network))
    }
}

// ── Horizon response shapes ────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct HorizonAccount {
    id: String,
    sequence: String,
    balances: Vec<BalanceLine>,
}

#[derive(Debug, Deserialize)]
struct HorizonPage<T> {
    #[serde(rename = "_embedded")]
    embedded: HorizonEmbedded<T>,
}

#[derive(Debug, Deserialize)]
struct HorizonEmbedded<T> {
    records: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct HorizonTransaction {
    hash: String,
    created_at: String,
    fee_charged: StringOrInt,
}

/// Horizon renders some integers as JSON strings, older servers as numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    Str(String),
    Int(i64),
}

impl StringOrInt {
    fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Str(s) => s.parse().ok(),
            Self::Int(i) => Some(*i),
        }
    }
}

#[derive(Debug, Deserialize)]
struct HorizonSubmitResponse {
    hash: String,
    #[serde(default)]
    ledger: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonProblem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    extras: Option<HorizonExtras>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonExtras {
    #[serde(default)]
    result_codes: Option<HorizonResultCodes>,
}

#[derive(Debug, Default, Deserialize)]
struct HorizonResultCodes {
    #[serde(default)]
    transaction: Option<String>,
    #[serde(default)]
    operations: Option<Vec<String>>,
}

fn parse_account(body: &str) -> Result<AccountSnapshot, WalletError> {
    const OP: &str = "account lookup";
    let account: HorizonAccount =
        serde_json::from_str(body).map_err(|e| WalletError::invalid_response(OP, e))?;
    let sequence = account
        .sequence
        .parse::<i64>()
        .map_err(|e| WalletError::invalid_response(OP, format!("sequence: {e}")))?;
    Ok(AccountSnapshot {
        address: AccountAddress::new(account.id),
        sequence,
        balances: account.balances,
    })
}

fn parse_transactions(body: &str) -> Result<Vec<LedgerTransaction>, WalletError> {
    const OP: &str = "transaction listing";
    let page: HorizonPage<HorizonTransaction> =
        serde_json::from_str(body).map_err(|e| WalletError::invalid_response(OP, e))?;
    page.embedded
        .records
        .into_iter()
        .map(|tx| {
            let fee_charged = tx.fee_charged.as_i64().ok_or_else(|| {
                WalletError::invalid_response(OP, format!("fee_charged of {}", tx.hash))
            })?;
            Ok(LedgerTransaction {
                hash: tx.hash,
                created_at: tx.created_at,
                fee_charged,
            })
        })
        .collect()
}

/// The network's own words for why a submission was rejected.
///
/// Prefers the result codes (`tx_failed: op_underfunded`), then the problem
/// detail or title, then the raw body.
fn submission_failure_reason(body: &str) -> String {
    let Ok(problem) = serde_json::from_str::<HorizonProblem>(body) else {
        return body.trim().to_string();
    };

    if let Some(codes) = problem.extras.and_then(|e| e.result_codes) {
        let ops = codes.operations.unwrap_or_default();
        match (codes.transaction, ops.is_empty()) {
            (Some(tx), true) => return tx,
            (Some(tx), false) => return format!("{tx}: {}", ops.join(", ")),
            (None, false) => return ops.join(", "),
            (None, true) => {}
        }
    }

    problem
        .detail
        .or(problem.title)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::CannedServer;

    const ACCOUNT_JSON: &str = r#"{
        "id": "GA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQHES5",
        "account_id": "GA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQHES5",
        "sequence": "4294967296",
        "subentry_count": 1,
        "balances": [
            {"balance": "25.0000000", "asset_type": "credit_alphanum4", "asset_code": "USD",
             "asset_issuer": "GBVZTFST4PIPV5C3APDIVULNZYZENQSLGDSOKOVQI77GSMT6WVYGF5GL"},
            {"balance": "9999.9999900", "asset_type": "native"}
        ]
    }"#;

    #[test]
    fn parses_account_and_native_balance() {
        let account = parse_account(ACCOUNT_JSON).unwrap();
        assert_eq!(account.sequence, 4_294_967_296);
        assert_eq!(account.balances.len(), 2);
        assert_eq!(account.native_balance(), Some("9999.9999900"));
    }

    #[test]
    fn account_without_native_line() {
        let json = r#"{"id":"G","sequence":"1","balances":[{"balance":"1.0","asset_type":"credit_alphanum4"}]}"#;
        assert_eq!(parse_account(json).unwrap().native_balance(), None);
    }

    #[test]
    fn bad_sequence_is_invalid_response() {
        let json = r#"{"id":"G","sequence":"abc","balances":[]}"#;
        assert!(matches!(
            parse_account(json),
            Err(WalletError::InvalidResponse { .. })
        ));
    }

    #[test]
    fn parses_transaction_page_with_string_and_numeric_fees() {
        let json = r#"{"_embedded":{"records":[
            {"hash":"aa","created_at":"2024-05-01T10:00:00Z","fee_charged":"100","successful":true},
            {"hash":"bb","created_at":"2024-04-30T10:00:00Z","fee_charged":200}
        ]}}"#;
        let txs = parse_transactions(json).unwrap();
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].hash, "aa");
        assert_eq!(txs[0].fee_charged, 100);
        assert_eq!(txs[1].fee_charged, 200);
    }

    #[test]
    fn failure_reason_uses_result_codes() {
        let body = r#"{"type":"https://stellar.org/horizon-errors/transaction_failed",
            "title":"Transaction Failed","status":400,
            "extras":{"result_codes":{"transaction":"tx_failed","operations":["op_underfunded"]}}}"#;
        assert_eq!(submission_failure_reason(body), "tx_failed: op_underfunded");
    }

    #[test]
    fn failure_reason_transaction_code_only() {
        let body = r#"{"title":"Transaction Failed","extras":{"result_codes":{"transaction":"tx_bad_seq"}}}"#;
        assert_eq!(submission_failure_reason(body), "tx_bad_seq");
    }

    #[test]
    fn failure_reason_falls_back_to_detail_then_raw() {
        let body = r#"{"title":"Transaction Malformed","detail":"could not decode envelope"}"#;
        assert_eq!(submission_failure_reason(body), "could not decode envelope");
        assert_eq!(submission_failure_reason("  gateway timeout "), "gateway timeout");
    }

    #[test]
    fn status_errors_split_client_and_server_side() {
        let err = status_error("account lookup", StatusCode::TOO_MANY_REQUESTS, None);
        assert!(matches!(err, WalletError::InvalidResponse { .. }));
        let err = status_error("account lookup", StatusCode::BAD_GATEWAY, Some(String::new()));
        assert_eq!(
            err.to_string(),
            "account lookup failed: network unreachable: HTTP 502 Bad Gateway"
        );
    }

    fn client_for(server: &CannedServer) -> HorizonClient {
        HorizonClient::new(
            server.url.as_str(),
            Network::Test,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn some_address() -> AccountAddress {
        AccountAddress::new("GA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQHES5")
    }

    #[tokio::test]
    async fn account_found_is_parsed() {
        let server = CannedServer::start(200, ACCOUNT_JSON).await;
        let account = client_for(&server).account(&some_address()).await.unwrap();
        assert_eq!(account.unwrap().native_balance(), Some("9999.9999900"));
        let requests = server.requests();
        assert!(requests[0].starts_with(
            "GET /accounts/GA3D5KRYM6CB7OWQ6TWYRR3Z4T7GNZLKERYNZGGA5SOAOPIFY6YQHES5 "
        ));
    }

    #[tokio::test]
    async fn account_404_means_no_such_account() {
        let body = r#"{"title":"Resource Missing","status":404}"#;
        let server = CannedServer::start(404, body).await;
        let account = client_for(&server).account(&some_address()).await.unwrap();
        assert_eq!(account, None);
    }

    #[tokio::test]
    async fn account_server_error_is_unreachable() {
        let server = CannedServer::start(500, "{}").await;
        let err = client_for(&server).account(&some_address()).await.unwrap_err();
        assert!(matches!(
            err,
            WalletError::NetworkUnreachable { operation: "account lookup", .. }
        ));
    }

    #[tokio::test]
    async fn account_client_errors_are_invalid_responses() {
        for status in [400, 429] {
            let server = CannedServer::start(status, "{}").await;
            let err = client_for(&server).account(&some_address()).await.unwrap_err();
            assert!(
                matches!(err, WalletError::InvalidResponse { operation: "account lookup", .. }),
                "HTTP {status}: {err}"
            );
        }
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let url = CannedServer::closed_url().await;
        let client = HorizonClient::new(
            url,
            Network::Test,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .unwrap();
        let err = client.account(&some_address()).await.unwrap_err();
        assert!(matches!(err, WalletError::NetworkUnreachable { .. }));
    }

    #[tokio::test]
    async fn transactions_request_newest_first_and_tolerate_404() {
        let server = CannedServer::start(404, "{}").await;
        let txs = client_for(&server).transactions(&some_address(), 5).await.unwrap();
        assert!(txs.is_empty());
        let request = &server.requests()[0];
        assert!(request.contains("/transactions?"), "{request}");
        assert!(request.contains("limit=5"), "{request}");
        assert!(request.contains("order=desc"), "{request}");
    }

    #[tokio::test]
    async fn submit_posts_envelope_as_form() {
        let body = r#"{"hash":"abcd","ledger":42,"successful":true}"#;
        let server = CannedServer::start(200, body).await;
        let outcome = client_for(&server).submit("AAAA").await.unwrap();
        assert_eq!(
            outcome,
            SubmitOutcome {
                hash: "abcd".to_string(),
                ledger: Some(42)
            }
        );
        let request = &server.requests()[0];
        assert!(request.starts_with("POST /transactions "), "{request}");
        assert!(request.ends_with("\r\n\r\ntx=AAAA"), "{request}");
    }

    #[tokio::test]
    async fn submit_400_carries_the_network_reason() {
        let body = r#"{"title":"Transaction Failed","status":400,
            "extras":{"result_codes":{"transaction":"tx_failed","operations":["op_no_destination"]}}}"#;
        let server = CannedServer::start(400, body).await;
        let err = client_for(&server).submit("AAAA").await.unwrap_err();
        match err {
            WalletError::SubmissionFailure { reason } => {
                assert_eq!(reason, "tx_failed: op_no_destination")
            }
            other => panic!("expected submission failure, got {other}"),
        }
    }

    #[tokio::test]
    async fn submit_other_statuses() {
        let server = CannedServer::start(504, r#"{"title":"Timeout"}"#).await;
        let err = client_for(&server).submit("AAAA").await.unwrap_err();
        assert!(matches!(err, WalletError::NetworkUnreachable { .. }));
        assert!(err.to_string().ends_with("HTTP 504 Gateway Timeout: Timeout"), "{err}");

        let server = CannedServer::start(413, "").await;
        let err = client_for(&server).submit("AAAA").await.unwrap_err();
        assert!(matches!(err, WalletError::InvalidResponse { .. }));
    }

    #[test]
    fn binder_selects_endpoint_by_network() {
        let config = WalletConfig::default();
        let binder = HorizonBinder::from_config(&config).unwrap();
        assert_eq!(binder.bind(Network::Test).network(), Network::Test);
        assert_eq!(binder.bind(Network::Production).network(), Network::Production);
    }

    #[test]
    fn client_trims_trailing_slash() {
        let client = HorizonClient::new(
            "https://horizon.example/",
            Network::Test,
            Duration::from_secs(1),
            Duration::from_secs(1),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://horizon.example");
    }
}
