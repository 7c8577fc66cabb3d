//! Payment transaction construction, hashing, and signing.
//!
//! Transactions are built as ledger XDR. The hash that gets signed is
//! `SHA-256(XDR(TransactionSignaturePayload { network_id, tx }))`, which ties
//! every signature to one network passphrase.

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use stellar_wallet_crypto::{network_id, sha256, KeyPair};
use stellar_wallet_types::{NativeAmount, Network, PublicKey, Timestamp, TxHash};
use stellar_xdr::curr::{
    Asset, DecoratedSignature, Hash, Limits, Memo, MuxedAccount, Operation, OperationBody,
    PaymentOp, Preconditions, ReadXdr, SequenceNumber, Signature, SignatureHint, TimeBounds,
    TimePoint, Transaction, TransactionEnvelope, TransactionExt, TransactionSignaturePayload,
    TransactionSignaturePayloadTaggedTransaction, TransactionV1Envelope, Uint256, WriteXdr,
};

use crate::WalletError;

/// Minimum fee per operation, in stroops.
pub const BASE_FEE_STROOPS: u32 = 100;
/// Validity window of a built transaction, in seconds from `now`.
pub const TX_TIMEOUT_SECS: u64 = 300;
/// Maximum length of a text memo, in bytes.
pub const MAX_MEMO_TEXT_BYTES: usize = 28;

/// Inputs for a single native payment.
#[derive(Debug, Clone)]
pub struct PaymentParams<'a> {
    pub source: &'a PublicKey,
    /// The source account's current sequence number as reported by the ledger.
    pub source_sequence: i64,
    pub destination: &'a PublicKey,
    pub amount: NativeAmount,
    pub memo: Option<&'a str>,
    pub now: Timestamp,
}

/// A signed envelope ready for submission.
#[derive(Debug, Clone)]
pub struct SignedEnvelope {
    pub envelope: TransactionEnvelope,
    pub hash: TxHash,
}

impl SignedEnvelope {
    /// Base64 XDR, the form the submission endpoint expects.
    pub fn to_base64(&self) -> Result<String, WalletError> {
        let bytes = self.envelope.to_xdr(Limits::none()).map_err(encoding)?;
        Ok(BASE64_STANDARD.encode(bytes))
    }
}

fn encoding(e: impl std::fmt::Display) -> WalletError {
    WalletError::Encoding(e.to_string())
}

fn muxed(key: &PublicKey) -> MuxedAccount {
    MuxedAccount::Ed25519(Uint256(*key.as_bytes()))
}

/// Convert an optional memo into its XDR form. Empty text means no memo.
pub fn text_memo(memo: Option<&str>) -> Result<Memo, WalletError> {
    match memo {
        None | Some("") => Ok(Memo::None),
        Some(text) if text.len() > MAX_MEMO_TEXT_BYTES => Err(WalletError::MemoTooLong {
            len: text.len(),
            max: MAX_MEMO_TEXT_BYTES,
        }),
        Some(text) => Ok(Memo::Text(text.as_bytes().to_vec().try_into().map_err(encoding)?)),
    }
}

/// Build an unsigned transaction holding one native payment.
///
/// Uses sequence `source_sequence + 1`, the base fee, and time-bounds
/// `[0, now + TX_TIMEOUT_SECS]`.
pub fn build_payment(params: &PaymentParams<'_>) -> Result<Transaction, WalletError> {
    let seq_num = params
        .source_sequence
        .checked_add(1)
        .ok_or_else(|| WalletError::Encoding("source sequence number exhausted".into()))?;

    let payment = Operation {
        source_account: None,
        body: OperationBody::Payment(PaymentOp {
            destination: muxed(params.destination),
            asset: Asset::Native,
            amount: params.amount.stroops(),
        }),
    };

    Ok(Transaction {
        source_account: muxed(params.source),
        fee: BASE_FEE_STROOPS,
        seq_num: SequenceNumber(seq_num),
        cond: Preconditions::Time(TimeBounds {
            min_time: TimePoint(0),
            max_time: TimePoint(params.now.plus_secs(TX_TIMEOUT_SECS).as_secs()),
        }),
        memo: text_memo(params.memo)?,
        operations: vec![payment].try_into().map_err(encoding)?,
        ext: TransactionExt::V0,
    })
}

/// The network-bound hash of `tx`: what gets signed and what the ledger
/// reports as the transaction hash.
pub fn transaction_hash(tx: &Transaction, network: Network) -> Result<TxHash, WalletError> {
    let payload = TransactionSignaturePayload {
        network_id: Hash(network_id(network)),
        tagged_transaction: TransactionSignaturePayloadTaggedTransaction::Tx(tx.clone()),
    };
    let bytes = payload.to_xdr(Limits::none()).map_err(encoding)?;
    Ok(TxHash::new(sha256(&bytes)))
}

/// Sign `tx` once for `network` and wrap it in an envelope.
pub fn sign_transaction(
    tx: Transaction,
    keys: &KeyPair,
    network: Network,
) -> Result<SignedEnvelope, WalletError> {
    let hash = transaction_hash(&tx, network)?;
    let signature = keys.sign(hash.as_bytes());
    let decorated = DecoratedSignature {
        hint: SignatureHint(keys.public().signature_hint()),
        signature: Signature(signature.as_bytes().to_vec().try_into().map_err(encoding)?),
    };
    let envelope = TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: vec![decorated].try_into().map_err(encoding)?,
    });
    Ok(SignedEnvelope { envelope, hash })
}

/// Parse a base64 XDR envelope.
pub fn decode_envelope(xdr_base64: &str) -> Result<TransactionEnvelope, WalletError> {
    let bytes = BASE64_STANDARD.decode(xdr_base64).map_err(encoding)?;
    TransactionEnvelope::from_xdr(bytes, Limits::none()).map_err(encoding)
}
