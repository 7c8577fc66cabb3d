//! Durable wallet record: key pair, selected network, last-seen balance.
//!
//! The record is stored as a single pretty-printed JSON document:
//!
//! ```json
//! {
//!   "public_key": "G…",
//!   "secret_key": "S…",
//!   "balance": "0",
//!   "network": "testnet"
//! }
//! ```
//!
//! Saves write a sibling temp file with owner-only permissions and rename it
//! over the old record, so a crash mid-write leaves the previous record intact.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stellar_wallet_crypto::KeyPair;
use stellar_wallet_types::{AccountAddress, Network};
use tracing::{debug, warn};
use zeroize::{Zeroize, Zeroizing};

use crate::WalletError;

/// The wallet's persisted state.
#[derive(Debug, PartialEq, Eq)]
pub struct WalletRecord {
    keys: KeyPair,
    /// The network the ledger client is bound to.
    pub network: Network,
    /// Last balance observed on the ledger. Advisory only.
    pub cached_balance: String,
}

impl WalletRecord {
    /// A brand-new record: fresh random keys, test network, zero balance.
    pub fn generate() -> Self {
        Self::from_keys(KeyPair::generate(), Network::Test)
    }

    pub fn from_keys(keys: KeyPair, network: Network) -> Self {
        Self {
            keys,
            network,
            cached_balance: "0".to_string(),
        }
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn address(&self) -> AccountAddress {
        self.keys.address()
    }
}

/// On-disk shape of the record. Field names are part of the file format.
#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecordFile {
    public_key: String,
    secret_key: String,
    balance: String,
    network: Network,
}

impl Drop for RecordFile {
    fn drop(&mut self) {
        self.secret_key.zeroize();
    }
}

/// Outcome of reading the record location.
#[derive(Debug)]
pub enum LoadedRecord {
    Existing(WalletRecord),
    /// No usable record; the caller should create one.
    Missing,
}

/// Reads and writes the wallet record at a fixed path.
#[derive(Clone, Debug)]
pub struct RecordStore {
    path: PathBuf,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the record.
    ///
    /// Only a file that does not exist means "no wallet yet". Any other read
    /// failure is a [`WalletError::Io`], so an existing record is never
    /// replaced by a freshly generated one. A file that reads but does not
    /// parse into exactly the record shape (including bytes that are not
    /// UTF-8), or whose public key is not the one derived from its secret key,
    /// is a fatal [`WalletError::Deserialization`].
    pub fn load(&self) -> Result<LoadedRecord, WalletError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => Zeroizing::new(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no wallet record");
                return Ok(LoadedRecord::Missing);
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "wallet record unreadable");
                return Err(WalletError::io(
                    format!("failed to read wallet record {}", self.path.display()),
                    e,
                ));
            }
        };

        let file: RecordFile = serde_json::from_slice(&bytes)
            .map_err(|e| WalletError::Deserialization(format!("invalid record JSON: {e}")))?;

        let keys = KeyPair::from_secret_strkey(&file.secret_key)
            .map_err(|e| WalletError::Deserialization(format!("secret_key: {e}")))?;
        if keys.address().as_str() != file.public_key {
            return Err(WalletError::Deserialization(
                "public_key does not match the address derived from secret_key".to_string(),
            ));
        }

        debug!(path = %self.path.display(), address = %keys.address(), "wallet record loaded");
        Ok(LoadedRecord::Existing(WalletRecord {
            keys,
            network: file.network,
            cached_balance: file.balance.clone(),
        }))
    }

    /// Persist the whole record, replacing any previous one.
    pub fn save(&self, record: &WalletRecord) -> Result<(), WalletError> {
        let file = RecordFile {
            public_key: record.address().as_str().to_string(),
            secret_key: record.keys.secret_strkey().to_string(),
            balance: record.cached_balance.clone(),
            network: record.network,
        };
        let mut json = serde_json::to_string_pretty(&file)
            .map_err(|e| WalletError::Encoding(format!("record serialization failed: {e}")))?;
        drop(file);

        let result = self.write_atomically(json.as_bytes());
        json.zeroize();
        result?;

        debug!(path = %self.path.display(), network = %record.network, "wallet record saved");
        Ok(())
    }

    fn write_atomically(&self, bytes: &[u8]) -> Result<(), WalletError> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)
            .map_err(|e| WalletError::io(format!("failed to create {}", dir.display()), e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .map_err(|e| WalletError::io("failed to create temp record file", e))?;
        restrict_to_owner(tmp.path())?;
        tmp.write_all(bytes)
            .map_err(|e| WalletError::io("failed to write temp record file", e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| WalletError::io("failed to sync temp record file", e))?;
        tmp.persist(&self.path).map_err(|e| {
            WalletError::io(format!("failed to replace {}", self.path.display()), e.error)
        })?;
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_to_owner(path: &Path) -> Result<(), WalletError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| WalletError::io("failed to restrict record permissions", e))
}

#[cfg(not(unix))]
fn restrict_to_owner(_path: &Path) -> Result<(), WalletError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, RecordStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("stellar_wallet.json"));
        (dir, store)
    }

    #[test]
    fn generated_record_defaults() {
        let record = WalletRecord::generate();
        assert_eq!(record.network, Network::Test);
        assert_eq!(record.cached_balance, "0");
        assert!(record.address().has_account_shape());
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let (_dir, store) = temp_store();
        assert!(matches!(store.load().unwrap(), LoadedRecord::Missing));
    }

    #[test]
    fn save_then_load_roundtrip() {
        let (_dir, store) = temp_store();
        let mut record = WalletRecord::generate();
        record.network = Network::Production;
        record.cached_balance = "9999.9999900".to_string();

        store.save(&record).unwrap();
        let LoadedRecord::Existing(loaded) = store.load().unwrap() else {
            panic!("record should exist");
        };
        assert_eq!(loaded, record);
    }

    #[test]
    fn file_uses_record_field_names() {
        let (_dir, store) = temp_store();
        let record = WalletRecord::generate();
        store.save(&record).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(value["public_key"], record.address().as_str());
        assert_eq!(value["secret_key"], record.keys().secret_strkey().as_str());
        assert_eq!(value["balance"], "0");
        assert_eq!(value["network"], "testnet");
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;
        let (_dir, store) = temp_store();
        store.save(&WalletRecord::generate()).unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn save_overwrites_previous_record() {
        let (dir, store) = temp_store();
        let first = WalletRecord::generate();
        let second = WalletRecord::generate();
        store.save(&first).unwrap();
        store.save(&second).unwrap();

        let LoadedRecord::Existing(loaded) = store.load().unwrap() else {
            panic!("record should exist");
        };
        assert_eq!(loaded, second);
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn malformed_json_is_fatal() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), "{ not json").unwrap();
        assert!(matches!(store.load(), Err(WalletError::Deserialization(_))));
    }

    #[test]
    fn non_utf8_record_is_fatal_and_kept() {
        let (_dir, store) = temp_store();
        let bytes: &[u8] = b"{\"public_key\":\"G\xff\xfe\"}";
        std::fs::write(store.path(), bytes).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Deserialization(_))));
        assert_eq!(std::fs::read(store.path()).unwrap(), bytes);
    }

    #[test]
    fn unreadable_record_is_an_error_not_missing() {
        let (_dir, store) = temp_store();
        // A directory at the record path exists but cannot be read as a file.
        std::fs::create_dir(store.path()).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Io { .. })));
        assert!(store.path().is_dir());
    }

    #[test]
    fn unknown_fields_are_fatal() {
        let (_dir, store) = temp_store();
        let record = WalletRecord::generate();
        let json = format!(
            r#"{{"public_key":"{}","secret_key":"{}","balance":"0","network":"testnet","extra":1}}"#,
            record.address(),
            record.keys().secret_strkey().as_str()
        );
        std::fs::write(store.path(), json).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Deserialization(_))));
    }

    #[test]
    fn missing_fields_are_fatal() {
        let (_dir, store) = temp_store();
        std::fs::write(store.path(), r#"{"public_key":"G","balance":"0"}"#).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Deserialization(_))));
    }

    #[test]
    fn mismatched_public_key_is_fatal() {
        let (_dir, store) = temp_store();
        let a = WalletRecord::generate();
        let b = WalletRecord::generate();
        let json = format!(
            r#"{{"public_key":"{}","secret_key":"{}","balance":"0","network":"testnet"}}"#,
            b.address(),
            a.keys().secret_strkey().as_str()
        );
        std::fs::write(store.path(), json).unwrap();
        let err = store.load().unwrap_err();
        assert!(matches!(err, WalletError::Deserialization(_)));
        assert!(!err.to_string().contains(a.keys().secret_strkey().as_str()));
    }

    #[test]
    fn unknown_network_is_fatal() {
        let (_dir, store) = temp_store();
        let a = WalletRecord::generate();
        let json = format!(
            r#"{{"public_key":"{}","secret_key":"{}","balance":"0","network":"futurenet"}}"#,
            a.address(),
            a.keys().secret_strkey().as_str()
        );
        std::fs::write(store.path(), json).unwrap();
        assert!(matches!(store.load(), Err(WalletError::Deserialization(_))));
    }
}
