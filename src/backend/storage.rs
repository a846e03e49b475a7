//! Local key/value storage.
//!
//! A single JSON file holding string values under string keys, loaded once
//! and rewritten on every change.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Key of the serialized `{abi, address}` contract reference.
pub const CONTRACT_KEY: &str = "contract";
/// Key of the bare deployed address.
pub const ADDRESS_KEY: &str = "address";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("malformed storage file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Contract reference as it is kept in storage. Fields are not validated here,
/// a binding built from it does that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredContractRef {
    #[serde(default)]
    pub abi: serde_json::Value,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug)]
pub struct LocalStorage {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
}

impl LocalStorage {
    /// Opens storage backed by `path`; a missing file is an empty storage.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        let items = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|source| StorageError::Io {
                path: path.clone(),
                source,
            })?;
            serde_json::from_str(&content)?
        } else {
            BTreeMap::new()
        };

        Ok(LocalStorage {
            path,
            items: Mutex::new(items),
        })
    }

    pub async fn get_item(&self, key: &str) -> Option<String> {
        self.items.lock().await.get(key).cloned()
    }

    pub async fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.items.lock().await;
        items.insert(key.to_owned(), value);
        self.persist(&items).await
    }

    pub async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.items.lock().await;
        if items.remove(key).is_some() {
            self.persist(&items).await?;
        }
        Ok(())
    }

    /// Reads the stored contract reference. Unparseable content is reported
    /// and treated as absent.
    pub async fn stored_contract(&self) -> Option<StoredContractRef> {
        let raw = self.get_item(CONTRACT_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(contract) => Some(contract),
            Err(err) => {
                tracing::warn!(?err, "ignoring unparseable stored contract");
                None
            }
        }
    }

    pub async fn store_contract(&self, contract: &StoredContractRef) -> Result<(), StorageError> {
        self.set_item(CONTRACT_KEY, serde_json::to_string(contract)?)
            .await
    }

    pub async fn clear_stored_contract(&self) -> Result<(), StorageError> {
        self.remove_item(CONTRACT_KEY).await
    }

    pub async fn store_address(&self, address: Address) -> Result<(), StorageError> {
        self.set_item(ADDRESS_KEY, address.to_string()).await
    }

    async fn persist(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let content = serde_json::to_vec_pretty(items)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|source| StorageError::Io {
                path: self.path.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn contract() -> StoredContractRef {
        StoredContractRef {
            abi: json!([]),
            address: "0x1000000000000000000000000000000000000001".to_owned(),
        }
    }

    #[tokio::test]
    async fn missing_file_is_empty_storage() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalStorage::open(dir.path().join("storage.json")).expect("opens");

        assert_eq!(storage.get_item(ADDRESS_KEY).await, None);
        assert_eq!(storage.stored_contract().await, None);
    }

    #[tokio::test]
    async fn items_survive_reopening() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("storage.json");

        let storage = LocalStorage::open(&path).expect("opens");
        storage.store_contract(&contract()).await.expect("stored");
        storage
            .store_address(Address::repeat_byte(0x11))
            .await
            .expect("stored");
        drop(storage);

        let storage = LocalStorage::open(&path).expect("reopens");
        assert_eq!(storage.stored_contract().await, Some(contract()));
        assert_eq!(
            storage.get_item(ADDRESS_KEY).await,
            Some(Address::repeat_byte(0x11).to_string())
        );
    }

    #[tokio::test]
    async fn clearing_removes_only_the_contract() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalStorage::open(dir.path().join("storage.json")).expect("opens");
        storage.store_contract(&contract()).await.expect("stored");
        storage.set_item(ADDRESS_KEY, "0xabc".to_owned()).await.expect("stored");

        storage.clear_stored_contract().await.expect("cleared");

        assert_eq!(storage.stored_contract().await, None);
        assert_eq!(storage.get_item(ADDRESS_KEY).await.as_deref(), Some("0xabc"));
    }

    #[tokio::test]
    async fn stored_contract_shape_is_lenient() {
        let dir = tempfile::tempdir().expect("temp dir");
        let storage = LocalStorage::open(dir.path().join("storage.json")).expect("opens");

        storage.set_item(CONTRACT_KEY, "{}".to_owned()).await.expect("stored");
        assert_eq!(
            storage.stored_contract().await,
            Some(StoredContractRef {
                abi: serde_json::Value::Null,
                address: String::new(),
            })
        );

        storage
            .set_item(CONTRACT_KEY, "not json".to_owned())
            .await
            .expect("stored");
        assert_eq!(storage.stored_contract().await, None);
    }
}
