//! Compiled contract artifact.

use std::{fs, path::Path};

use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes};
use serde::Deserialize;

use crate::backend::storage::StoredContractRef;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed artifact: {0}")]
    Format(#[from] serde_json::Error),
}

/// ABI and creation bytecode of the supply chain contract, as found in a
/// Truffle or Hardhat build output (`abi` and `bytecode` keys, other keys
/// ignored).
#[derive(Clone, Debug, Deserialize)]
pub struct ContractArtifact {
    pub abi: JsonAbi,
    pub bytecode: Bytes,
}

impl ContractArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reference to a deployment of this artifact, in the shape kept in local
    /// storage.
    pub fn contract_ref(&self, address: Address) -> Result<StoredContractRef, ArtifactError> {
        Ok(StoredContractRef {
            abi: serde_json::to_value(&self.abi)?,
            address: address.to_string(),
        })
    }

    /// ABI pretty printed for display.
    pub fn abi_pretty(&self) -> String {
        serde_json::to_string_pretty(&self.abi).unwrap_or_else(|_| "Cannot serialize ABI".to_owned())
    }
}
