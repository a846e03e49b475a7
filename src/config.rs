use std::path::PathBuf;

use serde::Deserialize;

use crate::backend::WiringMode;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration error: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: RPC URL and private key must be set")]
    Invalid,
}

#[derive(Deserialize)]
/// Configuration for the supply chain console.
///
/// Content of this configuration is loaded from environment variables or `.env`
/// file when the [Config::load()] is called.
/// Variable names in the enviroment and `.env` file must be prefixed with
/// [SUPPLY_CHAIN_](Config::CONFIG_PREFIX) and written as
/// SCREAMING_SNAKE_CASE (e.g. `SUPPLY_CHAIN_RPC_URL`).
pub struct Config {
    /// JSON-RPC endpoint of the node to connect to
    pub rpc_url: String,
    /// Hex encoded private key of the account transactions are sent from
    pub private_key: String,
    /// Compiled contract artifact with `abi` and `bytecode`
    #[serde(default = "Config::default_artifact_path")]
    pub artifact_path: PathBuf,
    /// File backing the local key/value storage
    #[serde(default = "Config::default_storage_path")]
    pub storage_path: PathBuf,
    /// Whether role actions and manual contract entry reach the contract
    #[serde(default)]
    pub wiring: WiringMode,
}

impl Config {
    /// Prefix of configuration options in the environment variables and `.env`
    /// file.
    const CONFIG_PREFIX: &'static str = "SUPPLY_CHAIN_";

    /// Loads a configuration from operating system environment variables and
    /// `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        // load config from .env file
        if let Err(err) = dotenvy::from_path(".env") {
            tracing::warn!(?err, "failed to load config file");
        }

        Self::from_vars(std::env::vars())
    }

    /// Builds a configuration from `(name, value)` pairs, names including the
    /// prefix.
    pub fn from_vars<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(Self::CONFIG_PREFIX).from_iter(vars)?;

        if !config.is_valid() {
            return Err(ConfigError::Invalid);
        }

        Ok(config)
    }

    /// Check if configuration is set
    pub fn is_valid(&self) -> bool {
        !self.rpc_url.trim().is_empty() && !self.private_key.trim().is_empty()
    }

    fn default_artifact_path() -> PathBuf {
        PathBuf::from("SupplyChain.json")
    }

    fn default_storage_path() -> PathBuf {
        PathBuf::from("local_storage.json")
    }
}
