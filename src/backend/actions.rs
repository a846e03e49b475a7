//! Role actions available once a contract is selected.
//!
//! Whether the actions reach the contract is a deployment decision
//! ([WiringMode]): in deferred mode every action is a recognized but inert
//! affordance, in wired mode they are proxied to contract methods.

use std::{fmt, sync::Arc};

use alloy_dyn_abi::DynSolValue;
use alloy_primitives::B256;
use async_trait::async_trait;
use serde::Deserialize;
use strum::{Display, EnumIter};

use crate::backend::{
    client::{ClientError, ContractBinding, ContractClient, TxOptions},
    deployment::{DEFAULT_GAS, DEFAULT_GAS_PRICE},
    error::Error,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum WiringMode {
    /// Actions and manual contract entry are rendered but do nothing.
    #[default]
    Deferred,
    /// Actions call the contract, manual entry selects a contract.
    Wired,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ActionKind {
    #[strum(to_string = "Add farmer")]
    AddFarmer,
    #[strum(to_string = "Add distributor")]
    AddDistributor,
    #[strum(to_string = "Add retailer")]
    AddRetailer,
    #[strum(to_string = "Kill contract")]
    KillContract,
    #[strum(to_string = "Fetch product")]
    FetchProduct,
    #[strum(to_string = "Fetch product history")]
    FetchProductHistory,
}

impl ActionKind {
    /// Actions only the contract owner is offered.
    pub fn owner_only(self) -> bool {
        matches!(
            self,
            ActionKind::AddFarmer
                | ActionKind::AddDistributor
                | ActionKind::AddRetailer
                | ActionKind::KillContract
        )
    }

    /// Contract method the action maps to.
    pub fn method(self) -> &'static str {
        match self {
            ActionKind::AddFarmer => "addFarmer",
            ActionKind::AddDistributor => "addDistributor",
            ActionKind::AddRetailer => "addRetailer",
            ActionKind::KillContract => "kill",
            ActionKind::FetchProduct => "fetchProduct",
            ActionKind::FetchProductHistory => "fetchProductHistory",
        }
    }
}

/// An action together with the value the user entered for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContractAction {
    AddFarmer(String),
    AddDistributor(String),
    AddRetailer(String),
    KillContract,
    FetchProduct(String),
    FetchProductHistory(String),
}

impl ContractAction {
    /// Builds the action of `kind` from the entered value; the value is
    /// ignored for actions that take none.
    pub fn new(kind: ActionKind, value: String) -> Self {
        match kind {
            ActionKind::AddFarmer => ContractAction::AddFarmer(value),
            ActionKind::AddDistributor => ContractAction::AddDistributor(value),
            ActionKind::AddRetailer => ContractAction::AddRetailer(value),
            ActionKind::KillContract => ContractAction::KillContract,
            ActionKind::FetchProduct => ContractAction::FetchProduct(value),
            ActionKind::FetchProductHistory => ContractAction::FetchProductHistory(value),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ContractAction::AddFarmer(_) => ActionKind::AddFarmer,
            ContractAction::AddDistributor(_) => ActionKind::AddDistributor,
            ContractAction::AddRetailer(_) => ActionKind::AddRetailer,
            ContractAction::KillContract => ActionKind::KillContract,
            ContractAction::FetchProduct(_) => ActionKind::FetchProduct,
            ContractAction::FetchProductHistory(_) => ActionKind::FetchProductHistory,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// The action exists but is not connected to the contract.
    Deferred(ActionKind),
    Submitted { kind: ActionKind, tx_hash: B256 },
    Fetched { kind: ActionKind, values: Vec<DynSolValue> },
}

impl fmt::Display for ActionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionOutcome::Deferred(kind) => write!(f, "{kind} is not wired to the contract yet"),
            ActionOutcome::Submitted { kind, tx_hash } => {
                write!(f, "{kind} submitted in transaction {tx_hash}")
            }
            ActionOutcome::Fetched { kind, values } => {
                writeln!(f, "{kind}:")?;
                for value in values {
                    writeln!(f, "{}", format_value(value))?;
                }
                Ok(())
            }
        }
    }
}

fn format_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Address(a) => a.to_string(),
        DynSolValue::Uint(u, _) => u.to_string(),
        DynSolValue::Int(i, _) => i.to_string(),
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Array(values)
        | DynSolValue::FixedArray(values)
        | DynSolValue::Tuple(values) => {
            format!("[{}]", values.iter().map(format_value).collect::<Vec<_>>().join(", "))
        }
        other => format!("{other:?}"),
    }
}

/// Capability set of the management view.
#[async_trait]
pub trait ContractActions: Send + Sync {
    /// Whether `kind` reaches the contract.
    fn is_wired(&self, kind: ActionKind) -> bool;

    async fn add_farmer(&self, address: &str) -> Result<ActionOutcome, Error>;

    async fn add_distributor(&self, address: &str) -> Result<ActionOutcome, Error>;

    async fn add_retailer(&self, address: &str) -> Result<ActionOutcome, Error>;

    async fn kill_contract(&self) -> Result<ActionOutcome, Error>;

    async fn fetch_product(&self, upc: &str) -> Result<ActionOutcome, Error>;

    async fn fetch_product_history(&self, upc: &str) -> Result<ActionOutcome, Error>;

    async fn dispatch(&self, action: &ContractAction) -> Result<ActionOutcome, Error> {
        match action {
            ContractAction::AddFarmer(address) => self.add_farmer(address).await,
            ContractAction::AddDistributor(address) => self.add_distributor(address).await,
            ContractAction::AddRetailer(address) => self.add_retailer(address).await,
            ContractAction::KillContract => self.kill_contract().await,
            ContractAction::FetchProduct(upc) => self.fetch_product(upc).await,
            ContractAction::FetchProductHistory(upc) => self.fetch_product_history(upc).await,
        }
    }
}

/// Every action is an intentional placeholder.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeferredActions;

#[async_trait]
impl ContractActions for DeferredActions {
    fn is_wired(&self, _kind: ActionKind) -> bool {
        false
    }

    async fn add_farmer(&self, _address: &str) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::AddFarmer))
    }

    async fn add_distributor(&self, _address: &str) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::AddDistributor))
    }

    async fn add_retailer(&self, _address: &str) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::AddRetailer))
    }

    async fn kill_contract(&self) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::KillContract))
    }

    async fn fetch_product(&self, _upc: &str) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::FetchProduct))
    }

    async fn fetch_product_history(&self, _upc: &str) -> Result<ActionOutcome, Error> {
        Ok(ActionOutcome::Deferred(ActionKind::FetchProductHistory))
    }
}

/// Actions proxied to the contract: owner actions are transactions, fetches
/// are read-only calls made the same way as the role lookup.
pub struct WiredActions {
    client: Arc<dyn ContractClient>,
    binding: ContractBinding,
}

impl WiredActions {
    pub fn new(client: Arc<dyn ContractClient>, binding: ContractBinding) -> Self {
        WiredActions { client, binding }
    }

    async fn transact(&self, kind: ActionKind, args: &[String]) -> Result<ActionOutcome, Error> {
        let options = TxOptions {
            from: self.client.account(),
            gas: DEFAULT_GAS,
            gas_price: DEFAULT_GAS_PRICE.to_owned(),
        };

        let tx_hash = self
            .client
            .send(&self.binding, kind.method(), args, &options)
            .await
            .map_err(|source| action_failure(kind, source))?;

        Ok(ActionOutcome::Submitted { kind, tx_hash })
    }

    async fn fetch(&self, kind: ActionKind, upc: &str) -> Result<ActionOutcome, Error> {
        let values = self
            .client
            .call(
                &self.binding,
                kind.method(),
                &[upc.to_owned()],
                self.client.account(),
            )
            .await
            .map_err(|source| action_failure(kind, source))?;

        Ok(ActionOutcome::Fetched { kind, values })
    }
}

fn action_failure(kind: ActionKind, source: ClientError) -> Error {
    Error::ActionFailure { kind, source }
}

#[async_trait]
impl ContractActions for WiredActions {
    fn is_wired(&self, _kind: ActionKind) -> bool {
        true
    }

    async fn add_farmer(&self, address: &str) -> Result<ActionOutcome, Error> {
        self.transact(ActionKind::AddFarmer, &[address.to_owned()])
            .await
    }

    async fn add_distributor(&self, address: &str) -> Result<ActionOutcome, Error> {
        self.transact(ActionKind::AddDistributor, &[address.to_owned()])
            .await
    }

    async fn add_retailer(&self, address: &str) -> Result<ActionOutcome, Error> {
        self.transact(ActionKind::AddRetailer, &[address.to_owned()])
            .await
    }

    async fn kill_contract(&self) -> Result<ActionOutcome, Error> {
        self.transact(ActionKind::KillContract, &[]).await
    }

    async fn fetch_product(&self, upc: &str) -> Result<ActionOutcome, Error> {
        self.fetch(ActionKind::FetchProduct, upc).await
    }

    async fn fetch_product_history(&self, upc: &str) -> Result<ActionOutcome, Error> {
        self.fetch(ActionKind::FetchProductHistory, upc).await
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[tokio::test]
    async fn deferred_actions_are_inert() {
        let actions = DeferredActions;

        for kind in ActionKind::iter() {
            assert!(!actions.is_wired(kind));
        }

        assert_eq!(
            actions
                .dispatch(&ContractAction::FetchProduct("42".to_owned()))
                .await
                .expect("deferred"),
            ActionOutcome::Deferred(ActionKind::FetchProduct)
        );
        assert_eq!(
            actions
                .dispatch(&ContractAction::KillContract)
                .await
                .expect("deferred"),
            ActionOutcome::Deferred(ActionKind::KillContract)
        );
    }

    #[test]
    fn owner_only_actions() {
        let owner_only: Vec<_> = ActionKind::iter().filter(|k| k.owner_only()).collect();

        assert_eq!(
            owner_only,
            [
                ActionKind::AddFarmer,
                ActionKind::AddDistributor,
                ActionKind::AddRetailer,
                ActionKind::KillContract
            ]
        );
    }

    #[test]
    fn action_kind_follows_payload() {
        assert_eq!(
            ContractAction::AddRetailer("0x1".to_owned()).kind(),
            ActionKind::AddRetailer
        );
        assert_eq!(
            ContractAction::FetchProductHistory("7".to_owned()).kind().method(),
            "fetchProductHistory"
        );
        for kind in ActionKind::iter() {
            assert_eq!(ContractAction::new(kind, "1".to_owned()).kind(), kind);
        }
    }

    #[test]
    fn outcome_is_readable() {
        let outcome = ActionOutcome::Fetched {
            kind: ActionKind::FetchProduct,
            values: vec![
                DynSolValue::String("Coffee".to_owned()),
                DynSolValue::Bool(true),
            ],
        };

        assert_eq!(outcome.to_string(), "Fetch product:\nCoffee\ntrue\n");
        assert_eq!(
            ActionOutcome::Deferred(ActionKind::KillContract).to_string(),
            "Kill contract is not wired to the contract yet"
        );
    }
}
