//! Contract deployment.

use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use alloy_primitives::Address;

use super::{
    artifact::ContractArtifact,
    client::{ContractClient, TxOptions},
    error::Error,
    state::{AppState, AppStateUpdate},
    storage::{LocalStorage, StoredContractRef},
    BackendEvent, Task,
};

pub const DEFAULT_GAS: u64 = 5_000_000;
pub const DEFAULT_GAS_PRICE: &str = "90000000000";

/// Constructor arguments and optional transaction overrides as entered.
/// Participant identifiers are passed to the contract as is.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentForm {
    pub farmer_id: String,
    pub distributor_id: String,
    pub retailer_id: String,
    pub gas: Option<u64>,
    pub gas_price: Option<String>,
}

impl DeploymentForm {
    pub fn constructor_args(&self) -> Vec<String> {
        vec![
            self.farmer_id.clone(),
            self.distributor_id.clone(),
            self.retailer_id.clone(),
        ]
    }

    pub fn tx_options(&self, from: Address) -> TxOptions {
        TxOptions {
            from,
            gas: self.gas.unwrap_or(DEFAULT_GAS),
            gas_price: self
                .gas_price
                .clone()
                .unwrap_or_else(|| DEFAULT_GAS_PRICE.to_owned()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentTask {
    Deploy(DeploymentForm),
    /// Writes the bare address under the `address` storage key.
    SaveAddress(Address),
    /// Writes `{abi, address}` under the `contract` storage key.
    SaveContract(Address),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum DeploymentOutcome {
    #[default]
    Idle,
    Success(Address),
    Error,
}

/// Banner the deployment view shows; success and error never coexist.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeploymentBanner {
    Success(Address),
    Error,
}

/// Deployment view state: `idle -> submitting -> success | error`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeploymentSession {
    submitting: bool,
    outcome: DeploymentOutcome,
}

impl DeploymentSession {
    /// Starts a submission, clearing the previous outcome. Refused while
    /// another one is in flight.
    pub fn begin_submit(&mut self) -> bool {
        if self.submitting {
            return false;
        }
        self.submitting = true;
        self.outcome = DeploymentOutcome::Idle;
        true
    }

    pub fn succeed(&mut self, address: Address) {
        self.submitting = false;
        self.outcome = DeploymentOutcome::Success(address);
    }

    pub fn fail(&mut self) {
        self.submitting = false;
        self.outcome = DeploymentOutcome::Error;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn address(&self) -> Option<Address> {
        match self.outcome {
            DeploymentOutcome::Success(address) => Some(address),
            _ => None,
        }
    }

    pub fn banner(&self) -> Option<DeploymentBanner> {
        match self.outcome {
            DeploymentOutcome::Idle => None,
            DeploymentOutcome::Success(address) => Some(DeploymentBanner::Success(address)),
            DeploymentOutcome::Error => Some(DeploymentBanner::Error),
        }
    }
}

/// Handle to the one [DeploymentSession] of the application. Kept in
/// [AppState], so every deployment screen instance sees the same in-flight
/// submission and outcome, and the backend records results there.
#[derive(Clone, Debug, Default)]
pub struct SharedDeploymentSession(Arc<Mutex<DeploymentSession>>);

impl SharedDeploymentSession {
    fn lock(&self) -> MutexGuard<DeploymentSession> {
        self.0.lock().expect("lock is poisoned")
    }

    /// Snapshot of the session.
    pub fn get(&self) -> DeploymentSession {
        self.lock().clone()
    }

    /// See [DeploymentSession::begin_submit].
    pub fn begin_submit(&self) -> bool {
        self.lock().begin_submit()
    }

    pub fn succeed(&self, address: Address) {
        self.lock().succeed(address)
    }

    pub fn fail(&self) {
        self.lock().fail()
    }
}

/// Sends the deployment transaction with defaults filled in.
pub async fn deploy(
    client: &dyn ContractClient,
    artifact: &ContractArtifact,
    form: &DeploymentForm,
) -> Result<Address, Error> {
    let options = form.tx_options(client.account());
    tracing::info!(
        gas = options.gas,
        gas_price = %options.gas_price,
        "deploying supply chain contract"
    );

    client
        .deploy(
            &artifact.abi,
            &artifact.bytecode,
            &form.constructor_args(),
            &options,
        )
        .await
        .map_err(Error::DeploymentFailure)
}

pub(super) async fn run_deployment_task(
    client: &dyn ContractClient,
    artifact: &ContractArtifact,
    storage: &LocalStorage,
    app_state: &RwLock<AppState>,
    task: DeploymentTask,
) -> BackendEvent {
    match task {
        DeploymentTask::Deploy(form) => {
            let result = deploy(client, artifact, &form).await;
            let task = Task::Deployment(DeploymentTask::Deploy(form));

            match result {
                Ok(address) => {
                    tracing::info!(%address, "contract deployed");
                    app_state
                        .write()
                        .expect("lock is poisoned")
                        .set_deployed_address(address);

                    BackendEvent::TaskCompletedStateChange {
                        task,
                        execution_result: Ok(format!(
                            "Contract was successfully deployed at address: {address}"
                        )),
                        app_state_update: AppStateUpdate::DeployedAddress(address),
                    }
                }
                Err(err) => {
                    tracing::error!(?err, "{err}");
                    app_state
                        .read()
                        .expect("lock is poisoned")
                        .deployment()
                        .fail();
                    BackendEvent::TaskCompleted {
                        task,
                        execution_result: Err(err.to_string()),
                    }
                }
            }
        }
        DeploymentTask::SaveAddress(address) => {
            let execution_result = storage
                .store_address(address)
                .await
                .map(|_| "Address saved to local storage".to_owned())
                .map_err(Error::from);
            stringify_save_result(Task::Deployment(task), execution_result)
        }
        DeploymentTask::SaveContract(address) => {
            let execution_result = save_contract(artifact, storage, address)
                .await
                .map(|_| "Contract saved to local storage".to_owned());
            stringify_save_result(Task::Deployment(task), execution_result)
        }
    }
}

/// Stores `{abi, address}` of a deployment of `artifact`.
pub async fn save_contract(
    artifact: &ContractArtifact,
    storage: &LocalStorage,
    address: Address,
) -> Result<StoredContractRef, Error> {
    let contract = artifact.contract_ref(address)?;
    storage.store_contract(&contract).await?;
    Ok(contract)
}

fn stringify_save_result(task: Task, result: Result<String, Error>) -> BackendEvent {
    if let Err(err) = &result {
        tracing::error!(?err, "saving to local storage failed");
    }
    BackendEvent::TaskCompleted {
        task,
        execution_result: result.map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_gas_fields() {
        let form = DeploymentForm {
            farmer_id: "farmer".to_owned(),
            distributor_id: "distributor".to_owned(),
            retailer_id: "retailer".to_owned(),
            ..Default::default()
        };

        let options = form.tx_options(Address::ZERO);

        assert_eq!(options.gas, 5_000_000);
        assert_eq!(options.gas_price, "90000000000");
        assert_eq!(
            form.constructor_args(),
            ["farmer", "distributor", "retailer"]
        );
    }

    #[test]
    fn overrides_are_kept_verbatim() {
        let form = DeploymentForm {
            gas: Some(6_721_975),
            gas_price: Some("20000000000".to_owned()),
            ..Default::default()
        };

        let options = form.tx_options(Address::ZERO);

        assert_eq!(options.gas, 6_721_975);
        assert_eq!(options.gas_price, "20000000000");
    }

    #[test]
    fn submission_is_guarded_while_in_flight() {
        let mut session = DeploymentSession::default();

        assert!(session.begin_submit());
        assert!(session.is_submitting());
        assert!(!session.begin_submit());

        session.fail();
        assert!(!session.is_submitting());
        assert!(session.begin_submit());
    }

    #[test]
    fn new_submission_clears_previous_outcome() {
        let mut session = DeploymentSession::default();
        session.begin_submit();
        session.succeed(Address::repeat_byte(1));
        assert_eq!(session.address(), Some(Address::repeat_byte(1)));

        session.begin_submit();

        assert_eq!(session.address(), None);
        assert_eq!(session.banner(), None);
    }

    #[test]
    fn banners_are_mutually_exclusive() {
        let mut session = DeploymentSession::default();
        session.begin_submit();
        session.fail();
        assert_eq!(session.banner(), Some(DeploymentBanner::Error));
        assert_eq!(session.address(), None);

        session.begin_submit();
        session.succeed(Address::repeat_byte(2));
        assert_eq!(
            session.banner(),
            Some(DeploymentBanner::Success(Address::repeat_byte(2)))
        );
    }
}
