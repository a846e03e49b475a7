//! Application backend.
//! This includes all logic unrelated to UI.

pub mod actions;
pub mod artifact;
pub mod client;
pub mod deployment;
pub mod error;
pub mod management;
pub mod state;
pub mod storage;

use std::sync::{Arc, RwLock, RwLockReadGuard};

pub use self::{
    actions::WiringMode,
    artifact::ContractArtifact,
    client::ContractClient,
    deployment::DeploymentTask,
    management::{ManagementTask, Role},
    state::{AppState, AppStateUpdate},
    storage::{LocalStorage, StoredContractRef},
};
use self::{deployment::run_deployment_task, management::run_management_task};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Task {
    Deployment(DeploymentTask),
    Management(ManagementTask),
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    TaskCompleted {
        task: Task,
        execution_result: Result<String, String>,
    },
    TaskCompletedStateChange {
        task: Task,
        execution_result: Result<String, String>,
        app_state_update: AppStateUpdate,
    },
    /// Content of the `contract` storage key, read on management view mount.
    StoredContractLoaded(Option<StoredContractRef>),
    RoleResolved {
        contract: StoredContractRef,
        role: Result<Role, String>,
    },
    /// Manually entered contract reference, validated.
    ContractEntered(Result<StoredContractRef, String>),
    None,
}

/// Owns the external collaborators and runs [Task]s against them.
pub struct Backend {
    client: Arc<dyn ContractClient>,
    artifact: ContractArtifact,
    storage: LocalStorage,
    app_state: RwLock<AppState>,
    wiring: WiringMode,
}

impl Backend {
    pub fn new(
        client: Arc<dyn ContractClient>,
        artifact: ContractArtifact,
        storage: LocalStorage,
        wiring: WiringMode,
    ) -> Self {
        let app_state = RwLock::new(AppState::new(client.account(), artifact.abi_pretty()));
        Backend {
            client,
            artifact,
            storage,
            app_state,
            wiring,
        }
    }

    pub fn state(&self) -> RwLockReadGuard<AppState> {
        self.app_state.read().expect("lock is poisoned")
    }

    pub fn artifact(&self) -> &ContractArtifact {
        &self.artifact
    }

    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    pub async fn run_task(&self, task: Task) -> BackendEvent {
        tracing::debug!(?task, "running task");
        match task {
            Task::Deployment(task) => {
                run_deployment_task(
                    self.client.as_ref(),
                    &self.artifact,
                    &self.storage,
                    &self.app_state,
                    task,
                )
                .await
            }
            Task::Management(task) => {
                run_management_task(&self.client, &self.storage, self.wiring, task).await
            }
        }
    }
}
