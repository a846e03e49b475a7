//! Contract management: selecting a contract reference, resolving the
//! caller's role and gating role actions on it.

use std::{fmt, sync::Arc};

use alloy_dyn_abi::DynSolValue;
use strum::{EnumString, IntoEnumIterator};

use super::{
    actions::{ActionKind, ContractAction, ContractActions, DeferredActions, WiredActions, WiringMode},
    client::{ClientError, ContractBinding, ContractClient},
    error::Error,
    storage::{LocalStorage, StoredContractRef},
    BackendEvent, Task,
};

const GET_USER_ROLE: &str = "getUserRole";

/// Participant role as reported by the contract.
#[derive(Clone, Debug, PartialEq, Eq, EnumString)]
pub enum Role {
    #[strum(serialize = "owner")]
    Owner,
    #[strum(serialize = "farmer")]
    Farmer,
    #[strum(serialize = "distributor")]
    Distributor,
    #[strum(serialize = "retailer")]
    Retailer,
    #[strum(serialize = "consumer")]
    Consumer,
    #[strum(serialize = "")]
    Unset,
    #[strum(default)]
    Other(String),
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Owner => write!(f, "Owner"),
            Role::Farmer => write!(f, "Farmer"),
            Role::Distributor => write!(f, "Distributor"),
            Role::Retailer => write!(f, "Retailer"),
            Role::Consumer => write!(f, "Consumer"),
            Role::Unset => write!(f, "No role"),
            Role::Other(role) => write!(f, "{role}"),
        }
    }
}

/// Where the working contract reference came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Saved,
    Entered,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RoleResolution {
    #[default]
    Unrequested,
    Pending,
    Resolved(Role),
}

/// Parts of the management view, in render order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Panel {
    ContractFound,
    Error,
    ManualEntry,
    Owner,
    FetchProduct,
    FetchProductHistory,
    Loading,
}

/// Management view state.
///
/// The role lookup is requested at most once per contract selection; a
/// failure is terminal for the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManagementSession {
    contract: Option<StoredContractRef>,
    selection: Selection,
    role: RoleResolution,
    error: bool,
}

impl ManagementSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the stored reference read from storage. Ignored once a contract
    /// is selected.
    pub fn load_stored(&mut self, stored: Option<StoredContractRef>) {
        if self.selection == Selection::None {
            self.contract = stored;
        }
    }

    /// Drops the stored reference; only possible before a selection.
    pub fn clear_stored(&mut self) -> bool {
        if self.selection != Selection::None {
            return false;
        }
        self.contract = None;
        self.role = RoleResolution::Unrequested;
        true
    }

    /// Selects the stored reference and returns it if a role lookup has to be
    /// issued for it.
    pub fn use_stored(&mut self) -> Option<StoredContractRef> {
        if self.contract.is_none() || self.selection != Selection::None || self.error {
            return None;
        }
        self.selection = Selection::Saved;
        self.request_role_lookup()
    }

    /// Selects a manually entered reference, see [Self::use_stored].
    pub fn use_entered(&mut self, contract: StoredContractRef) -> Option<StoredContractRef> {
        if self.selection != Selection::None || self.error {
            return None;
        }
        self.contract = Some(contract);
        self.selection = Selection::Entered;
        self.request_role_lookup()
    }

    /// Marks the lookup as issued. Returns the reference to look up only the
    /// first time for a selection.
    pub fn request_role_lookup(&mut self) -> Option<StoredContractRef> {
        if self.selection == Selection::None
            || self.error
            || self.role != RoleResolution::Unrequested
        {
            return None;
        }
        self.role = RoleResolution::Pending;
        self.contract.clone()
    }

    /// Applies a lookup result. Results for another contract or arriving
    /// when no lookup is pending are dropped.
    pub fn resolve_role(&mut self, contract: &StoredContractRef, result: Result<Role, String>) -> bool {
        if self.role != RoleResolution::Pending || self.contract.as_ref() != Some(contract) {
            return false;
        }
        match result {
            Ok(role) => self.role = RoleResolution::Resolved(role),
            Err(_) => {
                self.role = RoleResolution::Unrequested;
                self.error = true;
            }
        }
        true
    }

    pub fn contract(&self) -> Option<&StoredContractRef> {
        self.contract.as_ref()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn role(&self) -> Option<&Role> {
        match &self.role {
            RoleResolution::Resolved(role) => Some(role),
            _ => None,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    /// Contract the role actions operate on, available once the role is
    /// known.
    pub fn working_contract(&self) -> Option<&StoredContractRef> {
        self.role().and(self.contract.as_ref())
    }

    pub fn panels(&self) -> Vec<Panel> {
        let selected = self.selection != Selection::None;
        let mut panels = Vec::new();

        if self.contract.is_some() && !selected && !self.error {
            panels.push(Panel::ContractFound);
        }
        if self.error {
            panels.push(Panel::Error);
        }
        if !selected && !self.error {
            panels.push(Panel::ManualEntry);
        }
        if selected {
            match &self.role {
                RoleResolution::Resolved(role) => {
                    if *role == Role::Owner {
                        panels.push(Panel::Owner);
                    }
                    panels.push(Panel::FetchProduct);
                    panels.push(Panel::FetchProductHistory);
                }
                RoleResolution::Pending | RoleResolution::Unrequested if !self.error => {
                    panels.push(Panel::Loading)
                }
                _ => {}
            }
        }

        panels
    }

    /// Actions the current role is offered.
    pub fn available_actions(&self) -> Vec<ActionKind> {
        let Some(role) = self.role() else {
            return Vec::new();
        };
        ActionKind::iter()
            .filter(|kind| !kind.owner_only() || *role == Role::Owner)
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManagementTask {
    LoadStoredContract,
    ClearStoredContract,
    ResolveRole(StoredContractRef),
    EnterContract { abi: String, address: String },
    Action {
        contract: StoredContractRef,
        action: ContractAction,
    },
}

/// Asks the contract for the connected account's role.
pub async fn resolve_role(
    client: &dyn ContractClient,
    contract: &StoredContractRef,
) -> Result<Role, Error> {
    let binding = ContractBinding::from_stored(contract).map_err(Error::RoleResolutionFailure)?;

    let output = client
        .call(&binding, GET_USER_ROLE, &[], client.account())
        .await
        .map_err(Error::RoleResolutionFailure)?;

    match output.as_slice() {
        [DynSolValue::String(role)] => Ok(role
            .parse::<Role>()
            .unwrap_or_else(|_| Role::Other(role.clone()))),
        other => Err(Error::RoleResolutionFailure(ClientError::UnexpectedOutput {
            method: GET_USER_ROLE.to_owned(),
            output: format!("{other:?}"),
        })),
    }
}

/// Capability set for `contract` under the configured wiring.
pub fn contract_actions(
    client: Arc<dyn ContractClient>,
    contract: &StoredContractRef,
    wiring: WiringMode,
) -> Result<Box<dyn ContractActions>, ClientError> {
    match wiring {
        WiringMode::Deferred => Ok(Box::new(DeferredActions)),
        WiringMode::Wired => {
            let binding = ContractBinding::from_stored(contract)?;
            Ok(Box::new(WiredActions::new(client, binding)))
        }
    }
}

pub(super) async fn run_management_task(
    client: &Arc<dyn ContractClient>,
    storage: &LocalStorage,
    wiring: WiringMode,
    task: ManagementTask,
) -> BackendEvent {
    match task {
        ManagementTask::LoadStoredContract => {
            BackendEvent::StoredContractLoaded(storage.stored_contract().await)
        }
        ManagementTask::ClearStoredContract => {
            let execution_result = match storage
                .clear_stored_contract()
                .await
                .map_err(Error::from)
            {
                Ok(()) => Ok("Stored contract cleared".to_owned()),
                Err(err) => {
                    tracing::error!(?err, "failed to clear stored contract");
                    Err(err.to_string())
                }
            };
            BackendEvent::TaskCompleted {
                task: Task::Management(task),
                execution_result,
            }
        }
        ManagementTask::ResolveRole(contract) => {
            let role = resolve_role(client.as_ref(), &contract)
                .await
                .map_err(|err| {
                    tracing::error!(?err, "{err}");
                    err.to_string()
                });
            if let Ok(role) = &role {
                tracing::info!(%role, address = %contract.address, "role resolved");
            }
            BackendEvent::RoleResolved { contract, role }
        }
        ManagementTask::EnterContract { ref abi, ref address } => match wiring {
            WiringMode::Deferred => {
                tracing::info!("manual contract entry ignored in deferred wiring mode");
                BackendEvent::TaskCompleted {
                    task: Task::Management(task),
                    execution_result: Ok(
                        "Manual contract entry is not enabled in deferred wiring mode".to_owned(),
                    ),
                }
            }
            WiringMode::Wired => {
                let result = entered_contract(abi, address).map_err(|err| {
                    tracing::error!(?err, "rejected entered contract");
                    err.to_string()
                });
                BackendEvent::ContractEntered(result)
            }
        },
        ManagementTask::Action {
            ref contract,
            ref action,
        } => {
            let outcome = match contract_actions(client.clone(), contract, wiring) {
                Ok(actions) => actions.dispatch(action).await,
                Err(source) => Err(Error::ActionFailure {
                    kind: action.kind(),
                    source,
                }),
            };
            let execution_result = outcome.map(|o| o.to_string()).map_err(|err| {
                tracing::error!(?err, "{err}");
                err.to_string()
            });
            BackendEvent::TaskCompleted {
                task: Task::Management(task),
                execution_result,
            }
        }
    }
}

/// Builds a reference from the manual entry form, validating it the same way
/// a stored one is validated before use.
fn entered_contract(abi: &str, address: &str) -> Result<StoredContractRef, Error> {
    let contract = StoredContractRef {
        abi: serde_json::from_str(abi)?,
        address: address.trim().to_owned(),
    };
    ContractBinding::from_stored(&contract).map_err(Error::RoleResolutionFailure)?;
    Ok(contract)
}
