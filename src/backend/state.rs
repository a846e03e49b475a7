//! Application state module.
//! State shared between views; it is not persisted, views that need durable
//! data go through local storage.

use alloy_primitives::Address;

use super::deployment::SharedDeploymentSession;

#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Connected account every request is made from.
    pub account: Address,
    /// ABI of the contract artifact, pretty printed.
    pub contract_abi: String,
    deployed_address: Option<Address>,
    deployment: SharedDeploymentSession,
}

impl AppState {
    pub fn new(account: Address, contract_abi: String) -> Self {
        AppState {
            account,
            contract_abi,
            deployed_address: None,
            deployment: SharedDeploymentSession::default(),
        }
    }

    /// Address of the contract deployed during this session, if any.
    pub fn deployed_address(&self) -> Option<Address> {
        self.deployed_address
    }

    /// Deployment in flight or finished during this session.
    pub fn deployment(&self) -> &SharedDeploymentSession {
        &self.deployment
    }

    /// The only mutation entry point for the deployed address. Completes the
    /// deployment session with it as well.
    pub fn set_deployed_address(&mut self, address: Address) {
        tracing::info!(%address, "deployed address updated");
        self.deployed_address = Some(address);
        self.deployment.succeed(address);
    }
}

/// Describes which part of [AppState] a task changed, sent along with the
/// task result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppStateUpdate {
    DeployedAddress(Address),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployed_address_completes_shared_session() {
        let mut state = AppState::new(Address::ZERO, String::new());
        let screen_handle = state.deployment().clone();
        assert!(screen_handle.begin_submit());

        state.set_deployed_address(Address::repeat_byte(7));

        let session = screen_handle.get();
        assert!(!session.is_submitting());
        assert_eq!(session.address(), Some(Address::repeat_byte(7)));
        assert_eq!(state.deployed_address(), Some(Address::repeat_byte(7)));
    }
}
