mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use common::{account, artifact, backend, deployed_address, FakeClient, Request};
use supply_chain_tui::backend::{
    client::TxOptions,
    deployment::{save_contract, DeploymentBanner, DeploymentForm},
    error::Error,
    storage::{LocalStorage, ADDRESS_KEY},
    AppStateUpdate, BackendEvent, DeploymentTask, Task, WiringMode,
};

fn form() -> DeploymentForm {
    DeploymentForm {
        farmer_id: "0x2000000000000000000000000000000000000002".to_owned(),
        distributor_id: "0x3000000000000000000000000000000000000003".to_owned(),
        retailer_id: "0x4000000000000000000000000000000000000004".to_owned(),
        gas: None,
        gas_price: None,
    }
}

#[tokio::test]
async fn deploys_once_with_default_gas() {
    let client = Arc::new(FakeClient::new());
    let (backend, _dir) = backend(client.clone(), WiringMode::Deferred);

    let event = backend
        .run_task(Task::Deployment(DeploymentTask::Deploy(form())))
        .await;

    assert_eq!(
        client.requests(),
        [Request::Deploy {
            args: vec![
                form().farmer_id,
                form().distributor_id,
                form().retailer_id
            ],
            options: TxOptions {
                from: account(),
                gas: 5_000_000,
                gas_price: "90000000000".to_owned(),
            },
        }]
    );
    assert_matches!(
        event,
        BackendEvent::TaskCompletedStateChange {
            execution_result: Ok(_),
            app_state_update: AppStateUpdate::DeployedAddress(address),
            ..
        } if address == deployed_address()
    );
    assert_eq!(backend.state().deployed_address(), Some(deployed_address()));
}

#[tokio::test]
async fn gas_overrides_are_used_verbatim() {
    let client = Arc::new(FakeClient::new());
    let (backend, _dir) = backend(client.clone(), WiringMode::Deferred);

    backend
        .run_task(Task::Deployment(DeploymentTask::Deploy(DeploymentForm {
            gas: Some(6_721_975),
            gas_price: Some("20000000000".to_owned()),
            ..form()
        })))
        .await;

    assert_matches!(
        client.requests().as_slice(),
        [Request::Deploy { options, .. }]
            if options.gas == 6_721_975 && options.gas_price == "20000000000"
    );
}

#[tokio::test]
async fn failed_deployment_stores_no_address() {
    let client = Arc::new(FakeClient::new().failing_deploy());
    let (backend, _dir) = backend(client.clone(), WiringMode::Deferred);
    let session = backend.state().deployment().clone();

    assert!(session.begin_submit());
    let event = backend
        .run_task(Task::Deployment(DeploymentTask::Deploy(form())))
        .await;

    assert_matches!(
        &event,
        BackendEvent::TaskCompleted {
            task: Task::Deployment(DeploymentTask::Deploy(_)),
            execution_result: Err(message),
        } if message.contains("insufficient funds")
    );

    assert_eq!(client.requests().len(), 1);
    assert_eq!(backend.state().deployed_address(), None);
    assert_eq!(backend.storage().get_item(ADDRESS_KEY).await, None);
    assert!(!session.get().is_submitting());
    assert_eq!(session.get().banner(), Some(DeploymentBanner::Error));
    assert_eq!(session.get().address(), None);
}

#[tokio::test]
async fn reverted_deployment_is_a_failure() {
    let client = Arc::new(FakeClient::new().reverting_deploy());
    let (backend, _dir) = backend(client, WiringMode::Deferred);
    let session = backend.state().deployment().clone();

    assert!(session.begin_submit());
    let event = backend
        .run_task(Task::Deployment(DeploymentTask::Deploy(form())))
        .await;

    assert_matches!(
        event,
        BackendEvent::TaskCompleted {
            execution_result: Err(message),
            ..
        } if message.contains("reverted")
    );
    assert_eq!(backend.state().deployed_address(), None);
    assert_eq!(session.get().banner(), Some(DeploymentBanner::Error));
}

#[tokio::test]
async fn session_follows_successful_deployment() {
    let client = Arc::new(FakeClient::new());
    let (backend, _dir) = backend(client, WiringMode::Deferred);
    let session = backend.state().deployment().clone();

    assert!(session.begin_submit());
    // A screen built later shares the in-flight submission
    assert!(!backend.state().deployment().begin_submit());

    backend
        .run_task(Task::Deployment(DeploymentTask::Deploy(form())))
        .await;

    let snapshot = session.get();
    assert!(!snapshot.is_submitting());
    assert_eq!(snapshot.address(), Some(deployed_address()));
    assert_eq!(
        snapshot.banner(),
        Some(DeploymentBanner::Success(deployed_address()))
    );
    assert_eq!(backend.state().deployed_address(), snapshot.address());
}

#[tokio::test]
async fn saving_writes_local_storage() {
    let client = Arc::new(FakeClient::new());
    let (backend, _dir) = backend(client.clone(), WiringMode::Deferred);

    let event = backend
        .run_task(Task::Deployment(DeploymentTask::SaveAddress(
            deployed_address(),
        )))
        .await;
    assert_matches!(event, BackendEvent::TaskCompleted { execution_result: Ok(_), .. });
    assert_eq!(
        backend.storage().get_item(ADDRESS_KEY).await,
        Some(deployed_address().to_string())
    );

    let event = backend
        .run_task(Task::Deployment(DeploymentTask::SaveContract(
            deployed_address(),
        )))
        .await;
    assert_matches!(event, BackendEvent::TaskCompleted { execution_result: Ok(_), .. });

    let stored = backend
        .storage()
        .stored_contract()
        .await
        .expect("contract stored");
    assert_eq!(stored.address, deployed_address().to_string());
    assert_eq!(
        stored.abi,
        serde_json::to_value(&backend.artifact().abi).expect("abi")
    );

    // Saving never talks to the node
    assert!(client.requests().is_empty());
}

#[tokio::test]
async fn unwritable_storage_fails_the_save() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage =
        LocalStorage::open(dir.path().join("missing").join("storage.json")).expect("opens");

    let result = save_contract(&artifact(), &storage, deployed_address()).await;

    assert_matches!(result, Err(Error::Storage(_)));
}
