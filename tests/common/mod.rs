#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;
use serde_json::json;
use supply_chain_tui::backend::{
    client::{ClientError, ContractBinding, ContractClient, TxOptions},
    Backend, ContractArtifact, LocalStorage, StoredContractRef, WiringMode,
};
use tempfile::TempDir;

pub const STORED_ADDRESS: &str = "0x1000000000000000000000000000000000000001";

pub fn account() -> Address {
    Address::repeat_byte(0xac)
}

pub fn deployed_address() -> Address {
    Address::repeat_byte(0xde)
}

pub fn tx_hash() -> B256 {
    B256::repeat_byte(0xaa)
}

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Deploy {
        args: Vec<String>,
        options: TxOptions,
    },
    Call {
        address: Address,
        method: String,
        args: Vec<String>,
        from: Address,
    },
    Send {
        address: Address,
        method: String,
        args: Vec<String>,
        options: TxOptions,
    },
}

#[derive(Clone, Debug)]
pub enum RoleReply {
    Role(&'static str),
    Fail,
    Never,
}

/// Client double recording every request it gets.
pub struct FakeClient {
    requests: Mutex<Vec<Request>>,
    deploy_fails: bool,
    deploy_reverts: bool,
    role: RoleReply,
}

impl FakeClient {
    pub fn new() -> Self {
        FakeClient {
            requests: Mutex::new(Vec::new()),
            deploy_fails: false,
            deploy_reverts: false,
            role: RoleReply::Role("owner"),
        }
    }

    pub fn with_role(mut self, role: RoleReply) -> Self {
        self.role = role;
        self
    }

    pub fn failing_deploy(mut self) -> Self {
        self.deploy_fails = true;
        self
    }

    /// Deployment mined but reverted by the constructor.
    pub fn reverting_deploy(mut self) -> Self {
        self.deploy_reverts = true;
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("lock").clone()
    }

    fn record(&self, request: Request) {
        self.requests.lock().expect("lock").push(request);
    }
}

#[async_trait]
impl ContractClient for FakeClient {
    fn account(&self) -> Address {
        account()
    }

    async fn deploy(
        &self,
        _abi: &JsonAbi,
        _bytecode: &Bytes,
        args: &[String],
        options: &TxOptions,
    ) -> Result<Address, ClientError> {
        self.record(Request::Deploy {
            args: args.to_vec(),
            options: options.clone(),
        });

        if self.deploy_fails {
            Err(ClientError::Rpc("insufficient funds for gas".to_owned()))
        } else if self.deploy_reverts {
            Err(ClientError::Reverted(tx_hash()))
        } else {
            Ok(deployed_address())
        }
    }

    async fn call(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        from: Address,
    ) -> Result<Vec<DynSolValue>, ClientError> {
        self.record(Request::Call {
            address: binding.address(),
            method: method.to_owned(),
            args: args.to_vec(),
            from,
        });

        if method != "getUserRole" {
            return Ok(vec![DynSolValue::String(format!("product {}", args.join(",")))]);
        }

        match self.role {
            RoleReply::Role(role) => Ok(vec![DynSolValue::String(role.to_owned())]),
            RoleReply::Fail => Err(ClientError::Rpc("execution reverted".to_owned())),
            RoleReply::Never => futures::future::pending().await,
        }
    }

    async fn send(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        options: &TxOptions,
    ) -> Result<B256, ClientError> {
        self.record(Request::Send {
            address: binding.address(),
            method: method.to_owned(),
            args: args.to_vec(),
            options: options.clone(),
        });
        Ok(tx_hash())
    }
}

pub fn abi_json() -> serde_json::Value {
    json!([
        {
            "type": "constructor",
            "stateMutability": "nonpayable",
            "inputs": [
                { "name": "initialFarmer", "type": "address", "internalType": "address" },
                { "name": "initialDistributor", "type": "address", "internalType": "address" },
                { "name": "initialRetailer", "type": "address", "internalType": "address" }
            ]
        },
        {
            "type": "function",
            "name": "getUserRole",
            "stateMutability": "view",
            "inputs": [],
            "outputs": [{ "name": "", "type": "string", "internalType": "string" }]
        },
        {
            "type": "function",
            "name": "addFarmer",
            "stateMutability": "nonpayable",
            "inputs": [{ "name": "account", "type": "address", "internalType": "address" }],
            "outputs": []
        },
        {
            "type": "function",
            "name": "fetchProduct",
            "stateMutability": "view",
            "inputs": [{ "name": "_upc", "type": "uint256", "internalType": "uint256" }],
            "outputs": [{ "name": "", "type": "string", "internalType": "string" }]
        },
        {
            "type": "function",
            "name": "kill",
            "stateMutability": "nonpayable",
            "inputs": [],
            "outputs": []
        }
    ])
}

pub fn artifact() -> ContractArtifact {
    let artifact = json!({
        "contractName": "SupplyChain",
        "abi": abi_json(),
        "bytecode": "0x6080604052"
    });
    ContractArtifact::from_json(&artifact.to_string()).expect("valid artifact")
}

pub fn stored_contract() -> StoredContractRef {
    StoredContractRef {
        abi: abi_json(),
        address: STORED_ADDRESS.to_owned(),
    }
}

/// Backend over `client` with storage in a fresh temporary directory, which
/// lives as long as the returned guard.
pub fn backend(client: Arc<FakeClient>, wiring: WiringMode) -> (Backend, TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = LocalStorage::open(dir.path().join("local_storage.json")).expect("storage");
    let backend = Backend::new(client, artifact(), storage, wiring);
    (backend, dir)
}
