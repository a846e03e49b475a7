//! Blockchain client seam.
//!
//! Everything that talks to a node goes through [ContractClient], so screens
//! and tasks never see the transport. Arguments arrive as the text a user
//! typed and are coerced to the ABI parameter types right before encoding.

mod rpc;

use alloy_dyn_abi::{DynSolValue, JsonAbiExt, Specifier};
use alloy_json_abi::{Function, JsonAbi, Param};
use alloy_primitives::{Address, Bytes, B256};
use async_trait::async_trait;

pub use self::rpc::RpcContractClient;
use crate::backend::storage::StoredContractRef;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("ABI error: {0}")]
    Abi(#[from] alloy_dyn_abi::Error),
    #[error("malformed contract ABI: {0}")]
    MalformedAbi(String),
    #[error("invalid contract address {0:?}")]
    InvalidAddress(String),
    #[error("contract has no method {method} taking {args} argument(s)")]
    UnknownMethod { method: String, args: usize },
    #[error("expected {expected} argument(s), got {got}")]
    ArgumentCount { expected: usize, got: usize },
    #[error("invalid gas price {0:?}")]
    InvalidGasPrice(String),
    #[error("invalid signer key: {0}")]
    Signer(String),
    #[error("RPC error: {0}")]
    Rpc(String),
    #[error("transaction {0} reverted")]
    Reverted(B256),
    #[error("no contract address in deployment receipt")]
    NoContractAddress,
    #[error("unexpected output of {method}: {output}")]
    UnexpectedOutput { method: String, output: String },
}

/// Transaction parameters attached to every state changing request.
///
/// Gas price stays textual until the client interprets it, the same way the
/// user entered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOptions {
    pub from: Address,
    pub gas: u64,
    pub gas_price: String,
}

impl TxOptions {
    pub(crate) fn gas_price_wei(&self) -> Result<u128, ClientError> {
        self.gas_price
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidGasPrice(self.gas_price.clone()))
    }
}

/// A typed handle to a deployed contract: its ABI plus the address it lives
/// at.
#[derive(Clone, Debug, PartialEq)]
pub struct ContractBinding {
    abi: JsonAbi,
    address: Address,
}

impl ContractBinding {
    pub fn new(abi: JsonAbi, address: Address) -> Self {
        ContractBinding { abi, address }
    }

    /// Builds a binding from a stored reference. This is the first point the
    /// stored shape is checked.
    pub fn from_stored(contract: &StoredContractRef) -> Result<Self, ClientError> {
        let abi: JsonAbi = serde_json::from_value(contract.abi.clone())
            .map_err(|e| ClientError::MalformedAbi(e.to_string()))?;
        let address = contract
            .address
            .trim()
            .parse()
            .map_err(|_| ClientError::InvalidAddress(contract.address.clone()))?;

        Ok(ContractBinding { abi, address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Picks the overload of `method` whose arity matches the arguments.
    pub(crate) fn function(&self, method: &str, args: usize) -> Result<&Function, ClientError> {
        self.abi
            .function(method)
            .and_then(|overloads| overloads.iter().find(|f| f.inputs.len() == args))
            .ok_or_else(|| ClientError::UnknownMethod {
                method: method.to_owned(),
                args,
            })
    }
}

/// The external blockchain collaborator: a connected account plus the ability
/// to create contracts and to call or transact against a binding.
#[async_trait]
pub trait ContractClient: Send + Sync {
    /// Currently selected account, used as `from` for every request.
    fn account(&self) -> Address;

    /// Sends a contract creation transaction and resolves to the new
    /// contract's address.
    async fn deploy(
        &self,
        abi: &JsonAbi,
        bytecode: &Bytes,
        args: &[String],
        options: &TxOptions,
    ) -> Result<Address, ClientError>;

    /// Read-only method call.
    async fn call(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        from: Address,
    ) -> Result<Vec<DynSolValue>, ClientError>;

    /// State changing method call, resolves to the transaction hash once
    /// mined.
    async fn send(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        options: &TxOptions,
    ) -> Result<B256, ClientError>;
}

pub(crate) fn coerce_args(params: &[Param], args: &[String]) -> Result<Vec<DynSolValue>, ClientError> {
    if params.len() != args.len() {
        return Err(ClientError::ArgumentCount {
            expected: params.len(),
            got: args.len(),
        });
    }

    params
        .iter()
        .zip(args)
        .map(|(param, arg)| Ok(param.resolve()?.coerce_str(arg.trim())?))
        .collect()
}

/// Contract creation payload: bytecode followed by encoded constructor
/// arguments.
pub fn deployment_data(abi: &JsonAbi, bytecode: &Bytes, args: &[String]) -> Result<Bytes, ClientError> {
    let mut data = bytecode.to_vec();

    match &abi.constructor {
        Some(constructor) => {
            let values = coerce_args(&constructor.inputs, args)?;
            data.extend(constructor.abi_encode_input(&values)?);
        }
        None if args.is_empty() => {}
        None => {
            return Err(ClientError::ArgumentCount {
                expected: 0,
                got: args.len(),
            })
        }
    }

    Ok(data.into())
}

/// Encoded method input, selector included.
pub fn call_data(function: &Function, args: &[String]) -> Result<Bytes, ClientError> {
    let values = coerce_args(&function.inputs, args)?;
    Ok(function.abi_encode_input(&values)?.into())
}
