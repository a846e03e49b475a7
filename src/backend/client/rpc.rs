//! JSON-RPC implementation of [ContractClient] on top of alloy.

use std::fmt;

use alloy_dyn_abi::{DynSolValue, FunctionExt};
use alloy_json_abi::JsonAbi;
use alloy_network::{EthereumWallet, TransactionBuilder};
use alloy_primitives::{Address, Bytes, B256};
use alloy_provider::{DynProvider, Provider, ProviderBuilder};
use alloy_rpc_types::{TransactionReceipt, TransactionRequest};
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;

use super::{call_data, deployment_data, ClientError, ContractBinding, ContractClient, TxOptions};

/// Node connection with a single local signer acting as the connected
/// account.
#[derive(Clone)]
pub struct RpcContractClient {
    inner: DynProvider,
    account: Address,
}

impl fmt::Debug for RpcContractClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcContractClient")
            .field("account", &self.account)
            .field("inner", &"<provider>")
            .finish()
    }
}

impl RpcContractClient {
    pub fn new(rpc_url: &str, private_key: &str) -> Result<Self, ClientError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e| ClientError::Signer(format!("{e}")))?;
        let account = signer.address();

        let url = rpc_url
            .parse()
            .map_err(|e| ClientError::Rpc(format!("invalid RPC URL {rpc_url}: {e}")))?;

        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(url);

        tracing::info!(%account, rpc_url, "connected contract client");

        Ok(RpcContractClient {
            inner: provider.erased(),
            account,
        })
    }

    async fn send_and_wait(
        &self,
        tx: TransactionRequest,
    ) -> Result<TransactionReceipt, ClientError> {
        let pending = self
            .inner
            .send_transaction(tx)
            .await
            .map_err(|e| ClientError::Rpc(format!("failed to send transaction: {e}")))?;

        tracing::debug!(tx_hash = %pending.tx_hash(), "transaction sent");

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| ClientError::Rpc(format!("failed to get receipt: {e}")))?;

        ensure_success(receipt)
    }
}

/// A mined transaction may still have reverted; creation receipts carry a
/// contract address either way.
fn ensure_success(receipt: TransactionReceipt) -> Result<TransactionReceipt, ClientError> {
    if !receipt.status() {
        tracing::error!(tx_hash = %receipt.transaction_hash, "transaction reverted");
        return Err(ClientError::Reverted(receipt.transaction_hash));
    }
    Ok(receipt)
}

#[async_trait]
impl ContractClient for RpcContractClient {
    fn account(&self) -> Address {
        self.account
    }

    async fn deploy(
        &self,
        abi: &JsonAbi,
        bytecode: &Bytes,
        args: &[String],
        options: &TxOptions,
    ) -> Result<Address, ClientError> {
        let tx = TransactionRequest::default()
            .with_deploy_code(deployment_data(abi, bytecode, args)?)
            .with_from(options.from)
            .with_gas_limit(options.gas)
            .with_gas_price(options.gas_price_wei()?);

        let receipt = self.send_and_wait(tx).await?;

        receipt.contract_address.ok_or(ClientError::NoContractAddress)
    }

    async fn call(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        from: Address,
    ) -> Result<Vec<DynSolValue>, ClientError> {
        let function = binding.function(method, args.len())?;
        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(binding.address())
            .with_input(call_data(function, args)?);

        let output = self
            .inner
            .call(tx)
            .await
            .map_err(|e| ClientError::Rpc(format!("call to {method} failed: {e}")))?;

        Ok(function.abi_decode_output(&output)?)
    }

    async fn send(
        &self,
        binding: &ContractBinding,
        method: &str,
        args: &[String],
        options: &TxOptions,
    ) -> Result<B256, ClientError> {
        let function = binding.function(method, args.len())?;
        let tx = TransactionRequest::default()
            .with_from(options.from)
            .with_to(binding.address())
            .with_input(call_data(function, args)?)
            .with_gas_limit(options.gas)
            .with_gas_price(options.gas_price_wei()?);

        let receipt = self.send_and_wait(tx).await?;

        Ok(receipt.transaction_hash)
    }
}
