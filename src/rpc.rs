use std::time::Duration;

use alloy::network::ReceiptResponse;
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::client::RpcClient as TransportClient;
use alloy::rpc::types::{TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use alloy::transports::http::Http;
use alloy::transports::TransportError;
use alloy_primitives::{Address, Bytes, TxKind, B256};

use crate::error::{DeployError, Result};
use crate::tx::ConfirmationPolicy;

/// A log entry as it appears in a transaction receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
}

/// The subset of a transaction receipt the deployment scripts consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
	pub transaction_hash: B256,
	pub block_number: u64,
	pub success: bool,
	pub contract_address: Option<Address>,
	pub gas_used: u64,
	pub logs: Vec<Log>,
}

impl From<TransactionReceipt> for TxReceipt {
	fn from(receipt: TransactionReceipt) -> Self {
		let logs = receipt
			.inner
			.logs()
			.iter()
			.map(|log| Log {
				address: log.inner.address,
				topics: log.inner.data.topics().to_vec(),
				data: log.inner.data.data.clone(),
			})
			.collect();
		Self {
			transaction_hash: receipt.transaction_hash,
			block_number: receipt.block_number.unwrap_or_default(),
			success: receipt.status(),
			contract_address: receipt.contract_address,
			gas_used: receipt.gas_used,
			logs,
		}
	}
}

/// A call from a node-managed account.
pub fn call_request(from: Address, to: Address, data: impl Into<Bytes>) -> TransactionRequest {
	TransactionRequest {
		from: Some(from),
		to: Some(TxKind::Call(to)),
		input: TransactionInput::both(data.into()),
		..Default::default()
	}
}

/// Contract creation with `code` as init code.
pub fn create_request(from: Address, code: impl Into<Bytes>) -> TransactionRequest {
	TransactionRequest {
		from: Some(from),
		to: Some(TxKind::Create),
		input: TransactionInput::both(code.into()),
		..Default::default()
	}
}

/// The node operations a deployment run needs.  Implemented over an alloy
/// provider by [`RpcClient`]; tests substitute an in-memory chain.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
	async fn chain_id(&self) -> Result<u64>;

	/// Accounts the node can sign for.
	async fn accounts(&self) -> Result<Vec<Address>>;

	/// Submit a transaction for the node to sign and broadcast, and wait
	/// until it has the confirmations `policy` asks for.  A mined but
	/// reverted transaction is returned with `success == false`.
	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
		policy: &ConfirmationPolicy,
	) -> Result<TxReceipt>;

	/// Execute a read-only call against the latest block.
	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;
}

/// Ethereum JSON-RPC over HTTP.
pub struct RpcClient {
	provider: RootProvider,
}

impl RpcClient {
	/// Connect to `url`.  Every HTTP request is bounded by `request_timeout`.
	pub fn connect(url: &str, request_timeout: Duration) -> Result<Self> {
		let url: Url = url
			.parse()
			.map_err(|e| DeployError::Rpc(format!("invalid RPC url {url:?}: {e}")))?;
		let http = reqwest::Client::builder().timeout(request_timeout).build()?;
		let transport = Http::with_client(http, url);
		let is_local = transport.guess_local();
		Ok(Self {
			provider: RootProvider::new(TransportClient::new(transport, is_local)),
		})
	}
}

impl From<TransportError> for DeployError {
	fn from(err: TransportError) -> Self {
		Self::Rpc(err.to_string())
	}
}

#[async_trait::async_trait]
impl ChainClient for RpcClient {
	async fn chain_id(&self) -> Result<u64> {
		Ok(self.provider.get_chain_id().await?)
	}

	async fn accounts(&self) -> Result<Vec<Address>> {
		Ok(self.provider.get_accounts().await?)
	}

	async fn send_transaction(
		&self,
		tx: &TransactionRequest,
		policy: &ConfirmationPolicy,
	) -> Result<TxReceipt> {
		// Nodes reject reverting transactions at gas estimation time, so an
		// error here is a failed transaction rather than transport noise.
		let pending = self
			.provider
			.send_transaction(tx.clone())
			.await
			.map_err(|e| DeployError::Transaction(e.to_string()))?;
		let hash = *pending.tx_hash();
		tracing::debug!(%hash, "transaction submitted");

		let receipt = pending
			.with_required_confirmations(policy.confirmations)
			.with_timeout(Some(policy.timeout))
			.get_receipt()
			.await
			.map_err(|e| DeployError::Transaction(format!("{hash}: {e}")))?;
		Ok(receipt.into())
	}

	async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
		let request = TransactionRequest {
			to: Some(TxKind::Call(to)),
			input: TransactionInput::both(data),
			..Default::default()
		};
		Ok(self.provider.call(&request).await?)
	}
}
