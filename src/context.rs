use std::path::PathBuf;
use std::sync::Arc;

use alloy::rpc::types::TransactionRequest;
use alloy_primitives::Address;
use alloy_sol_types::SolCall;
use tokio_util::sync::CancellationToken;

use crate::artifacts::ArtifactStore;
use crate::deployments::{DeploymentRecord, DeploymentRegistry};
use crate::error::{DeployError, Result};
use crate::fulfillment::FulfillmentWaiter;
use crate::networks::{NetworkConfigTable, NetworkKind, NetworkParameters};
use crate::rpc::{self, ChainClient, TxReceipt};
use crate::tx::{self, ConfirmationPolicy};

/// Knobs for a run that do not depend on which chain it targets.
#[derive(Debug, Clone)]
pub struct RunSettings {
	/// Submitting account; the node's first account when `None`.
	pub deployer: Option<Address>,
	pub artifacts_dir: PathBuf,
	/// Parent of the per-network record directories.  `None` keeps records
	/// in memory for this run only.
	pub deployments_dir: Option<PathBuf>,
	pub svg_asset: PathBuf,
	pub confirmation: ConfirmationPolicy,
	/// Once cancelled, no further transaction is sent and any wait in
	/// progress is abandoned.
	pub cancel: CancellationToken,
}

/// Everything a deployment script needs: the chain, who is deploying, the
/// resolved network, and the records written so far.
pub struct DeployContext {
	pub client: Arc<dyn ChainClient>,
	pub network: NetworkKind,
	pub params: NetworkParameters,
	pub deployer: Address,
	pub artifacts: ArtifactStore,
	pub registry: DeploymentRegistry,
	pub svg_asset: PathBuf,
	pub confirmation: ConfirmationPolicy,
	pub waiter: Box<dyn FulfillmentWaiter>,
	pub cancel: CancellationToken,
}

impl DeployContext {
	/// Ask the node which chain it is on and resolve everything that hangs
	/// off that answer.  Fails with [`DeployError::UnknownChain`] before any
	/// transaction is sent if the table has no entry.
	pub async fn connect(
		client: Arc<dyn ChainClient>,
		table: &NetworkConfigTable,
		settings: RunSettings,
		waiter: Box<dyn FulfillmentWaiter>,
	) -> Result<Self> {
		let chain_id = client.chain_id().await?;
		let network = NetworkKind::resolve(chain_id);
		let params = table.lookup(chain_id)?.clone();

		let deployer = match settings.deployer {
			Some(addr) => addr,
			None => client
				.accounts()
				.await?
				.into_iter()
				.next()
				.ok_or_else(|| DeployError::Rpc("node exposes no unlocked accounts".into()))?,
		};

		let registry = match &settings.deployments_dir {
			Some(dir) => DeploymentRegistry::open(dir.join(&params.name))?,
			None => DeploymentRegistry::in_memory(),
		};

		tracing::info!(network = %params.name, %network, %deployer, "connected");

		Ok(Self {
			client,
			network,
			params,
			deployer,
			artifacts: ArtifactStore::new(settings.artifacts_dir),
			registry,
			svg_asset: settings.svg_asset,
			confirmation: settings.confirmation,
			waiter,
			cancel: settings.cancel,
		})
	}

	/// Deploy `name` from its compiled artifact with ABI-encoded constructor
	/// arguments appended, and record the result.
	pub async fn deploy(
		&mut self,
		name: &str,
		constructor_args: Vec<u8>,
		display_args: Vec<String>,
	) -> Result<DeploymentRecord> {
		let mut code = self.artifacts.load(name)?.creation_code()?.to_vec();
		code.extend_from_slice(&constructor_args);

		tracing::info!(contract = name, "deploying");
		let receipt = self
			.send(rpc::create_request(self.deployer, code))
			.await?;
		let address = receipt.contract_address.ok_or_else(|| {
			DeployError::Transaction(format!(
				"{name} deployment {} produced no contract address",
				receipt.transaction_hash
			))
		})?;
		tracing::info!(
			contract = name,
			%address,
			tx = %receipt.transaction_hash,
			gas = receipt.gas_used,
			"deployed"
		);

		let record = DeploymentRecord {
			contract_name: name.to_owned(),
			address,
			transaction_hash: receipt.transaction_hash,
			deployer: self.deployer,
			args: display_args,
			block_number: receipt.block_number,
			deployed_at: chrono::Utc::now(),
		};
		self.registry.insert(record.clone())?;
		Ok(record)
	}

	/// Look up a contract deployed earlier in this run (or a previous one).
	pub fn get(&self, name: &str) -> Result<&DeploymentRecord> {
		self.registry
			.get(name)
			.ok_or_else(|| DeployError::MissingDependency {
				name: name.to_owned(),
				chain_id: self.network.chain_id(),
			})
	}

	/// Build a state-changing call from the deployer to `to`.
	pub fn transaction<C: SolCall>(&self, to: Address, call: &C) -> TransactionRequest {
		rpc::call_request(self.deployer, to, call.abi_encode())
	}

	/// Submit and wait for confirmation under the run's policy.  Fails with
	/// [`DeployError::Cancelled`] without sending anything once the run has
	/// been cancelled, and stops waiting if cancellation arrives mid-flight.
	pub async fn send(&self, tx: TransactionRequest) -> Result<TxReceipt> {
		if self.cancel.is_cancelled() {
			return Err(DeployError::Cancelled);
		}
		tokio::select! {
			_ = self.cancel.cancelled() => {
				tracing::warn!("cancelled while waiting for a transaction");
				Err(DeployError::Cancelled)
			}
			res = tx::submit(self.client.as_ref(), &tx, &self.confirmation) => res,
		}
	}
}
