use std::path::PathBuf;

use thiserror::Error;

/// Every failure a deployment run can hit.  None of them are recovered
/// locally: the run aborts and the binary exits non-zero.
#[derive(Debug, Error)]
pub enum DeployError {
	/// No network parameters exist for the chain id.
	#[error("no network configuration for chain id {chain_id}")]
	UnknownChain { chain_id: u64 },

	/// A contract address the deployment needs could not be resolved.
	#[error("missing dependency {name} on chain {chain_id}")]
	MissingDependency { name: String, chain_id: u64 },

	/// The local asset file could not be read.
	#[error("failed to read asset {}: {source}", path.display())]
	AssetRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// A submitted transaction reverted or was never confirmed.
	#[error("transaction failed: {0}")]
	Transaction(String),

	/// An expected event was absent or malformed in a receipt.
	#[error("event parse error: {0}")]
	EventParse(String),

	/// Transport or JSON-RPC level failure talking to the node.
	#[error("rpc error: {0}")]
	Rpc(String),

	/// Compiled contract artifact missing or unusable.
	#[error("artifact error: {0}")]
	Artifact(String),

	/// Reading or writing persisted deployment records failed.
	#[error("deployment registry error: {0}")]
	Registry(String),

	#[error("randomness for token {token_id} not fulfilled within {timeout_secs}s")]
	FulfillmentTimeout { token_id: String, timeout_secs: u64 },

	#[error("run cancelled")]
	Cancelled,
}

impl From<reqwest::Error> for DeployError {
	fn from(err: reqwest::Error) -> Self {
		Self::Rpc(err.to_string())
	}
}

pub type Result<T, E = DeployError> = std::result::Result<T, E>;
