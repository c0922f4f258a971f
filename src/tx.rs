use std::time::Duration;

use alloy::rpc::types::TransactionRequest;

use crate::error::{DeployError, Result};
use crate::rpc::{ChainClient, TxReceipt};

/// How long and how deep to wait before a transaction counts as included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationPolicy {
	/// Blocks, including the inclusion block, that must exist on top.
	pub confirmations: u64,
	pub timeout: Duration,
}

impl Default for ConfirmationPolicy {
	fn default() -> Self {
		Self {
			confirmations: 1,
			timeout: Duration::from_secs(120),
		}
	}
}

/// Send a transaction and wait until it has the required confirmations.
///
/// A reverted receipt, or one that never shows up within the policy
/// timeout, is a [`DeployError::Transaction`].  Nothing is retried.
pub async fn submit(
	client: &dyn ChainClient,
	tx: &TransactionRequest,
	policy: &ConfirmationPolicy,
) -> Result<TxReceipt> {
	let receipt = client.send_transaction(tx, policy).await?;
	if !receipt.success {
		return Err(DeployError::Transaction(format!(
			"{} reverted in block {}",
			receipt.transaction_hash, receipt.block_number
		)));
	}
	tracing::debug!(
		hash = %receipt.transaction_hash,
		block = receipt.block_number,
		"transaction confirmed"
	);
	Ok(receipt)
}
