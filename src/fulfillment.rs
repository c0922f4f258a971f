use std::time::Duration;

use alloy_primitives::{Address, U256};
use tokio_util::sync::CancellationToken;

use crate::abi::{self, RandomSVG};
use crate::error::{DeployError, Result};
use crate::rpc::ChainClient;

/// Waits for an off-chain oracle to deliver randomness to a consumer
/// contract.  Only used on live networks; locally the mock coordinator is
/// driven directly.
#[async_trait::async_trait]
pub trait FulfillmentWaiter: Send + Sync {
	async fn wait_for_randomness(
		&self,
		client: &dyn ChainClient,
		consumer: Address,
		token_id: U256,
	) -> Result<()>;
}

/// Polls `tokenIdToRandomNumber(tokenId)` until the oracle has written a
/// non-zero value, the timeout elapses, or the token is cancelled.
#[derive(Debug, Clone)]
pub struct PollingWaiter {
	pub timeout: Duration,
	pub poll_interval: Duration,
	pub cancel: CancellationToken,
}

impl PollingWaiter {
	pub fn new(timeout: Duration, poll_interval: Duration, cancel: CancellationToken) -> Self {
		Self {
			timeout,
			poll_interval,
			cancel,
		}
	}

	async fn poll(&self, client: &dyn ChainClient, consumer: Address, token_id: U256) -> Result<()> {
		let query = RandomSVG::tokenIdToRandomNumberCall { tokenId: token_id };
		loop {
			let current = abi::view(client, consumer, &query).await?;
			if !current.randomNumber.is_zero() {
				tracing::info!(%token_id, "randomness received");
				return Ok(());
			}
			tokio::time::sleep(self.poll_interval).await;
		}
	}
}

#[async_trait::async_trait]
impl FulfillmentWaiter for PollingWaiter {
	async fn wait_for_randomness(
		&self,
		client: &dyn ChainClient,
		consumer: Address,
		token_id: U256,
	) -> Result<()> {
		tokio::select! {
			_ = self.cancel.cancelled() => Err(DeployError::Cancelled),
			res = tokio::time::timeout(self.timeout, self.poll(client, consumer, token_id)) => {
				res.unwrap_or_else(|_| {
					Err(DeployError::FulfillmentTimeout {
						token_id: token_id.to_string(),
						timeout_secs: self.timeout.as_secs(),
					})
				})
			}
		}
	}
}
