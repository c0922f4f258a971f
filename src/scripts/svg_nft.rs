use alloy_primitives::U256;

use super::SVG_NFT;
use crate::abi::{self, SVGNFT};
use crate::context::DeployContext;
use crate::deployments::DeploymentRecord;
use crate::error::{DeployError, Result};

#[derive(Debug, Clone)]
pub struct StaticAssetOutcome {
	pub deployment: DeploymentRecord,
	pub token_id: U256,
	pub token_uri: String,
}

/// Deploy `SVGNFT` and mint one token from the local SVG asset.
///
/// Not idempotent: every call deploys a fresh contract and replaces the
/// recorded one.
pub async fn deploy_static_asset(ctx: &mut DeployContext) -> Result<StaticAssetOutcome> {
	let deployment = ctx.deploy(SVG_NFT, Vec::new(), Vec::new()).await?;
	let address = deployment.address;
	tracing::info!("deployed contract to {address}");

	let svg = std::fs::read_to_string(&ctx.svg_asset).map_err(|source| DeployError::AssetRead {
		path: ctx.svg_asset.clone(),
		source,
	})?;
	tracing::info!("Verify with: --network {} {address}", ctx.params.name);

	ctx.send(ctx.transaction(address, &SVGNFT::createCall { svg }))
		.await?;
	let counter = abi::view(ctx.client.as_ref(), address, &SVGNFT::tokenCounterCall {})
		.await?
		.count;
	let token_id = counter.checked_sub(U256::from(1)).ok_or_else(|| {
		DeployError::Transaction(format!("create on {address} minted no token"))
	})?;
	tracing::info!(%token_id, "You've made an NFT");

	let token_uri = abi::view(
		ctx.client.as_ref(),
		address,
		&SVGNFT::tokenURICall { tokenId: token_id },
	)
	.await?
	.uri;
	tracing::info!("You can view the tokenURI here {token_uri}");

	Ok(StaticAssetOutcome {
		deployment,
		token_id,
		token_uri,
	})
}
