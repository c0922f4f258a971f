use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolConstructor;

use super::{LINK_TOKEN, RANDOM_SVG, VRF_COORDINATOR_MOCK};
use crate::abi::{self, LinkToken, RandomSVG, VRFCoordinatorMock};
use crate::context::DeployContext;
use crate::deployments::DeploymentRecord;
use crate::error::{DeployError, Result};
use crate::networks::NetworkKind;

/// LINK sent to the freshly deployed contract to pay for its VRF request.
pub const FUNDING_AMOUNT: u128 = 200_000_000_000_000;
pub const CREATE_GAS_LIMIT: u64 = 300_000;
pub const FINISH_GAS_LIMIT: u64 = 2_000_000;
/// 20 gwei, only set on live networks.
pub const LIVE_GAS_PRICE: u128 = 20_000_000_000;
/// Randomness the mock coordinator hands back on the local chain.
pub const MOCK_RANDOMNESS: u64 = 476_473;

/// Progress of a single randomized mint.
///
/// `Deployed -> Requested -> Waiting -> Finished` on live networks,
/// `Deployed -> Requested -> Fulfilling -> Finished` locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintStage {
	Deployed,
	Requested,
	/// Waiting on the external oracle.
	Waiting,
	/// Driving the mock coordinator's callback ourselves.
	Fulfilling,
	Finished,
}

#[derive(Debug, Clone)]
pub struct RandomizedAssetOutcome {
	pub deployment: DeploymentRecord,
	pub token_id: U256,
	pub request_id: B256,
	pub token_uri: String,
	pub stages: Vec<MintStage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Dependencies {
	link_token: Address,
	vrf_coordinator: Address,
}

/// Local runs use the mocks deployed earlier; live runs use the addresses
/// from the network table.
fn resolve_dependencies(ctx: &DeployContext) -> Result<Dependencies> {
	match ctx.network {
		NetworkKind::Local => Ok(Dependencies {
			link_token: ctx.get(LINK_TOKEN)?.address,
			vrf_coordinator: ctx.get(VRF_COORDINATOR_MOCK)?.address,
		}),
		NetworkKind::Remote(chain_id) => {
			let missing = |name: &str| DeployError::MissingDependency {
				name: name.to_owned(),
				chain_id,
			};
			Ok(Dependencies {
				link_token: ctx.params.link_token.ok_or_else(|| missing("linkToken"))?,
				vrf_coordinator: ctx
					.params
					.vrf_coordinator
					.ok_or_else(|| missing("vrfCoordinator"))?,
			})
		}
	}
}

fn advance(stages: &mut Vec<MintStage>, stage: MintStage) {
	tracing::debug!(?stage, "mint stage");
	stages.push(stage);
}

/// Deploy `RandomSVG`, fund it with LINK, and take one token through the
/// request / fulfil / finish cycle.
pub async fn deploy_randomized_asset(ctx: &mut DeployContext) -> Result<RandomizedAssetOutcome> {
	let deps = resolve_dependencies(ctx)?;
	let key_hash = ctx.params.key_hash;
	let fee = ctx.params.fee;

	let args = RandomSVG::constructorCall {
		vrfCoordinator: deps.vrf_coordinator,
		linkToken: deps.link_token,
		keyHash: key_hash,
		fee,
	};
	let display_args = vec![
		deps.vrf_coordinator.to_string(),
		deps.link_token.to_string(),
		key_hash.to_string(),
		fee.to_string(),
	];
	tracing::info!("----------------------------------------------------");
	let deployment = ctx
		.deploy(RANDOM_SVG, args.abi_encode(), display_args.clone())
		.await?;
	let address = deployment.address;
	let mut stages = Vec::new();
	advance(&mut stages, MintStage::Deployed);
	tracing::info!("Random NFT deployed!!");
	tracing::info!(
		"verify using: --network {} {address} {}",
		ctx.params.name,
		display_args.join(" ")
	);

	let fund = LinkToken::transferCall {
		to: address,
		value: U256::from(FUNDING_AMOUNT),
	};
	ctx.send(ctx.transaction(deps.link_token, &fund)).await?;

	let mut create = ctx.transaction(address, &RandomSVG::createCall {});
	create.gas = Some(CREATE_GAS_LIMIT);
	let receipt = ctx.send(create).await?;
	let requested: RandomSVG::requestedRandomSVG = abi::decode_event(&receipt, address)?;
	let token_id = requested.tokenId;
	let request_id = requested.requestId;
	advance(&mut stages, MintStage::Requested);
	tracing::info!("Created an NFT with tokenId {token_id}");
	tracing::info!("Waiting for chainlink to respond...");

	let mut finish = ctx.transaction(address, &RandomSVG::finishMintCall { tokenId: token_id });
	finish.gas = Some(FINISH_GAS_LIMIT);
	match ctx.network {
		NetworkKind::Remote(_) => {
			advance(&mut stages, MintStage::Waiting);
			ctx.waiter
				.wait_for_randomness(ctx.client.as_ref(), address, token_id)
				.await?;
			finish.gas_price = Some(LIVE_GAS_PRICE);
		}
		NetworkKind::Local => {
			advance(&mut stages, MintStage::Fulfilling);
			let callback = VRFCoordinatorMock::callBackWithRandomnessCall {
				requestId: request_id,
				randomness: U256::from(MOCK_RANDOMNESS),
				consumerContract: address,
			};
			ctx.send(ctx.transaction(deps.vrf_coordinator, &callback))
				.await?;
		}
	}

	tracing::info!("Now lets finish the mint!");
	ctx.send(finish).await?;
	advance(&mut stages, MintStage::Finished);

	let token_uri = abi::view(
		ctx.client.as_ref(),
		address,
		&RandomSVG::tokenURICall { tokenId: token_id },
	)
	.await?
	.uri;
	tracing::info!("You can view the Token here:\n {token_uri}");

	Ok(RandomizedAssetOutcome {
		deployment,
		token_id,
		request_id,
		token_uri,
		stages,
	})
}
