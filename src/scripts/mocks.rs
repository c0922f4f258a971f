use alloy_sol_types::SolConstructor;

use super::{LINK_TOKEN, VRF_COORDINATOR_MOCK};
use crate::abi::VRFCoordinatorMock;
use crate::context::DeployContext;
use crate::deployments::DeploymentRecord;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct MockDeployments {
	pub link_token: DeploymentRecord,
	pub vrf_coordinator: DeploymentRecord,
}

/// On the local chain, deploy the LINK token and VRF coordinator mocks the
/// randomized NFT depends on.  Anywhere else the real contracts exist and
/// this does nothing.
pub async fn provision_if_local(ctx: &mut DeployContext) -> Result<Option<MockDeployments>> {
	if !ctx.network.is_local() {
		return Ok(None);
	}

	tracing::info!("Deploying to local mocks!");
	let link_token = ctx.deploy(LINK_TOKEN, Vec::new(), Vec::new()).await?;

	let args = VRFCoordinatorMock::constructorCall {
		linkToken: link_token.address,
	};
	let vrf_coordinator = ctx
		.deploy(
			VRF_COORDINATOR_MOCK,
			args.abi_encode(),
			vec![link_token.address.to_string()],
		)
		.await?;
	tracing::info!("Mocks Deployed!");

	Ok(Some(MockDeployments {
		link_token,
		vrf_coordinator,
	}))
}
