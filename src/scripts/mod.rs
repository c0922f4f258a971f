//! The deployment scripts, in the order they run.

pub mod mocks;
pub mod random_svg;
pub mod svg_nft;

use clap::ValueEnum;

use crate::context::DeployContext;
use crate::error::Result;

pub use mocks::{provision_if_local, MockDeployments};
pub use random_svg::{deploy_randomized_asset, MintStage, RandomizedAssetOutcome};
pub use svg_nft::{deploy_static_asset, StaticAssetOutcome};

pub const LINK_TOKEN: &str = "LinkToken";
pub const VRF_COORDINATOR_MOCK: &str = "VRFCoordinatorMock";
pub const SVG_NFT: &str = "SVGNFT";
pub const RANDOM_SVG: &str = "RandomSVG";

/// Script selector accepted by `deploy --tags`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tag {
	All,
	/// The static on-chain SVG NFT.
	Svg,
	/// The VRF-randomized SVG NFT.
	Rsvg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployScript {
	Mocks,
	SvgNft,
	RandomSvg,
}

impl DeployScript {
	pub const ORDERED: [DeployScript; 3] = [Self::Mocks, Self::SvgNft, Self::RandomSvg];

	pub fn name(&self) -> &'static str {
		match self {
			Self::Mocks => "00_deploy_mocks",
			Self::SvgNft => "01_deploy_svg_nft",
			Self::RandomSvg => "02_deploy_random_svg",
		}
	}

	pub fn tags(&self) -> &'static [Tag] {
		match self {
			Self::Mocks => &[Tag::All, Tag::Rsvg, Tag::Svg],
			Self::SvgNft => &[Tag::All, Tag::Svg],
			Self::RandomSvg => &[Tag::All, Tag::Rsvg],
		}
	}

	/// Scripts carrying any of `tags`, in run order.
	pub fn selected(tags: &[Tag]) -> Vec<DeployScript> {
		Self::ORDERED
			.into_iter()
			.filter(|script| script.tags().iter().any(|t| tags.contains(t)))
			.collect()
	}

	pub async fn run(&self, ctx: &mut DeployContext) -> Result<ScriptOutcome> {
		Ok(match self {
			Self::Mocks => ScriptOutcome::Mocks(provision_if_local(ctx).await?),
			Self::SvgNft => ScriptOutcome::SvgNft(deploy_static_asset(ctx).await?),
			Self::RandomSvg => ScriptOutcome::RandomSvg(deploy_randomized_asset(ctx).await?),
		})
	}
}

#[derive(Debug, Clone)]
pub enum ScriptOutcome {
	/// `None` when the target is not the local chain.
	Mocks(Option<MockDeployments>),
	SvgNft(StaticAssetOutcome),
	RandomSvg(RandomizedAssetOutcome),
}

/// Run every script matching `tags`, stopping at the first failure.
pub async fn run_tagged(ctx: &mut DeployContext, tags: &[Tag]) -> Result<Vec<ScriptOutcome>> {
	let mut outcomes = Vec::new();
	for script in DeployScript::selected(tags) {
		tracing::info!(script = script.name(), "running");
		outcomes.push(script.run(ctx).await?);
	}
	Ok(outcomes)
}
