use std::sync::Arc;

use anyhow::Result;
use tokio_util::sync::CancellationToken;

use crate::cli::Cli;
use crate::commands::{connect_client, resolve_deployer};
use crate::config::Config;
use crate::context::{DeployContext, RunSettings};
use crate::error::DeployError;
use crate::fulfillment::PollingWaiter;
use crate::scripts::{self, ScriptOutcome, Tag};
use crate::tx::ConfirmationPolicy;

pub async fn run(cli: &Cli, tags: &[Tag]) -> Result<()> {
	let config = Config::load(cli.config.as_deref())?;
	let table = config.network_table()?;
	let client = Arc::new(connect_client(cli, &config)?);

	// Installing a Ctrl-C handler replaces the default SIGINT exit, so the
	// token has to reach every step of the run.
	let cancel = CancellationToken::new();
	let on_signal = cancel.clone();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			tracing::warn!("interrupt received, cancelling");
			on_signal.cancel();
		}
	});

	let settings = RunSettings {
		deployer: resolve_deployer(cli, &config)?,
		artifacts_dir: config.paths.artifacts.clone(),
		deployments_dir: Some(config.paths.deployments.clone()),
		svg_asset: config.paths.svg_asset.clone(),
		confirmation: ConfirmationPolicy {
			confirmations: config.timing.confirmations,
			timeout: config.receipt_timeout(),
		},
		cancel: cancel.clone(),
	};
	let waiter = PollingWaiter::new(
		config.fulfillment_timeout(),
		config.poll_interval(),
		cancel.clone(),
	);

	let run = async {
		let mut ctx = DeployContext::connect(client, &table, settings, Box::new(waiter)).await?;
		let outcomes = scripts::run_tagged(&mut ctx, tags).await?;
		Ok::<_, DeployError>((ctx, outcomes))
	};
	let (ctx, outcomes) = tokio::select! {
		res = run => res?,
		_ = cancel.cancelled() => return Err(DeployError::Cancelled.into()),
	};

	println!();
	println!("Deployed to {} ({})", ctx.params.name, ctx.network);
	for outcome in &outcomes {
		print_outcome(outcome);
	}
	Ok(())
}

fn print_outcome(outcome: &ScriptOutcome) {
	match outcome {
		ScriptOutcome::Mocks(None) => {}
		ScriptOutcome::Mocks(Some(mocks)) => {
			println!("  LinkToken:          {}", mocks.link_token.address);
			println!("  VRFCoordinatorMock: {}", mocks.vrf_coordinator.address);
		}
		ScriptOutcome::SvgNft(svg) => {
			println!("  SVGNFT:             {}", svg.deployment.address);
			println!("    token {} uri {} chars", svg.token_id, svg.token_uri.len());
		}
		ScriptOutcome::RandomSvg(rsvg) => {
			println!("  RandomSVG:          {}", rsvg.deployment.address);
			println!("    token {} uri {} chars", rsvg.token_id, rsvg.token_uri.len());
		}
	}
}
