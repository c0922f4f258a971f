use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nft_deploy::cli::{Cli, Command};
use nft_deploy::commands;

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.with_target(false)
		.init();

	let cli = Cli::parse();

	match &cli.command {
		Command::Deploy { tags } => commands::deploy::run(&cli, tags).await,
		Command::Networks => commands::networks::run(&cli),
		Command::Deployments => commands::deployments::run(&cli).await,
		Command::Init { force } => commands::init::run(&cli, *force),
	}
}
