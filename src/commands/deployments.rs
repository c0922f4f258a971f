use anyhow::Result;

use crate::cli::Cli;
use crate::commands::{connect_client, network_name};
use crate::config::Config;
use crate::deployments::DeploymentRegistry;

pub async fn run(cli: &Cli) -> Result<()> {
	let config = Config::load(cli.config.as_deref())?;
	let table = config.network_table()?;
	let client = connect_client(cli, &config)?;
	// Same directory `deploy` writes to: named after the node's chain.
	let network = network_name(&client, &table).await?;
	let dir = config.paths.deployments.join(&network);

	if !dir.is_dir() {
		println!("No deployments recorded for {network}.");
		return Ok(());
	}

	let registry = DeploymentRegistry::open(&dir)?;
	for record in registry.iter() {
		println!("{}  {}", record.contract_name, record.address);
		println!("  tx:    {}", record.transaction_hash);
		println!("  block: {}", record.block_number);
		println!("  at:    {}", record.deployed_at.to_rfc3339());
		if !record.args.is_empty() {
			println!("  args:  {}", record.args.join(" "));
		}
	}
	println!("\n{} contract(s) on {network}.", registry.len());
	Ok(())
}
