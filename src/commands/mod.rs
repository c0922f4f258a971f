pub mod deploy;
pub mod deployments;
pub mod init;
pub mod networks;

use std::str::FromStr;

use alloy_primitives::Address;
use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::networks::NetworkConfigTable;
use crate::rpc::{ChainClient, RpcClient};

/// Network name from the CLI flag or config default.
pub fn resolve_network(cli: &Cli, config: &Config) -> String {
	cli.network
		.clone()
		.unwrap_or_else(|| config.network.default.clone())
}

/// Resolve the RPC URL from CLI flag or config, failing for a network the
/// config has no endpoint for.
pub fn resolve_rpc(cli: &Cli, config: &Config) -> Result<String> {
	if let Some(url) = &cli.rpc_url {
		return Ok(url.clone());
	}
	let network = resolve_network(cli, config);
	config.rpc_url(&network).map(str::to_owned).ok_or_else(|| {
		anyhow::anyhow!(
			"No RPC endpoint for network {network:?}. Pass --rpc-url or add it under [network.rpc]."
		)
	})
}

/// JSON-RPC client for the endpoint [`resolve_rpc`] picks.
pub fn connect_client(cli: &Cli, config: &Config) -> Result<RpcClient> {
	let url = resolve_rpc(cli, config)?;
	Ok(RpcClient::connect(&url, config.request_timeout())?)
}

/// Table name of the chain the node is actually on.  Deployment records
/// are filed under this name, whatever `--network` said.
pub async fn network_name(client: &dyn ChainClient, table: &NetworkConfigTable) -> Result<String> {
	let chain_id = client.chain_id().await?;
	Ok(table.lookup(chain_id)?.name.clone())
}

/// Deployer from CLI flag or config; `None` lets the node pick.
pub fn resolve_deployer(cli: &Cli, config: &Config) -> Result<Option<Address>> {
	cli.deployer
		.as_deref()
		.or(config.network.deployer.as_deref())
		.map(|s| {
			Address::from_str(s).map_err(|e| anyhow::anyhow!("invalid deployer address {s:?}: {e}"))
		})
		.transpose()
}
