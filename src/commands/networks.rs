use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::networks::NetworkKind;

pub fn run(cli: &Cli) -> Result<()> {
	let config = Config::load(cli.config.as_deref())?;
	let table = config.network_table()?;

	for params in table.iter() {
		let rpc = config.rpc_url(&params.name).unwrap_or("-");
		println!("{} ({})", params.name, NetworkKind::resolve(params.chain_id));
		println!("  RPC:             {rpc}");
		match (params.link_token, params.vrf_coordinator) {
			(Some(link), Some(vrf)) => {
				println!("  LINK token:      {link}");
				println!("  VRF coordinator: {vrf}");
			}
			_ => println!("  Dependencies:    deployed as mocks"),
		}
		println!("  Key hash:        {}", params.key_hash);
		println!("  Fee:             {}", params.fee);
	}
	Ok(())
}
