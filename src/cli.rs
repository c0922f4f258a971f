use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::scripts::Tag;

#[derive(Parser)]
#[command(
	name = "nft-deploy",
	about = "Deploy the on-chain SVG NFT and its VRF-randomized sibling.",
	version
)]
pub struct Cli {
	/// Network name from the config file (e.g. localhost, rinkeby, polygon).
	#[arg(long, global = true)]
	pub network: Option<String>,

	/// Override RPC endpoint URL.
	#[arg(long, env = "RPC_URL", global = true)]
	pub rpc_url: Option<String>,

	/// Account that submits transactions (must be unlocked on the node).
	#[arg(long, env = "DEPLOYER", global = true)]
	pub deployer: Option<String>,

	/// Config file to use instead of ~/.nft-deploy/config.toml.
	#[arg(long, global = true)]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
	/// Run the deployment scripts matching the given tags.
	Deploy {
		/// Comma-separated script tags.
		#[arg(long, value_enum, value_delimiter = ',', default_value = "all")]
		tags: Vec<Tag>,
	},

	/// Show the network parameter table.
	Networks,

	/// Show contracts recorded for the chain the node is on.
	Deployments,

	/// Write a default config file.
	Init {
		/// Overwrite an existing file.
		#[arg(long)]
		force: bool,
	},
}
