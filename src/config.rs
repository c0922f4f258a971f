use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::networks::{ChainEntry, NetworkConfigTable};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
	pub network: NetworkConfig,
	pub paths: PathsConfig,
	pub timing: TimingConfig,
	/// Extra or replacement entries for the builtin network table.
	#[serde(default)]
	pub chains: BTreeMap<String, ChainEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
	/// Network name used when `--network` is not given.
	pub default: String,
	/// Account that submits transactions.  Falls back to the node's first
	/// unlocked account.
	pub deployer: Option<String>,
	/// RPC endpoint per network name.
	pub rpc: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
	pub artifacts: PathBuf,
	pub deployments: PathBuf,
	pub svg_asset: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
	pub confirmations: u64,
	pub receipt_timeout_secs: u64,
	pub poll_interval_ms: u64,
	/// Upper bound on waiting for the VRF oracle on live networks.
	pub fulfillment_timeout_secs: u64,
	/// Upper bound on any single JSON-RPC request.
	#[serde(default = "default_request_timeout_secs")]
	pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
	30
}

impl Default for Config {
	fn default() -> Self {
		let rpc = [
			("localhost", "http://127.0.0.1:8545"),
			("rinkeby", "https://rinkeby.infura.io/v3/YOUR_PROJECT_ID"),
			("polygon", "https://rpc-mumbai.maticvigil.com"),
		]
		.into_iter()
		.map(|(name, url)| (name.to_owned(), url.to_owned()))
		.collect();

		Self {
			network: NetworkConfig {
				default: "localhost".into(),
				deployer: None,
				rpc,
			},
			paths: PathsConfig {
				artifacts: "artifacts".into(),
				deployments: "deployments".into(),
				svg_asset: "images/lines.svg".into(),
			},
			timing: TimingConfig {
				confirmations: 1,
				receipt_timeout_secs: 120,
				poll_interval_ms: 1_000,
				fulfillment_timeout_secs: 180,
				request_timeout_secs: default_request_timeout_secs(),
			},
			chains: BTreeMap::new(),
		}
	}
}

impl Config {
	/// Directory where CLI state is stored (~/.nft-deploy/).
	pub fn dir() -> anyhow::Result<PathBuf> {
		dirs::home_dir()
			.map(|home| home.join(".nft-deploy"))
			.context("could not determine home directory")
	}

	/// Path to the default config file.
	pub fn path() -> anyhow::Result<PathBuf> {
		Ok(Self::dir()?.join("config.toml"))
	}

	/// Load config from `path` (or the default location), falling back to
	/// defaults if no file exists.
	pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
		let path = match path {
			Some(p) => p.to_path_buf(),
			None => Self::path()?,
		};
		if path.exists() {
			let content = std::fs::read_to_string(&path)
				.with_context(|| format!("reading {}", path.display()))?;
			toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
		} else {
			Ok(Self::default())
		}
	}

	/// Persist the current config, creating the directory if needed.
	pub fn save(&self, path: Option<&Path>) -> anyhow::Result<()> {
		let path = match path {
			Some(p) => p.to_path_buf(),
			None => Self::path()?,
		};
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&path, toml::to_string_pretty(self)?)?;
		Ok(())
	}

	/// Return the RPC URL for the given network name.
	pub fn rpc_url(&self, network: &str) -> Option<&str> {
		self.network.rpc.get(network).map(String::as_str)
	}

	/// Builtin network table with this config's `[chains]` entries applied.
	pub fn network_table(&self) -> anyhow::Result<NetworkConfigTable> {
		NetworkConfigTable::builtin().with_overrides(&self.chains)
	}

	pub fn receipt_timeout(&self) -> Duration {
		Duration::from_secs(self.timing.receipt_timeout_secs)
	}

	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.timing.poll_interval_ms)
	}

	pub fn fulfillment_timeout(&self) -> Duration {
		Duration::from_secs(self.timing.fulfillment_timeout_secs)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.timing.request_timeout_secs)
	}
}
