use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use alloy_primitives::{address, b256, Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

pub type ChainId = u64;

/// Chain id of the local development node (Hardhat / Anvil).
pub const LOCAL_CHAIN_ID: ChainId = 31337;

/// Where a run is pointed.  Resolved once from the node's chain id and
/// passed down so nothing else compares chain ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkKind {
	Local,
	Remote(ChainId),
}

impl NetworkKind {
	pub fn resolve(chain_id: ChainId) -> Self {
		if chain_id == LOCAL_CHAIN_ID {
			Self::Local
		} else {
			Self::Remote(chain_id)
		}
	}

	pub fn chain_id(&self) -> ChainId {
		match self {
			Self::Local => LOCAL_CHAIN_ID,
			Self::Remote(id) => *id,
		}
	}

	pub fn is_local(&self) -> bool {
		matches!(self, Self::Local)
	}
}

impl fmt::Display for NetworkKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Local => write!(f, "local ({LOCAL_CHAIN_ID})"),
			Self::Remote(id) => write!(f, "remote ({id})"),
		}
	}
}

/// Deployment parameters for a single chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParameters {
	pub chain_id: ChainId,
	/// Human-readable network name, also used as the deployments subdirectory.
	pub name: String,
	/// LINK token.  Absent on the local chain where a mock is deployed.
	pub link_token: Option<Address>,
	/// VRF coordinator.  Absent on the local chain where a mock is deployed.
	pub vrf_coordinator: Option<Address>,
	/// LINK fee paid per randomness request.
	pub fee: U256,
	/// Key hash identifying the VRF proving key.
	pub key_hash: B256,
}

/// String-typed chain entry as written in the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
	pub name: String,
	pub link_token: Option<String>,
	pub vrf_coordinator: Option<String>,
	pub key_hash: String,
	pub fee: String,
}

impl ChainEntry {
	pub fn parse(&self, chain_id: ChainId) -> anyhow::Result<NetworkParameters> {
		let parse_addr = |field: &str, value: &Option<String>| -> anyhow::Result<Option<Address>> {
			value
				.as_deref()
				.map(|s| {
					Address::from_str(s)
						.map_err(|e| anyhow::anyhow!("chain {chain_id}: invalid {field} {s:?}: {e}"))
				})
				.transpose()
		};

		Ok(NetworkParameters {
			chain_id,
			name: self.name.clone(),
			link_token: parse_addr("link_token", &self.link_token)?,
			vrf_coordinator: parse_addr("vrf_coordinator", &self.vrf_coordinator)?,
			key_hash: B256::from_str(&self.key_hash).map_err(|e| {
				anyhow::anyhow!("chain {chain_id}: invalid key_hash {:?}: {e}", self.key_hash)
			})?,
			fee: U256::from_str(&self.fee)
				.map_err(|e| anyhow::anyhow!("chain {chain_id}: invalid fee {:?}: {e}", self.fee))?,
		})
	}
}

/// Immutable lookup table from chain id to [`NetworkParameters`].
#[derive(Debug, Clone, Default)]
pub struct NetworkConfigTable {
	chains: BTreeMap<ChainId, NetworkParameters>,
}

impl NetworkConfigTable {
	pub fn new(entries: impl IntoIterator<Item = NetworkParameters>) -> Self {
		Self {
			chains: entries.into_iter().map(|p| (p.chain_id, p)).collect(),
		}
	}

	/// The networks the NFT contracts have been deployed to.
	pub fn builtin() -> Self {
		let rinkeby_key_hash =
			b256!("2ed0feb3e7fd2022120aa84fab1945545a9f2ffc9076fd6156fa96eaff4c1311");

		Self::new([
			NetworkParameters {
				chain_id: LOCAL_CHAIN_ID,
				name: "localhost".into(),
				link_token: None,
				vrf_coordinator: None,
				key_hash: rinkeby_key_hash,
				fee: U256::from(100_000_000_000_000_000u128),
			},
			NetworkParameters {
				chain_id: 4,
				name: "rinkeby".into(),
				link_token: Some(address!("01BE23585060835E02B77ef475b0Cc51aA1e0709")),
				vrf_coordinator: Some(address!("b3dCcb4Cf7a26f6cf6B120Cf5A73875B7BBc655B")),
				key_hash: rinkeby_key_hash,
				fee: U256::from(100_000_000_000_000_000u128),
			},
			NetworkParameters {
				chain_id: 80001,
				name: "polygon".into(),
				link_token: Some(address!("326C977E6efc84E512bB9C30f76E30c160eD06FB")),
				vrf_coordinator: Some(address!("8C7382F9D8f56b33781fE506E897a4F1e2d17255")),
				key_hash: b256!("6e75b569a01ef56d18cab6a8e71e6600d6ce853834d4a5748b720d06f878b3a4"),
				fee: U256::from(100_000_000_000_000u128),
			},
		])
	}

	/// Merge entries from the config file over this table.  Keys are decimal
	/// chain ids; an entry for an existing chain id replaces it wholesale.
	pub fn with_overrides(mut self, entries: &BTreeMap<String, ChainEntry>) -> anyhow::Result<Self> {
		for (key, entry) in entries {
			let chain_id: ChainId = key
				.parse()
				.map_err(|e| anyhow::anyhow!("invalid chain id {key:?}: {e}"))?;
			self.chains.insert(chain_id, entry.parse(chain_id)?);
		}
		Ok(self)
	}

	pub fn lookup(&self, chain_id: ChainId) -> Result<&NetworkParameters> {
		self.chains
			.get(&chain_id)
			.ok_or(DeployError::UnknownChain { chain_id })
	}

	pub fn iter(&self) -> impl Iterator<Item = &NetworkParameters> {
		self.chains.values()
	}
}
