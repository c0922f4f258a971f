use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

/// What a deploy step leaves behind: where the contract lives and how it
/// got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
	pub contract_name: String,
	pub address: Address,
	pub transaction_hash: B256,
	pub deployer: Address,
	/// Constructor arguments, rendered for display and verification.
	#[serde(default)]
	pub args: Vec<String>,
	pub block_number: u64,
	pub deployed_at: DateTime<Utc>,
}

/// Name-keyed deployment records for one network.
///
/// With a directory attached, every record is also written to
/// `<dir>/<Name>.json` and existing files are loaded on open, so later
/// runs can see earlier deployments.
#[derive(Debug, Default)]
pub struct DeploymentRegistry {
	records: BTreeMap<String, DeploymentRecord>,
	dir: Option<PathBuf>,
}

impl DeploymentRegistry {
	/// Registry that lives only for the current run.
	pub fn in_memory() -> Self {
		Self::default()
	}

	/// Open (and create if needed) the per-network directory and load every
	/// record in it.
	pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
		let dir = dir.into();
		std::fs::create_dir_all(&dir)
			.map_err(|e| DeployError::Registry(format!("creating {}: {e}", dir.display())))?;

		let mut records = BTreeMap::new();
		let entries = std::fs::read_dir(&dir)
			.map_err(|e| DeployError::Registry(format!("reading {}: {e}", dir.display())))?;
		for entry in entries {
			let path = entry.map_err(|e| DeployError::Registry(e.to_string()))?.path();
			if path.extension().and_then(|e| e.to_str()) != Some("json") {
				continue;
			}
			let record = read_record(&path)?;
			records.insert(record.contract_name.clone(), record);
		}

		Ok(Self {
			records,
			dir: Some(dir),
		})
	}

	/// Store a record, replacing any previous one under the same name.
	pub fn insert(&mut self, record: DeploymentRecord) -> Result<()> {
		if let Some(dir) = &self.dir {
			let path = dir.join(format!("{}.json", record.contract_name));
			let body = serde_json::to_string_pretty(&record)
				.map_err(|e| DeployError::Registry(e.to_string()))?;
			std::fs::write(&path, body)
				.map_err(|e| DeployError::Registry(format!("writing {}: {e}", path.display())))?;
		}
		self.records.insert(record.contract_name.clone(), record);
		Ok(())
	}

	pub fn get(&self, name: &str) -> Option<&DeploymentRecord> {
		self.records.get(name)
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &DeploymentRecord> {
		self.records.values()
	}
}

fn read_record(path: &Path) -> Result<DeploymentRecord> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| DeployError::Registry(format!("reading {}: {e}", path.display())))?;
	serde_json::from_str(&content)
		.map_err(|e| DeployError::Registry(format!("parsing {}: {e}", path.display())))
}
