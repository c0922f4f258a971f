use std::path::{Path, PathBuf};
use std::str::FromStr;

use alloy_primitives::Bytes;
use serde::Deserialize;

use crate::error::{DeployError, Result};

/// Compiled contract as emitted by Hardhat (`artifacts/contracts/X.sol/X.json`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
	pub contract_name: String,
	pub bytecode: String,
}

impl Artifact {
	pub fn creation_code(&self) -> Result<Bytes> {
		let code = Bytes::from_str(&self.bytecode).map_err(|e| {
			DeployError::Artifact(format!("{}: invalid bytecode: {e}", self.contract_name))
		})?;
		if code.is_empty() {
			return Err(DeployError::Artifact(format!(
				"{} has no creation code (abstract contract or interface?)",
				self.contract_name
			)));
		}
		Ok(code)
	}
}

/// Looks up artifacts by contract name under a build output directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
	root: PathBuf,
}

impl ArtifactStore {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	/// Load `<Name>.json` from anywhere below the root.  Debug sidecars
	/// (`<Name>.dbg.json`) and build-info files are skipped by name.
	pub fn load(&self, name: &str) -> Result<Artifact> {
		let file_name = format!("{name}.json");
		let path = find_file(&self.root, &file_name)?.ok_or_else(|| {
			DeployError::Artifact(format!("{file_name} not found under {}", self.root.display()))
		})?;

		let content = std::fs::read_to_string(&path)
			.map_err(|e| DeployError::Artifact(format!("reading {}: {e}", path.display())))?;
		serde_json::from_str(&content)
			.map_err(|e| DeployError::Artifact(format!("parsing {}: {e}", path.display())))
	}
}

fn find_file(dir: &Path, file_name: &str) -> Result<Option<PathBuf>> {
	let entries = std::fs::read_dir(dir)
		.map_err(|e| DeployError::Artifact(format!("reading {}: {e}", dir.display())))?;

	let mut subdirs = Vec::new();
	for entry in entries {
		let entry = entry.map_err(|e| DeployError::Artifact(e.to_string()))?;
		let path = entry.path();
		if path.is_dir() {
			subdirs.push(path);
		} else if entry.file_name().to_str() == Some(file_name) {
			return Ok(Some(path));
		}
	}

	subdirs.sort();
	for sub in subdirs {
		if let Some(found) = find_file(&sub, file_name)? {
			return Ok(Some(found));
		}
	}
	Ok(None)
}
