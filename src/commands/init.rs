use anyhow::{bail, Result};

use crate::cli::Cli;
use crate::config::Config;

/// Write the default config so it can be edited.
pub fn run(cli: &Cli, force: bool) -> Result<()> {
	let path = match &cli.config {
		Some(p) => p.clone(),
		None => Config::path()?,
	};
	if path.exists() && !force {
		bail!("{} already exists (use --force to overwrite)", path.display());
	}

	Config::default().save(Some(&path))?;
	println!("Wrote {}", path.display());
	Ok(())
}
