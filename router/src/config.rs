//! Router configuration: bind address, data directory, and the initial
//! pool inventory (spec §6 "Persisted state": "the router stores the
//! pool inventory and, for each family_id, the primary address and the
//! backup list").

use std::path::PathBuf;

use clap::Parser;
use distfs_core::order::PeerAddr;
use distfs_core::timing::Timing;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
	/// This router's bind address.
	pub bind_addr: String,
	/// Directory holding the persisted pool inventory and family map.
	pub data_dir: PathBuf,
	/// Initial pool of idle peer addresses, read at startup (spec §1:
	/// "the pool is assumed pre-populated with reachable idle nodes").
	pub initial_pool: Vec<String>,
	#[serde(flatten)]
	pub timing: Timing,
}

impl Default for RouterConfig {
	fn default() -> Self {
		Self {
			bind_addr: "127.0.0.1:8000".to_string(),
			data_dir: PathBuf::from("./data/router"),
			initial_pool: Vec::new(),
			timing: Timing::default(),
		}
	}
}

impl RouterConfig {
	pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
		let config = match path {
			Some(path) => {
				let text = std::fs::read_to_string(path)?;
				toml::from_str(&text)?
			}
			None => RouterConfig::default(),
		};
		Ok(config)
	}

	pub fn initial_pool_addrs(&self) -> Vec<PeerAddr> {
		self.initial_pool.iter().cloned().map(PeerAddr::new).collect()
	}
}

/// CLI surface for `routerd`.
#[derive(Debug, Parser)]
#[command(name = "routerd", about = "distfs pool allocator and dispatcher")]
pub struct RouterArgs {
	/// Path to a TOML config file.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Overrides `bind_addr` from the config file.
	#[arg(long)]
	pub addr: Option<String>,
}

impl RouterArgs {
	pub fn into_config(self) -> anyhow::Result<RouterConfig> {
		let mut config = RouterConfig::load(self.config.as_deref())?;
		if let Some(addr) = self.addr {
			config.bind_addr = addr;
		}
		Ok(config)
	}
}
