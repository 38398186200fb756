//! Peer configuration (spec §6 "Persisted state", ambient config layer).
//!
//! Loaded from a TOML file with CLI overrides, the same posture as the
//! teacher's `clap` + `toml` combination in `pkg/raft/src/main.rs`
//! (modernized to `clap` v4 derive).

use std::path::PathBuf;

use clap::Parser;
use distfs_core::order::PeerAddr;
use distfs_core::timing::Timing;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerConfig {
	/// This peer's canonical identity address (`host:port`), also its
	/// control/backup endpoint's bind address.
	pub self_addr: String,
	/// The router's control address, used for `request_pool_peer` and
	/// `update_primary` calls.
	pub router_addr: String,
	/// Directory holding this peer's local file store and membership
	/// files.
	pub data_dir: PathBuf,
	#[serde(flatten)]
	pub timing: Timing,
}

impl Default for PeerConfig {
	fn default() -> Self {
		Self {
			self_addr: "127.0.0.1:8100".to_string(),
			router_addr: "127.0.0.1:8000".to_string(),
			data_dir: PathBuf::from("./data/peer"),
			timing: Timing::default(),
		}
	}
}

impl PeerConfig {
	pub fn load(path: Option<&std::path::Path>) -> anyhow::Result<Self> {
		let mut config = match path {
			Some(path) => {
				let text = std::fs::read_to_string(path)?;
				toml::from_str(&text)?
			}
			None => PeerConfig::default(),
		};
		config.apply_env();
		Ok(config)
	}

	fn apply_env(&mut self) {
		if let Ok(addr) = std::env::var("DISTFS_PEER_ADDR") {
			self.self_addr = addr;
		}
		if let Ok(addr) = std::env::var("DISTFS_ROUTER_ADDR") {
			self.router_addr = addr;
		}
	}

	pub fn identity(&self) -> PeerAddr {
		PeerAddr::new(self.self_addr.clone())
	}
}

/// CLI surface for `peerd`, overlaid on top of the TOML config.
#[derive(Debug, Parser)]
#[command(name = "peerd", about = "distfs replica peer daemon")]
pub struct PeerArgs {
	/// Path to a TOML config file.
	#[arg(long)]
	pub config: Option<PathBuf>,

	/// Overrides `self_addr` from the config file.
	#[arg(long)]
	pub addr: Option<String>,

	/// Overrides `router_addr` from the config file.
	#[arg(long)]
	pub router: Option<String>,

	/// Overrides `data_dir` from the config file.
	#[arg(long)]
	pub data_dir: Option<PathBuf>,
}

impl PeerArgs {
	pub fn into_config(self) -> anyhow::Result<PeerConfig> {
		let mut config = PeerConfig::load(self.config.as_deref())?;
		if let Some(addr) = self.addr {
			config.self_addr = addr;
		}
		if let Some(router) = self.router {
			config.router_addr = router;
		}
		if let Some(data_dir) = self.data_dir {
			config.data_dir = data_dir;
		}
		Ok(config)
	}
}
