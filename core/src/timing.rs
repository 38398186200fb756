//! Shared timing constants (spec §4.3, §5).
//!
//! Loaded from the same TOML config both binaries read, with the spec's
//! defaults as fallback, matching the teacher's `toml`-driven config files
//! in `haystack`/`raft` (modernized: `serde` deserialization instead of
//! manual key lookups).

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
	/// How often a primary pings each backup.
	pub ping_ms: u64,
	/// How often a backup's election watchdog and a primary's health
	/// check run.
	pub check_ms: u64,
	/// How long without primary contact before a backup starts an
	/// election.
	pub timeout_ms: u64,
	/// Per-outbound-request timeout; a missing reply is classified as a
	/// `408` the same as an explicit failure (spec §5).
	pub rpc_timeout_ms: u64,
	/// Default replication factor `R` (total family size) used when no
	/// existing family is available to infer it from (spec §4.4A step 2).
	pub replication_factor: usize,
	/// Per-family file count above which a primary refuses further
	/// creating operations (spec §4.4's routability quota, left as a
	/// concrete constant by the original; see DESIGN.md).
	pub quota_files: usize,
}

impl Default for Timing {
	fn default() -> Self {
		Self {
			ping_ms: 500,
			check_ms: 1_000,
			timeout_ms: 3_000,
			rpc_timeout_ms: 2_000,
			replication_factor: 3,
			quota_files: 10_000,
		}
	}
}

impl Timing {
	pub fn ping(&self) -> Duration {
		Duration::from_millis(self.ping_ms)
	}

	pub fn check(&self) -> Duration {
		Duration::from_millis(self.check_ms)
	}

	pub fn timeout(&self) -> Duration {
		Duration::from_millis(self.timeout_ms)
	}

	pub fn rpc_timeout(&self) -> Duration {
		Duration::from_millis(self.rpc_timeout_ms)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_spec() {
		let t = Timing::default();
		assert_eq!(t.ping_ms, 500);
		assert_eq!(t.timeout_ms, 3_000);
	}
}
