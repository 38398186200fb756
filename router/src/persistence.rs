//! Router state persistence (spec §6 "Persisted state": "the router
//! stores the pool inventory and, for each family_id, the primary
//! address and the backup list"), loaded at startup and rewritten after
//! every mutation — the same "serialize the whole thing back out"
//! posture [`crate::membership::Membership`] uses at each peer.

use std::path::Path;

use distfs_core::rpc::FamilyId;
use serde::{Deserialize, Serialize};

use crate::families::{FamilyRecord, Families};
use crate::pool::Pool;

const POOL_FILE: &str = "pool.json";
const FAMILIES_FILE: &str = "families.json";

#[derive(Serialize, Deserialize)]
struct FamiliesOnDisk(Vec<(FamilyId, FamilyRecord)>);

/// Rewrites both state files under `data_dir`. Failures are logged, not
/// propagated — a router that can't persist keeps serving from memory
/// rather than refusing requests.
pub fn save(data_dir: &Path, pool: &Pool, families: &Families) {
	if let Err(e) = std::fs::create_dir_all(data_dir) {
		tracing::warn!(error = %e, "failed to create router data dir");
		return;
	}

	let pool_json = serde_json::to_string(&pool.snapshot()).unwrap_or_else(|_| "[]".to_string());
	if let Err(e) = std::fs::write(data_dir.join(POOL_FILE), pool_json) {
		tracing::warn!(error = %e, "failed to persist pool inventory");
	}

	let families_on_disk = FamiliesOnDisk(families.snapshot().into_iter().collect());
	let families_json = serde_json::to_string(&families_on_disk).unwrap_or_else(|_| "[]".to_string());
	if let Err(e) = std::fs::write(data_dir.join(FAMILIES_FILE), families_json) {
		tracing::warn!(error = %e, "failed to persist family map");
	}
}

/// Loads both state files under `data_dir`, if present. Returns empty
/// state (not an error) when this is a fresh data directory.
pub fn load(data_dir: &Path) -> (Pool, Families) {
	let pool = match std::fs::read_to_string(data_dir.join(POOL_FILE)) {
		Ok(text) => {
			let addrs: Vec<distfs_core::order::PeerAddr> = serde_json::from_str(&text).unwrap_or_default();
			let pool = Pool::new();
			pool.seed(addrs);
			pool
		}
		Err(_) => Pool::new(),
	};

	let families = match std::fs::read_to_string(data_dir.join(FAMILIES_FILE)) {
		Ok(text) => {
			let on_disk: FamiliesOnDisk = serde_json::from_str(&text).unwrap_or(FamiliesOnDisk(Vec::new()));
			Families::restore(on_disk.0.into_iter().collect())
		}
		Err(_) => Families::new(),
	};

	(pool, families)
}

#[cfg(test)]
mod tests {
	use super::*;
	use distfs_core::order::PeerAddr;

	#[test]
	fn save_then_load_round_trips_pool_and_families() {
		let dir = tempfile::tempdir().unwrap();
		let pool = Pool::new();
		pool.seed([PeerAddr::new("a:1"), PeerAddr::new("b:1")]);
		let families = Families::new();
		families.insert(FamilyId(1), FamilyRecord { primary: PeerAddr::new("p:1"), backups: vec![PeerAddr::new("b:1")] });

		save(dir.path(), &pool, &families);
		let (loaded_pool, loaded_families) = load(dir.path());

		assert_eq!(loaded_pool.len(), 2);
		assert_eq!(loaded_families.primary_of(FamilyId(1)), Some(PeerAddr::new("p:1")));
	}

	#[test]
	fn load_from_empty_dir_is_empty_not_error() {
		let dir = tempfile::tempdir().unwrap();
		let (pool, families) = load(dir.path());
		assert!(pool.is_empty());
		assert_eq!(families.highest_family_id(), None);
	}
}
