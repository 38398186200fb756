//! Owned router state: the pool, the family map, and the allocation
//! table, each with its own lock per spec §5's "per router" policy.

use std::path::PathBuf;
use std::sync::Arc;

use distfs_core::timing::Timing;

use crate::allocation::Allocator;
use crate::families::Families;
use crate::persistence;
use crate::pool::Pool;

pub struct RouterRuntime {
	pub pool: Pool,
	pub families: Families,
	pub allocator: Arc<Allocator>,
	pub http: reqwest::Client,
	pub timing: Timing,
	data_dir: Option<PathBuf>,
}

impl RouterRuntime {
	/// Fresh, empty, in-memory state with persistence disabled — for
	/// tests and anything that doesn't want `persist()` touching disk.
	pub fn new(timing: Timing) -> Self {
		Self {
			pool: Pool::new(),
			families: Families::new(),
			allocator: Arc::new(Allocator::new()),
			http: reqwest::Client::builder().timeout(timing.rpc_timeout()).build().expect("failed to build http client"),
			timing,
			data_dir: None,
		}
	}

	/// Loads `pool.json`/`families.json` from `data_dir` if present,
	/// starting empty otherwise (spec §6 "Persisted state"). `persist()`
	/// rewrites both files under `data_dir` after every mutation.
	pub fn with_data_dir(timing: Timing, data_dir: PathBuf) -> Self {
		let (pool, families) = persistence::load(&data_dir);
		let next_family_id = families.highest_family_id().map(|id| id.0 + 1).unwrap_or(1);
		Self {
			pool,
			families,
			allocator: Arc::new(Allocator::with_next_id(next_family_id)),
			http: reqwest::Client::builder().timeout(timing.rpc_timeout()).build().expect("failed to build http client"),
			timing,
			data_dir: Some(data_dir),
		}
	}

	pub fn persist(&self) {
		if let Some(data_dir) = &self.data_dir {
			persistence::save(data_dir, &self.pool, &self.families);
		}
	}
}
