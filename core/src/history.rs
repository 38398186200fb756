//! Append-only operation history (spec §3, §4.3D, §9).
//!
//! A family's source of truth for replay: the primary appends under a
//! lock that excludes concurrent appends, and onboarding a peer is simply
//! "iterate and apply" from the start.

use std::sync::Mutex;

use crate::error::Result;
use crate::fs::LocalStore;
use crate::record::OperationRecord;

#[derive(Default)]
pub struct History {
	records: Mutex<Vec<OperationRecord>>,
}

impl History {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `record`, returning the index it was stored at.
	pub fn append(&self, record: OperationRecord) -> usize {
		let mut guard = self.records.lock().expect("history mutex poisoned");
		guard.push(record);
		guard.len() - 1
	}

	pub fn len(&self) -> usize {
		self.records.lock().expect("history mutex poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// A point-in-time copy of every record accepted so far, used to
	/// replay onto a freshly onboarded or replaced backup (§4.3C step 5,
	/// §4.3E step 3) without holding the lock during the replay's I/O.
	pub fn snapshot(&self) -> Vec<OperationRecord> {
		self.records.lock().expect("history mutex poisoned").clone()
	}

	/// Applies every record in order to `store`. Used for replay onto a
	/// new peer and for local tests of replication convergence.
	pub fn replay_into(&self, store: &LocalStore) -> Result<()> {
		for record in self.snapshot() {
			record.apply(store)?;
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn append_then_replay_converges() {
		let dir = tempfile::tempdir().unwrap();
		let primary = LocalStore::open(dir.path().join("primary")).unwrap();
		let backup = LocalStore::open(dir.path().join("backup")).unwrap();

		let history = History::new();
		let write = OperationRecord::Write { path: "a.txt".into(), data: b"hello".to_vec() };
		write.apply(&primary).unwrap();
		history.append(write);

		let rename = OperationRecord::Rename { old: "a.txt".into(), new: "b.txt".into() };
		rename.apply(&primary).unwrap();
		history.append(rename);

		history.replay_into(&backup).unwrap();

		assert_eq!(primary.exists("b.txt"), backup.exists("b.txt"));
		assert_eq!(backup.read("b.txt").unwrap(), b"hello");
	}

	#[test]
	fn snapshot_is_a_prefix_at_every_instant() {
		let history = History::new();
		history.append(OperationRecord::Write { path: "a".into(), data: vec![] });
		let first_snapshot = history.snapshot();
		history.append(OperationRecord::Write { path: "b".into(), data: vec![] });
		let second_snapshot = history.snapshot();

		assert!(second_snapshot.starts_with(&first_snapshot));
	}
}
