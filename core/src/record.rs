//! Mutating operation records (spec §3, §4.3D).
//!
//! Replaces the teacher's ad hoc per-verb forwarding with a single
//! append-only record type and a pure `apply` function, per the Design
//! Notes' "replication as command log" guidance.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fs::LocalStore;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verb", rename_all = "snake_case")]
pub enum OperationRecord {
	Write { path: String, data: Vec<u8> },
	Delete { path: String },
	Copy { src: String, dst: String },
	Rename { old: String, new: String },
}

impl OperationRecord {
	/// Applies this record to `store`. Used both at the primary (original
	/// application) and at a backup (replication and replay).
	pub fn apply(&self, store: &LocalStore) -> Result<()> {
		match self {
			OperationRecord::Write { path, data } => store.write(path, data),
			OperationRecord::Delete { path } => store.delete(path),
			OperationRecord::Copy { src, dst } => store.copy(src, dst),
			OperationRecord::Rename { old, new } => store.rename(old, new),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store() -> (tempfile::TempDir, LocalStore) {
		let dir = tempfile::tempdir().unwrap();
		let store = LocalStore::open(dir.path()).unwrap();
		(dir, store)
	}

	#[test]
	fn write_record_applies() {
		let (_dir, store) = store();
		let rec = OperationRecord::Write { path: "a.txt".into(), data: b"hi".to_vec() };
		rec.apply(&store).unwrap();
		assert_eq!(store.read("a.txt").unwrap(), b"hi");
	}

	#[test]
	fn delete_record_applies() {
		let (_dir, store) = store();
		store.write("a.txt", b"hi").unwrap();
		OperationRecord::Delete { path: "a.txt".into() }.apply(&store).unwrap();
		assert!(!store.exists("a.txt"));
	}

	#[test]
	fn serde_round_trips() {
		let rec = OperationRecord::Rename { old: "a".into(), new: "b".into() };
		let json = serde_json::to_string(&rec).unwrap();
		let back: OperationRecord = serde_json::from_str(&json).unwrap();
		assert_eq!(rec, back);
	}
}
