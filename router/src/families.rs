//! The router's family map `F` (spec §4.4): one live primary per
//! `family_id`, plus enough of the backup list to infer the
//! replication factor `R` for the next allocation (spec §4.4A step 2).

use std::collections::BTreeMap;
use std::sync::Mutex;

use distfs_core::order::PeerAddr;
use distfs_core::rpc::FamilyId;
use distfs_core::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyRecord {
	pub primary: PeerAddr,
	pub backups: Vec<PeerAddr>,
}

#[derive(Default)]
pub struct Families {
	inner: Mutex<BTreeMap<FamilyId, FamilyRecord>>,
}

impl Families {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert(&self, family_id: FamilyId, record: FamilyRecord) {
		self.inner.lock().expect("families mutex poisoned").insert(family_id, record);
	}

	pub fn primary_of(&self, family_id: FamilyId) -> Option<PeerAddr> {
		self.inner.lock().expect("families mutex poisoned").get(&family_id).map(|r| r.primary.clone())
	}

	/// Every currently known primary, used by `route` to fan out
	/// routability probes (spec §4.4 step 1).
	pub fn all_primaries(&self) -> Vec<PeerAddr> {
		self.inner.lock().expect("families mutex poisoned").values().map(|r| r.primary.clone()).collect()
	}

	pub fn highest_family_id(&self) -> Option<FamilyId> {
		self.inner.lock().expect("families mutex poisoned").keys().next_back().copied()
	}

	/// Replication factor inferred from any existing family's size, per
	/// spec §4.4A step 2. `None` when no family exists yet, in which
	/// case the caller falls back to its configured default.
	pub fn infer_replication_factor(&self) -> Option<usize> {
		self.inner.lock().expect("families mutex poisoned").values().next().map(|r| r.backups.len() + 1)
	}

	/// Replaces `old` with `new` as the named family's primary (spec
	/// §4.4 "update_primary"). Fails with `Conflict` if `old` is not the
	/// family's current primary.
	pub fn update_primary(&self, family_id: FamilyId, old: &PeerAddr, new: PeerAddr) -> Result<()> {
		let mut guard = self.inner.lock().expect("families mutex poisoned");
		let Some(record) = guard.get_mut(&family_id) else {
			return Err(Error::Conflict(format!("unknown family {family_id}")));
		};
		if &record.primary != old {
			return Err(Error::Conflict(format!("{old} is not the recognized primary for family {family_id}")));
		}
		record.primary = new;
		Ok(())
	}

	/// Looks up which family a known primary address currently leads,
	/// used when the router only has the old primary's address handy
	/// (spec §4.4 "update_primary(old, new)").
	pub fn family_of_primary(&self, primary: &PeerAddr) -> Option<FamilyId> {
		self.inner.lock().expect("families mutex poisoned").iter().find(|(_, r)| &r.primary == primary).map(|(id, _)| *id)
	}

	/// A point-in-time copy of the full family map, for persistence
	/// (spec §6 "Persisted state").
	pub fn snapshot(&self) -> BTreeMap<FamilyId, FamilyRecord> {
		self.inner.lock().expect("families mutex poisoned").clone()
	}

	pub fn restore(map: BTreeMap<FamilyId, FamilyRecord>) -> Self {
		Self { inner: Mutex::new(map) }
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn highest_family_id_tracks_max() {
		let families = Families::new();
		families.insert(FamilyId(1), FamilyRecord { primary: PeerAddr::new("a:1"), backups: vec![] });
		families.insert(FamilyId(5), FamilyRecord { primary: PeerAddr::new("b:1"), backups: vec![] });
		assert_eq!(families.highest_family_id(), Some(FamilyId(5)));
	}

	#[test]
	fn update_primary_rejects_stale_old() {
		let families = Families::new();
		families.insert(FamilyId(1), FamilyRecord { primary: PeerAddr::new("a:1"), backups: vec![] });
		let result = families.update_primary(FamilyId(1), &PeerAddr::new("wrong:1"), PeerAddr::new("b:1"));
		assert!(result.is_err());
	}

	#[test]
	fn infer_replication_factor_from_existing_family() {
		let families = Families::new();
		families.insert(
			FamilyId(1),
			FamilyRecord { primary: PeerAddr::new("a:1"), backups: vec![PeerAddr::new("b:1"), PeerAddr::new("c:1")] },
		);
		assert_eq!(families.infer_replication_factor(), Some(3));
	}
}
