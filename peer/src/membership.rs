//! A peer's view of its family's membership (spec §3, §6 "Persisted
//! state"): the current primary and ordered backup list, stored on disk
//! as two files keyed by `family_id`.

use std::path::{Path, PathBuf};

use distfs_core::order::PeerAddr;
use distfs_core::rpc::FamilyId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
	pub backups: Vec<PeerAddr>,
}

impl Membership {
	/// Every address this family's election ordering must consider:
	/// `{primary} ∪ backups` (spec §4.2, §4.3B step 2).
	pub fn candidates(&self) -> Vec<PeerAddr> {
		let mut all = vec![self.primary.clone()];
		all.extend(self.backups.iter().cloned());
		all
	}

	fn primary_file(data_dir: &Path, family_id: FamilyId) -> PathBuf {
		data_dir.join(format!("{}.primary", family_id.0))
	}

	fn backups_file(data_dir: &Path, family_id: FamilyId) -> PathBuf {
		data_dir.join(format!("{}.backups", family_id.0))
	}

	pub fn persist(&self, data_dir: &Path) -> std::io::Result<()> {
		std::fs::create_dir_all(data_dir)?;
		std::fs::write(Self::primary_file(data_dir, self.family_id), self.primary.as_str())?;
		let backups_json = serde_json::to_string(&self.backups).unwrap_or_else(|_| "[]".to_string());
		std::fs::write(Self::backups_file(data_dir, self.family_id), backups_json)?;
		Ok(())
	}

	pub fn load(data_dir: &Path, family_id: FamilyId) -> std::io::Result<Option<Self>> {
		let primary_path = Self::primary_file(data_dir, family_id);
		let backups_path = Self::backups_file(data_dir, family_id);
		if !primary_path.exists() || !backups_path.exists() {
			return Ok(None);
		}
		let primary = PeerAddr::new(std::fs::read_to_string(primary_path)?.trim().to_string());
		let backups_json = std::fs::read_to_string(backups_path)?;
		let backups: Vec<PeerAddr> = serde_json::from_str(&backups_json).unwrap_or_default();
		Ok(Some(Self { family_id, primary, backups }))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn persist_then_load_round_trips() {
		let dir = tempfile::tempdir().unwrap();
		let membership = Membership {
			family_id: FamilyId(3),
			primary: PeerAddr::new("10.0.0.1:9000"),
			backups: vec![PeerAddr::new("10.0.0.2:9000"), PeerAddr::new("10.0.0.3:9000")],
		};
		membership.persist(dir.path()).unwrap();
		let loaded = Membership::load(dir.path(), FamilyId(3)).unwrap().unwrap();
		assert_eq!(loaded, membership);
	}

	#[test]
	fn missing_membership_loads_as_none() {
		let dir = tempfile::tempdir().unwrap();
		assert!(Membership::load(dir.path(), FamilyId(9)).unwrap().is_none());
	}

	#[test]
	fn candidates_includes_primary_and_backups() {
		let membership = Membership {
			family_id: FamilyId(1),
			primary: PeerAddr::new("a:1"),
			backups: vec![PeerAddr::new("b:1"), PeerAddr::new("c:1")],
		};
		assert_eq!(membership.candidates().len(), 3);
	}
}
