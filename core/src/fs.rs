//! Local file store (spec §4.1).
//!
//! A thin collaborator anchored at a fixed root directory. Every path
//! argument is a leaf name resolved under that root; anything that would
//! escape the root is rejected before it reaches the filesystem. Grounded
//! on `original_source/submission/rvm/fs.py` and `jordan/rvm/fs.py`, whose
//! six operations this module reproduces with sandboxing and structured
//! errors instead of bare `try/except`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Marker file used as a tombstone, excluded from `count_user_files`.
pub const TOMBSTONE_NAME: &str = ".distfs-tombstone";

#[derive(Debug, Clone)]
pub struct LocalStore {
	root: PathBuf,
}

impl LocalStore {
	/// Opens a store anchored at `root`, creating the directory if absent.
	pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
		let root = root.into();
		std::fs::create_dir_all(&root)?;
		Ok(Self { root })
	}

	/// Resolves `leaf` to a path under `root`, rejecting traversal.
	fn resolve(&self, leaf: &str) -> Result<PathBuf> {
		if leaf.is_empty() {
			return Err(Error::NotFound(leaf.to_string()));
		}
		let candidate = Path::new(leaf);
		if candidate.is_absolute() || candidate.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
			return Err(Error::IOError(std::io::Error::new(
				std::io::ErrorKind::InvalidInput,
				format!("path escapes store root: {leaf}"),
			)));
		}
		Ok(self.root.join(candidate))
	}

	pub fn read(&self, path: &str) -> Result<Vec<u8>> {
		let full = self.resolve(path)?;
		std::fs::read(&full).map_err(|e| map_missing(e, path))
	}

	pub fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
		let full = self.resolve(path)?;
		if let Some(parent) = full.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&full, bytes)?;
		Ok(())
	}

	pub fn delete(&self, path: &str) -> Result<()> {
		let full = self.resolve(path)?;
		std::fs::remove_file(&full).map_err(|e| map_missing(e, path))
	}

	pub fn copy(&self, src: &str, dst: &str) -> Result<()> {
		let src_full = self.resolve(src)?;
		let dst_full = self.resolve(dst)?;
		if let Some(parent) = dst_full.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::copy(&src_full, &dst_full).map_err(|e| map_missing(e, src))?;
		Ok(())
	}

	pub fn rename(&self, old: &str, new: &str) -> Result<()> {
		let old_full = self.resolve(old)?;
		let new_full = self.resolve(new)?;
		if let Some(parent) = new_full.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::rename(&old_full, &new_full).map_err(|e| map_missing(e, old))
	}

	pub fn exists(&self, path: &str) -> bool {
		match self.resolve(path) {
			Ok(full) => full.exists(),
			Err(_) => false,
		}
	}

	/// Counts files in the store excluding the tombstone marker.
	pub fn count_user_files(&self) -> Result<usize> {
		let mut count = 0usize;
		for entry in std::fs::read_dir(&self.root)? {
			let entry = entry?;
			if entry.file_type()?.is_file() && entry.file_name() != TOMBSTONE_NAME {
				count += 1;
			}
		}
		Ok(count)
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

fn map_missing(e: std::io::Error, path: &str) -> Error {
	if e.kind() == std::io::ErrorKind::NotFound {
		Error::NotFound(path.to_string())
	} else {
		tracing::warn!(path, error = %e, "local store io error");
		Error::IOError(e)
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
	fn write_then_read_round_trips() {
		let (_dir, store) = store();
		store.write("a.txt", b"hello").unwrap();
		assert_eq!(store.read("a.txt").unwrap(), b"hello");
	}

	#[test]
	fn read_missing_is_not_found() {
		let (_dir, store) = store();
		assert!(matches!(store.read("missing.txt"), Err(Error::NotFound(_))));
	}

	#[test]
	fn delete_missing_is_not_found() {
		let (_dir, store) = store();
		assert!(matches!(store.delete("missing.txt"), Err(Error::NotFound(_))));
	}

	#[test]
	fn copy_missing_src_is_not_found() {
		let (_dir, store) = store();
		assert!(matches!(store.copy("missing.txt", "dst.txt"), Err(Error::NotFound(_))));
	}

	#[test]
	fn copy_overwrites_destination() {
		let (_dir, store) = store();
		store.write("a.txt", b"one").unwrap();
		store.write("b.txt", b"two").unwrap();
		store.copy("a.txt", "b.txt").unwrap();
		assert_eq!(store.read("b.txt").unwrap(), b"one");
	}

	#[test]
	fn rename_missing_old_is_not_found() {
		let (_dir, store) = store();
		assert!(matches!(store.rename("missing.txt", "new.txt"), Err(Error::NotFound(_))));
	}

	#[test]
	fn exists_never_fails() {
		let (_dir, store) = store();
		assert!(!store.exists("missing.txt"));
		store.write("a.txt", b"x").unwrap();
		assert!(store.exists("a.txt"));
	}

	#[test]
	fn traversal_is_rejected() {
		let (_dir, store) = store();
		assert!(store.read("../escape.txt").is_err());
		assert!(store.write("../escape.txt", b"x").is_err());
	}

	#[test]
	fn tombstone_excluded_from_count() {
		let (_dir, store) = store();
		store.write("a.txt", b"1").unwrap();
		store.write("b.txt", b"2").unwrap();
		store.write(TOMBSTONE_NAME, b"").unwrap();
		assert_eq!(store.count_user_files().unwrap(), 2);
	}
}
