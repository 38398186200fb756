//! New-family allocation (spec §4.4A) and the client retry-token table
//! `A` (spec §4.4B).
//!
//! The token is the literal prospective `family_id`, not an opaque
//! UUID, per spec.md's Design Notes recommendation — the family-ID
//! sequence is already unique and monotone under `creation_lock`, so
//! reusing it avoids a second identifier space.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use distfs_core::order::{highest_ranked, PeerAddr};
use distfs_core::rpc::{FamilyId, RegisterFamilyRequest};
use distfs_core::{Error, Result};
use tokio::sync::Mutex as AsyncMutex;

use crate::families::{FamilyRecord, Families};
use crate::pool::Pool;
use crate::rpc_client;

#[derive(Debug, Clone)]
pub enum AllocationState {
	Pending,
	Ready(PeerAddr),
	Failed,
}

pub struct Allocator {
	/// The single lock spec §5 names as the one exception allowed to be
	/// held across outbound requests.
	creation_lock: AsyncMutex<()>,
	pending: StdMutex<HashMap<u64, AllocationState>>,
	/// Next `family_id` to hand out. Advances even on a failed
	/// allocation so a dead-pool attempt never hands its ID to a later
	/// successful one (spec §8, family-ID monotonicity).
	next_family_id: StdMutex<u64>,
}

impl Allocator {
	pub fn new() -> Self {
		Self::with_next_id(1)
	}

	/// Starts the counter above `next_id - 1` so a restart with
	/// persisted families never re-mints an already-assigned
	/// `family_id` (spec.md: "family_id = max(existing_ids) + 1").
	pub fn with_next_id(next_id: u64) -> Self {
		Self { creation_lock: AsyncMutex::new(()), pending: StdMutex::new(HashMap::new()), next_family_id: StdMutex::new(next_id) }
	}

	pub fn state_of(&self, token: u64) -> Option<AllocationState> {
		self.pending.lock().expect("allocation table mutex poisoned").get(&token).cloned()
	}

	fn set_state(&self, token: u64, state: AllocationState) {
		self.pending.lock().expect("allocation table mutex poisoned").insert(token, state);
	}

	/// Runs the full spec §4.4A sequence under `creation_lock`, updating
	/// `families` and the retry-token table as it goes. Returns the
	/// token the client should retry with.
	pub async fn allocate_family(
		self: &Arc<Self>,
		http: &reqwest::Client,
		pool: &Pool,
		families: &Families,
		default_replication_factor: usize,
	) -> u64 {
		let _guard = self.creation_lock.lock().await;

		let family_id = {
			let mut next = self.next_family_id.lock().expect("family-id counter mutex poisoned");
			let id = FamilyId(*next);
			*next += 1;
			id
		};
		let token = family_id.0;
		self.set_state(token, AllocationState::Pending);

		let r = families.infer_replication_factor().unwrap_or(default_replication_factor);
		let peers = pool.take_n_reachable(http, r).await;
		if peers.is_empty() {
			tracing::warn!(family_id = token, "new family allocation failed: pool exhausted");
			self.set_state(token, AllocationState::Failed);
			return token;
		}

		let primary = highest_ranked(&peers).cloned().expect("peers is non-empty");
		let backups: Vec<PeerAddr> = peers.iter().filter(|p| **p != primary).cloned().collect();

		for peer in &peers {
			let register = RegisterFamilyRequest { family_id, primary: primary.clone(), backups: backups.clone() };
			if let Err(e) = rpc_client::register_family(http, peer, register).await {
				tracing::warn!(peer = %peer, error = %e, "failed to register peer into new family");
				continue;
			}
			if let Err(e) = rpc_client::awaken(http, peer).await {
				tracing::warn!(peer = %peer, error = %e, "failed to awaken peer into new family");
			}
		}

		families.insert(family_id, FamilyRecord { primary: primary.clone(), backups });
		self.set_state(token, AllocationState::Ready(primary));
		token
	}

	/// Resolves a client's retry token to the forwarding target, or
	/// `Err(NotRoutable)` once allocation is known to have failed.
	pub fn resolve(&self, token: u64) -> Result<Option<PeerAddr>> {
		match self.state_of(token) {
			Some(AllocationState::Ready(addr)) => Ok(Some(addr)),
			Some(AllocationState::Pending) | None => Ok(None),
			Some(AllocationState::Failed) => Err(Error::NotRoutable),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn resolve_unknown_token_is_still_pending() {
		let allocator = Allocator::new();
		assert_eq!(allocator.resolve(999).unwrap(), None);
	}

	#[test]
	fn resolve_failed_allocation_is_not_routable() {
		let allocator = Allocator::new();
		allocator.set_state(1, AllocationState::Failed);
		assert!(matches!(allocator.resolve(1), Err(Error::NotRoutable)));
	}

	#[test]
	fn resolve_ready_allocation_returns_primary() {
		let allocator = Allocator::new();
		allocator.set_state(2, AllocationState::Ready(PeerAddr::new("a:1")));
		assert_eq!(allocator.resolve(2).unwrap(), Some(PeerAddr::new("a:1")));
	}
}
