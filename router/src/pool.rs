//! The idle-peer pool (spec §3 "Pool", §4.4).
//!
//! A pool is the only per-router resource consulted while holding the
//! family-creation lock across outbound calls (spec §5's one named
//! exception), so its own operation, `take_one_reachable`, is written
//! to be cheap and self-contained rather than generic.

use std::collections::VecDeque;
use std::sync::Mutex;

use distfs_core::order::PeerAddr;

use crate::rpc_client;

#[derive(Default)]
pub struct Pool {
	idle: Mutex<VecDeque<PeerAddr>>,
}

impl Pool {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn seed(&self, peers: impl IntoIterator<Item = PeerAddr>) {
		self.idle.lock().expect("pool mutex poisoned").extend(peers);
	}

	pub fn len(&self) -> usize {
		self.idle.lock().expect("pool mutex poisoned").len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// A point-in-time copy of the idle queue, for persistence (spec §6
	/// "Persisted state").
	pub fn snapshot(&self) -> Vec<PeerAddr> {
		self.idle.lock().expect("pool mutex poisoned").iter().cloned().collect()
	}

	fn pop_front(&self) -> Option<PeerAddr> {
		self.idle.lock().expect("pool mutex poisoned").pop_front()
	}

	/// Pops heads until one answers a liveness probe, discarding the
	/// unreachable ones permanently (spec §3: "return is not used in
	/// normal operation — drained peers don't return, they're replaced
	/// by fresh allocations").
	pub async fn take_one_reachable(&self, http: &reqwest::Client) -> Option<PeerAddr> {
		loop {
			let candidate = self.pop_front()?;
			if rpc_client::liveness(http, &candidate).await {
				return Some(candidate);
			}
			tracing::warn!(peer = %candidate, "discarding unreachable pool peer");
		}
	}

	/// Pulls up to `n` reachable peers, stopping early if the pool runs
	/// dry (spec §4.4A step 3: "abort with an error if zero peers could
	/// be obtained" is handled by the caller checking the returned len).
	pub async fn take_n_reachable(&self, http: &reqwest::Client, n: usize) -> Vec<PeerAddr> {
		let mut taken = Vec::with_capacity(n);
		for _ in 0..n {
			match self.take_one_reachable(http).await {
				Some(peer) => taken.push(peer),
				None => break,
			}
		}
		taken
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn seed_then_len_reports_inventory() {
		let pool = Pool::new();
		pool.seed([PeerAddr::new("a:1"), PeerAddr::new("b:1")]);
		assert_eq!(pool.len(), 2);
	}

	#[test]
	fn empty_pool_reports_empty() {
		let pool = Pool::new();
		assert!(pool.is_empty());
	}
}
