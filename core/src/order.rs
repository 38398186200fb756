//! Deterministic peer ordering used for election (spec §4.2).
//!
//! Unlike the teacher's raft consensus module, which elects on log-term and
//! vote counts, this protocol has no epochs: the winner among a fixed
//! membership list is a pure function of the address strings, so
//! independent initiators converge without exchanging votes.

use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct PeerAddr(String);

impl PeerAddr {
	pub fn new(addr: impl Into<String>) -> Self {
		Self(addr.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl std::fmt::Display for PeerAddr {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<String> for PeerAddr {
	fn from(s: String) -> Self {
		Self(s)
	}
}

impl From<&str> for PeerAddr {
	fn from(s: &str) -> Self {
		Self(s.to_string())
	}
}

/// Strips non-alphanumeric separators from an address and reads the
/// remaining digits as an integer. Addresses with no digits rank as `0`
/// (the low end of the order) — an edge case the original leaves implicit.
pub fn election_rank(addr: &PeerAddr) -> u64 {
	let digits: String = addr.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
	digits.parse().unwrap_or(0)
}

/// Sorts `candidates` highest-rank-first, the order an election walks.
pub fn sort_by_election_rank(candidates: &mut [PeerAddr]) {
	candidates.sort_unstable_by(|a, b| {
		election_rank(b).cmp(&election_rank(a)).then_with(|| b.as_str().cmp(a.as_str()))
	});
}

/// The address among `candidates` that the deterministic order selects as
/// primary — used both for genesis family creation (§4.4A step 4) and as a
/// sanity check on a family's `primary` invariant (spec §3).
pub fn highest_ranked(candidates: &[PeerAddr]) -> Option<&PeerAddr> {
	candidates.iter().max_by(|a, b| {
		match election_rank(a).cmp(&election_rank(b)) {
			Ordering::Equal => a.as_str().cmp(b.as_str()),
			other => other,
		}
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rank_orders_numerically_not_lexically() {
		let a = PeerAddr::new("10.0.0.2:9000");
		let b = PeerAddr::new("10.0.0.10:9000");
		assert!(election_rank(&b) > election_rank(&a));
	}

	#[test]
	fn sort_is_independent_of_input_order() {
		let mut a = vec![
			PeerAddr::new("host-3:7000"),
			PeerAddr::new("host-1:7000"),
			PeerAddr::new("host-9:7000"),
		];
		let mut b = vec![
			PeerAddr::new("host-9:7000"),
			PeerAddr::new("host-3:7000"),
			PeerAddr::new("host-1:7000"),
		];
		sort_by_election_rank(&mut a);
		sort_by_election_rank(&mut b);
		assert_eq!(a, b);
		assert_eq!(a[0].as_str(), "host-9:7000");
	}

	#[test]
	fn highest_ranked_matches_sort_head() {
		let candidates = vec![
			PeerAddr::new("peer-4:6000"),
			PeerAddr::new("peer-17:6000"),
			PeerAddr::new("peer-2:6000"),
		];
		assert_eq!(highest_ranked(&candidates), Some(&candidates[1]));
	}

	#[test]
	fn no_digits_ranks_as_zero() {
		assert_eq!(election_rank(&PeerAddr::new("localhost")), 0);
	}
}
