//! The client-facing dispatcher, `route` (spec §4.4).

use std::sync::Arc;

use distfs_core::order::PeerAddr;
use distfs_core::rpc::{RoutabilityVerdict, Verb};
use futures::future::join_all;

use crate::allocation::Allocator;
use crate::families::Families;
use crate::pool::Pool;
use crate::rpc_client;

pub enum RouteOutcome {
	/// A live primary accepted the request; forward to its data-plane
	/// endpoint.
	Forward(PeerAddr),
	/// No existing primary could take it; a fresh family allocation was
	/// kicked off and the client should retry with this token.
	Allocating(u64),
}

/// Spec §4.4's dispatcher: collect every live primary's routability
/// verdict for `(verb, path)`, preferring `PREFERRED` over `VIABLE`
/// over allocating a new family.
pub async fn route(
	http: &reqwest::Client,
	families: &Families,
	pool: &Pool,
	allocator: &Arc<Allocator>,
	default_replication_factor: usize,
	verb: Verb,
	path: &str,
) -> RouteOutcome {
	let primaries = families.all_primaries();

	let probes = primaries.iter().cloned().map(|primary| {
		let http = http.clone();
		let path = path.to_string();
		async move {
			let verdict = rpc_client::routability(&http, &primary, verb, &path).await;
			(primary, verdict)
		}
	});
	let results = join_all(probes).await;

	if let Some((primary, _)) = results.iter().find(|(_, v)| *v == RoutabilityVerdict::Preferred) {
		return RouteOutcome::Forward(primary.clone());
	}
	if let Some((primary, _)) = results.iter().find(|(_, v)| *v == RoutabilityVerdict::Viable) {
		return RouteOutcome::Forward(primary.clone());
	}

	let token = allocator.allocate_family(http, pool, families, default_replication_factor).await;
	RouteOutcome::Allocating(token)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn forward_outcome_carries_primary() {
		let outcome = RouteOutcome::Forward(PeerAddr::new("a:1"));
		match outcome {
			RouteOutcome::Forward(addr) => assert_eq!(addr.as_str(), "a:1"),
			RouteOutcome::Allocating(_) => panic!("expected Forward"),
		}
	}
}
