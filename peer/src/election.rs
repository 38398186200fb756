//! Election watchdog (spec §4.3B).
//!
//! Content-addressed, not time-based: the winner is a pure function of
//! the membership list (`election_rank`), so concurrent initiators
//! converge without exchanging votes or epochs (Design Notes).

use std::sync::Arc;

use distfs_core::order::{sort_by_election_rank, PeerAddr};
use distfs_core::rpc::{BecomePrimaryRequest, FamilyId};

use crate::rpc_client;
use crate::runtime::{PeerRuntime, RoleKind};

/// Runs the backup's watchdog loop: every `T_CHECK`, compare elapsed time
/// since the last primary contact to `T_TIMEOUT`; on timeout, run an
/// election. Returns only when the role stops being `Backup` (promotion
/// happened elsewhere, or the loop is aborted).
pub async fn run_watchdog(ctx: Arc<PeerRuntime>) {
	let mut interval = tokio::time::interval(ctx.timing.check());
	loop {
		interval.tick().await;
		if ctx.role() != RoleKind::Backup {
			return;
		}
		let Some(elapsed) = ctx.elapsed_since_primary_contact() else {
			continue;
		};
		if elapsed < ctx.timing.timeout() {
			continue;
		}
		let Some(membership) = ctx.membership() else {
			continue;
		};
		tracing::warn!(family_id = membership.family_id.0, "primary contact timed out, starting election");
		run_election(&ctx, membership.family_id, membership.candidates()).await;
	}
}

/// Walks `candidates` highest-rank-first, calling `become_primary` on each
/// until one acknowledges (spec §4.3B steps 2-5). Safe to call
/// concurrently from multiple initiators: every initiator sorts the same
/// way and `become_primary` is idempotent, so they converge on the same
/// winner (spec §8, "election uniqueness").
pub async fn run_election(ctx: &Arc<PeerRuntime>, family_id: FamilyId, mut candidates: Vec<PeerAddr>) {
	sort_by_election_rank(&mut candidates);

	for candidate in &candidates {
		let accepted = call_become_primary(ctx, candidate, family_id).await;
		match accepted {
			Some(true) => {
				tracing::info!(candidate = %candidate, "election resolved");
				ctx.touch_primary_contact();
				return;
			}
			Some(false) => {
				tracing::debug!(candidate = %candidate, "candidate declined become_primary");
			}
			None => {
				tracing::debug!(candidate = %candidate, "candidate unreachable during election");
			}
		}
	}

	tracing::warn!("every election candidate was unreachable, will retry next tick");
}

async fn call_become_primary(ctx: &Arc<PeerRuntime>, candidate: &PeerAddr, family_id: FamilyId) -> Option<bool> {
	if *candidate == ctx.identity {
		return Some(crate::promotion::promote_self(ctx, family_id).await);
	}
	rpc_client::become_primary(&ctx.http, candidate, BecomePrimaryRequest { family_id }).await.ok()
}
