//! Backup health and replacement (spec §4.3E, §4.3F).
//!
//! Runs only on a primary. Every `T_CHECK` it probes each backup's
//! liveness endpoint; a dead backup is replaced one-for-one from the
//! pool, registered, replayed, and the new list broadcast. If zero
//! backups are left alive, a single fresh peer is requested and seeded
//! (spec §4.3F) rather than replacing every empty slot at once.

use std::sync::Arc;

use distfs_core::order::PeerAddr;
use distfs_core::rpc::{RegisterFamilyRequest, UpdateBackupListRequest};
use futures::future::join_all;

use crate::membership::Membership;
use crate::replication;
use crate::rpc_client;
use crate::runtime::{PeerRuntime, RoleKind};

pub async fn run_health_loop(ctx: Arc<PeerRuntime>) {
	let mut interval = tokio::time::interval(ctx.timing.check());
	loop {
		interval.tick().await;
		if ctx.role() != RoleKind::Primary {
			return;
		}
		let Some(membership) = ctx.membership() else {
			continue;
		};
		run_health_pass(&ctx, membership).await;
	}
}

async fn run_health_pass(ctx: &Arc<PeerRuntime>, membership: Membership) {
	let checks = membership.backups.iter().cloned().map(|backup| {
		let ctx = ctx.clone();
		async move {
			let alive = rpc_client::liveness(&ctx.http, &backup).await;
			(backup, alive)
		}
	});
	let results = join_all(checks).await;

	let live: Vec<PeerAddr> = results.iter().filter(|(_, alive)| *alive).map(|(addr, _)| addr.clone()).collect();
	let dead: Vec<PeerAddr> = results.iter().filter(|(_, alive)| !*alive).map(|(addr, _)| addr.clone()).collect();

	if dead.is_empty() {
		return;
	}
	for d in &dead {
		tracing::warn!(backup = %d, family_id = membership.family_id.0, "backup failed liveness check, marking dead");
	}

	// §4.3F: no live backups left. Request exactly one fresh peer and
	// seed the family with it, rather than one replacement per dead slot.
	let replacements = if live.is_empty() { 1 } else { dead.len() };

	let mut new_backups = live;
	for _ in 0..replacements {
		let Some(fresh) = rpc_client::request_pool_peer(&ctx.http, &ctx.router_addr).await else {
			tracing::warn!(family_id = membership.family_id.0, "pool exhausted while replacing dead backup");
			break;
		};
		let new_membership = Membership { family_id: membership.family_id, primary: ctx.identity.clone(), backups: {
			let mut b = new_backups.clone();
			b.push(fresh.clone());
			b
		} };
		let register = RegisterFamilyRequest {
			family_id: membership.family_id,
			primary: ctx.identity.clone(),
			backups: new_membership.backups.clone(),
		};
		if let Err(e) = rpc_client::register_family(&ctx.http, &fresh, register).await {
			tracing::warn!(peer = %fresh, error = %e, "failed to register replacement backup");
			continue;
		}
		if let Err(e) = replication::replay_to(ctx, &fresh, &new_membership).await {
			tracing::warn!(peer = %fresh, error = %e, "failed to replay history to replacement backup");
		}
		new_backups.push(fresh);
	}

	if new_backups == membership.backups {
		return;
	}

	let updated = Membership { family_id: membership.family_id, primary: ctx.identity.clone(), backups: new_backups.clone() };
	ctx.set_membership(updated);

	let list_req = UpdateBackupListRequest { family_id: membership.family_id, backups: new_backups.clone() };
	let broadcasts = new_backups.iter().cloned().map(|backup| {
		let ctx = ctx.clone();
		let list_req = UpdateBackupListRequest { family_id: list_req.family_id, backups: list_req.backups.clone() };
		async move {
			if let Err(e) = rpc_client::update_backup_list(&ctx.http, &backup, list_req).await {
				tracing::warn!(backup = %backup, error = %e, "failed to broadcast repaired backup list");
			}
		}
	});
	join_all(broadcasts).await;
}
