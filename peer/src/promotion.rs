//! Primary takeover / promotion (spec §4.3C).
//!
//! Duplicate `become_primary` deliveries are idempotent: a peer already
//! primary returns success without side effects (spec §4.3C, §8).

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use distfs_core::order::PeerAddr;
use distfs_core::rpc::{FamilyId, RegisterFamilyRequest, UpdateBackupListRequest, UpdatePrimaryAddressRequest};

use crate::membership::Membership;
use crate::runtime::{PeerRuntime, RoleKind};
use crate::{daemons, election, replication, rpc_client, server};

/// Entry point for both the `/become_primary` HTTP handler and a local
/// election winner (spec §4.3B step 3 when the initiator itself ranks
/// highest). Returns whether the peer is primary for `family_id` once
/// this call returns — `true` covers both "just promoted" and "already
/// was" (idempotency, spec §8).
///
/// Returns a boxed, type-erased future (rather than `async fn`) because
/// this function and `election::run_election` call each other, which
/// would otherwise make the compiler try to build an infinitely-sized
/// future type.
pub fn promote_self<'a>(ctx: &'a Arc<PeerRuntime>, family_id: FamilyId) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
	Box::pin(async move {
		if ctx.role() == RoleKind::Primary {
			if ctx.membership().map(|m| m.family_id) == Some(family_id) {
				return true;
			}
			return false;
		}

		let Some(membership) = ctx.membership() else {
			tracing::warn!(family_id = family_id.0, "become_primary with no known membership, refusing");
			return false;
		};
		if membership.family_id != family_id {
			return false;
		}

		// Step 1: suspend the election watchdog before anything else so a
		// concurrent timeout can't start a second promotion on this peer,
		// and bring up the primary data-plane endpoint in the background.
		ctx.stop_daemons();
		if let Err(e) = server::serve_primary_endpoint(ctx.clone()).await {
			tracing::error!(error = %e, "failed to bind primary data-plane endpoint");
		}

		let new_membership = run_promotion_sequence(ctx, membership).await;
		ctx.set_membership(new_membership);
		ctx.set_role(RoleKind::Primary);

		// Step 10: the primary endpoint, brought up above, continues
		// independently of the backup-role daemons we just replaced.
		daemons::start_primary_daemons(ctx);

		true
	})
}

async fn run_promotion_sequence(ctx: &Arc<PeerRuntime>, membership: Membership) -> Membership {
	let self_addr = ctx.identity.clone();

	// Step 3: request a fresh pool peer; proceed whether or not one
	// arrives.
	let fresh_peer = rpc_client::request_pool_peer(&ctx.http, &ctx.router_addr).await;

	// Step 4: rewrite the backup list — remove self, append the fresh
	// peer if any.
	let mut new_backups: Vec<PeerAddr> = membership.backups.into_iter().filter(|b| *b != self_addr).collect();
	if let Some(ref fresh) = fresh_peer {
		new_backups.push(fresh.clone());
	}

	let new_membership =
		Membership { family_id: membership.family_id, primary: self_addr.clone(), backups: new_backups.clone() };

	// Step 5: register and replay history to the fresh peer.
	if let Some(fresh) = &fresh_peer {
		let register = RegisterFamilyRequest {
			family_id: new_membership.family_id,
			primary: self_addr.clone(),
			backups: new_backups.clone(),
		};
		if let Err(e) = rpc_client::register_family(&ctx.http, fresh, register).await {
			tracing::warn!(peer = %fresh, error = %e, "failed to register fresh pool peer during promotion");
		} else if let Err(e) = replication::replay_to(ctx, fresh, &new_membership).await {
			tracing::warn!(peer = %fresh, error = %e, "failed to replay history to fresh pool peer during promotion");
		}
	}

	// Steps 6-7: broadcast the new backup list and the new primary
	// address to every remaining backup.
	for backup in &new_backups {
		if Some(backup) == fresh_peer.as_ref() {
			continue; // already registered with the full view above
		}
		let list_req = UpdateBackupListRequest { family_id: new_membership.family_id, backups: new_backups.clone() };
		if let Err(e) = rpc_client::update_backup_list(&ctx.http, backup, list_req).await {
			tracing::warn!(backup = %backup, error = %e, "failed to broadcast new backup list");
		}
		let primary_req = UpdatePrimaryAddressRequest { family_id: new_membership.family_id, primary: self_addr.clone() };
		if let Err(e) = rpc_client::update_primary_address(&ctx.http, backup, primary_req).await {
			tracing::warn!(backup = %backup, error = %e, "failed to broadcast new primary address");
		}
	}

	// Step 8: tell the router the primary changed.
	if let Err(e) = rpc_client::update_primary(&ctx.http, &ctx.router_addr, membership.primary.clone(), self_addr.clone()).await
	{
		tracing::warn!(error = %e, "failed to notify router of new primary");
	}

	// Step 9: trigger an election among the remaining backups. Preserved
	// from the original design verbatim though its necessity is an open
	// question (see DESIGN.md / spec.md §9) — the new primary's own
	// heartbeat loop is what actually keeps the family alive; this
	// second election may simply be redundant busywork that always
	// resolves to electing the highest-ranked remaining backup, who then
	// discovers a heartbeat is already arriving and never acts on it.
	if !new_backups.is_empty() {
		let spawn_ctx = ctx.clone();
		let family_id = new_membership.family_id;
		let remaining = new_backups.clone();
		tokio::spawn(async move {
			election::run_election(&spawn_ctx, family_id, remaining).await;
		});
	}

	new_membership
}
