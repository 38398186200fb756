//! Replication fan-out and onboarding replay (spec §4.3D).

use std::sync::Arc;

use distfs_core::order::PeerAddr;
use distfs_core::record::OperationRecord;
use distfs_core::rpc::{ReplicateBatchRequest, ReplicateRequest};
use distfs_core::{Error, Result};
use futures::future::join_all;

use crate::membership::Membership;
use crate::rpc_client;
use crate::runtime::PeerRuntime;

/// Applies `record` locally, appends it to history, then fans it out to
/// every backup concurrently. Per-backup failures are logged and do not
/// fail the client's request (spec §4.3D step 3).
pub async fn apply_and_replicate(ctx: &Arc<PeerRuntime>, record: OperationRecord) -> Result<()> {
	record.apply(&ctx.store)?;
	ctx.history.append(record.clone());

	let Some(membership) = ctx.membership() else {
		return Ok(());
	};

	let sends = membership.backups.iter().map(|backup| {
		let ctx = ctx.clone();
		let backup = backup.clone();
		let record = record.clone();
		let family_id = membership.family_id;
		let primary = ctx.identity.clone();
		async move {
			let req = ReplicateRequest { family_id, primary, record };
			if let Err(e) = rpc_client::replicate(&ctx.http, &backup, req).await {
				tracing::warn!(backup = %backup, error = %e, "replication failed, will be repaired by replay");
			}
		}
	});
	join_all(sends).await;
	Ok(())
}

/// Applies an inbound replicated record at a backup, enforcing the
/// invariant that replication is only accepted from the currently
/// recognized primary (spec §3).
pub fn apply_replicated(ctx: &Arc<PeerRuntime>, sender: &PeerAddr, record: &OperationRecord) -> Result<()> {
	let membership = ctx.membership().ok_or_else(|| Error::Conflict("no membership registered".to_string()))?;
	if &membership.primary != sender {
		return Err(Error::Conflict(format!("{sender} is not the recognized primary")));
	}
	record.apply(&ctx.store)?;
	ctx.history.append(record.clone());
	Ok(())
}

/// Streams a full history snapshot to `target` in order, used when
/// onboarding a freshly allocated or replaced peer (spec §4.3C step 5,
/// §4.3E step 3).
pub async fn replay_to(ctx: &Arc<PeerRuntime>, target: &PeerAddr, membership: &Membership) -> Result<()> {
	let records = ctx.history.snapshot();
	let req = ReplicateBatchRequest { family_id: membership.family_id, primary: ctx.identity.clone(), records };
	rpc_client::replicate_batch(&ctx.http, target, req).await
}
