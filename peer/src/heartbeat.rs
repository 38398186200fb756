//! Primary heartbeat (spec §4.3A).

use std::sync::Arc;

use distfs_core::rpc::PrimaryHeartbeatRequest;
use futures::future::join_all;

use crate::rpc_client;
use crate::runtime::{PeerRuntime, RoleKind};

pub async fn run_heartbeat_loop(ctx: Arc<PeerRuntime>) {
	let mut interval = tokio::time::interval(ctx.timing.ping());
	loop {
		interval.tick().await;
		if ctx.role() != RoleKind::Primary {
			return;
		}
		let Some(membership) = ctx.membership() else {
			continue;
		};

		let pings = membership.backups.iter().map(|backup| {
			let ctx = ctx.clone();
			let backup = backup.clone();
			let family_id = membership.family_id;
			let identity = ctx.identity.clone();
			async move {
				let req = PrimaryHeartbeatRequest { family_id, primary: identity };
				if let Err(e) = rpc_client::primary_heartbeat(&ctx.http, &backup, req).await {
					tracing::warn!(backup = %backup, error = %e, "heartbeat failed");
				}
			}
		});
		join_all(pings).await;
	}
}
