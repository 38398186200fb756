//! Fixed daemon sets per role (Design Notes: "each role has a fixed
//! daemon set started at entry and cancelled at exit").

use std::sync::Arc;

use crate::runtime::PeerRuntime;
use crate::{election, health, heartbeat};

pub fn start_backup_daemons(ctx: &Arc<PeerRuntime>) {
	let watchdog_ctx = ctx.clone();
	ctx.register_daemon(tokio::spawn(async move {
		election::run_watchdog(watchdog_ctx).await;
	}));
}

pub fn start_primary_daemons(ctx: &Arc<PeerRuntime>) {
	let heartbeat_ctx = ctx.clone();
	ctx.register_daemon(tokio::spawn(async move {
		heartbeat::run_heartbeat_loop(heartbeat_ctx).await;
	}));

	let health_ctx = ctx.clone();
	ctx.register_daemon(tokio::spawn(async move {
		health::run_health_loop(health_ctx).await;
	}));
}
