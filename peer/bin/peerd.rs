//! `peerd` — the replica peer daemon (spec §4.2).
//!
//! Starts in the `Pooled` role with its control surface bound at its
//! identity address. Promotion (see `distfs_peer::promotion`) brings up
//! the primary data-plane surface on a separate task; this binary never
//! needs to know which role it ends up in.

use std::sync::Arc;

use clap::Parser;
use distfs_core::fs::LocalStore;
use distfs_peer::config::PeerArgs;
use distfs_peer::runtime::PeerRuntime;
use distfs_peer::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.init();

	let config = PeerArgs::parse().into_config()?;
	let identity = config.identity();
	let store = LocalStore::open(&config.data_dir)?;

	let ctx = Arc::new(PeerRuntime::new(identity.clone(), config.router_addr.clone(), config.data_dir.clone(), store, config.timing));

	tracing::info!(identity = %identity, router = %config.router_addr, "peer starting in pooled role");

	let control_listener = tokio::net::TcpListener::bind(identity.as_str()).await?;
	let control_app = server::control_router(ctx.clone());
	let control_handle = tokio::spawn(async move {
		if let Err(e) = axum::serve(control_listener, control_app).await {
			tracing::error!(error = %e, "control surface exited");
		}
	});

	// The primary data-plane endpoint only gets bound once this peer wins
	// an election — see distfs_peer::promotion::promote_self — so a
	// pooled or backup peer never holds a port it may never use.
	control_handle.await?;
	Ok(())
}
