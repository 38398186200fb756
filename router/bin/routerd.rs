//! `routerd` — the pool allocator and client dispatcher daemon (spec §4.4).

use std::sync::Arc;

use clap::Parser;
use distfs_router::config::RouterArgs;
use distfs_router::runtime::RouterRuntime;
use distfs_router::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.init();

	let config = RouterArgs::parse().into_config()?;
	let ctx = Arc::new(RouterRuntime::with_data_dir(config.timing, config.data_dir.clone()));
	if ctx.pool.is_empty() {
		ctx.pool.seed(config.initial_pool_addrs());
		ctx.persist();
	}

	tracing::info!(bind_addr = %config.bind_addr, pool_size = ctx.pool.len(), "router starting");

	let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
	let app = server::router(ctx);
	axum::serve(listener, app).await?;
	Ok(())
}
