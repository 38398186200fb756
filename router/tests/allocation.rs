//! Family-ID monotonicity (spec §8): a failed allocation (pool
//! exhausted) between two successful ones must not have its ID
//! skipped or reused by the next successful allocation.

use std::sync::Arc;

use distfs_core::fs::LocalStore;
use distfs_core::order::PeerAddr;
use distfs_core::timing::Timing;
use distfs_peer::runtime::PeerRuntime;
use distfs_peer::server as peer_server;
use distfs_router::allocation::{AllocationState, Allocator};
use distfs_router::families::Families;
use distfs_router::pool::Pool;

/// A minimal live peer fixture — reuses `distfs_peer`'s real control
/// surface, since it already answers `/liveness`, `/register_family`
/// and `/awaken` the way `distfs-router` expects of a pool peer.
async fn spawn_fixture_peer() -> PeerAddr {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = PeerAddr::new(listener.local_addr().unwrap().to_string());
	let dir = tempfile::tempdir().unwrap();
	let store = LocalStore::open(dir.path()).unwrap();
	let ctx = Arc::new(PeerRuntime::new(addr.clone(), "127.0.0.1:1".to_string(), dir.path().to_path_buf(), store, Timing::default()));
	std::mem::forget(dir);
	let app = peer_server::control_router(ctx);
	tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});
	tokio::time::sleep(std::time::Duration::from_millis(20)).await;
	addr
}

#[tokio::test]
async fn failed_allocation_does_not_block_or_reuse_its_id() {
	let http = reqwest::Client::new();
	let pool = Pool::new();
	let families = Families::new();
	let allocator = Arc::new(Allocator::new());

	// First attempt: pool is empty, allocation fails.
	let failed_token = allocator.allocate_family(&http, &pool, &families, 3).await;
	assert!(matches!(allocator.state_of(failed_token), Some(AllocationState::Failed)));

	// Second attempt: pool now has one live peer, allocation succeeds.
	let live_peer = spawn_fixture_peer().await;
	pool.seed([live_peer]);
	let ready_token = allocator.allocate_family(&http, &pool, &families, 3).await;

	assert_eq!(ready_token, failed_token + 1, "the failed allocation's id must not be reused or skipped");
	assert!(matches!(allocator.state_of(ready_token), Some(AllocationState::Ready(_))));
}
