//! Scenario 1 (spec §8): write-then-read convergence across backups.
//!
//! Binds a real primary and a real backup on ephemeral localhost ports
//! and drives a write through the primary's data-plane HTTP surface,
//! then asserts the backup's local store converged without the test
//! touching either `PeerRuntime` directly.

use std::path::PathBuf;
use std::sync::Arc;

use distfs_core::fs::LocalStore;
use distfs_core::order::PeerAddr;
use distfs_core::rpc::{FamilyId, WriteRequest};
use distfs_core::timing::Timing;
use distfs_peer::membership::Membership;
use distfs_peer::runtime::PeerRuntime;
use distfs_peer::server;

async fn spawn_peer(data_dir: PathBuf) -> (PeerAddr, Arc<PeerRuntime>) {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = PeerAddr::new(listener.local_addr().unwrap().to_string());
	let store = LocalStore::open(&data_dir).unwrap();
	let ctx = Arc::new(PeerRuntime::new(addr.clone(), "127.0.0.1:1".to_string(), data_dir, store, Timing::default()));

	let control_app = server::control_router(ctx.clone());
	tokio::spawn(async move {
		axum::serve(listener, control_app).await.unwrap();
	});

	(addr, ctx)
}

#[tokio::test]
async fn write_replicates_to_backup() {
	let primary_dir = tempfile::tempdir().unwrap();
	let backup_dir = tempfile::tempdir().unwrap();

	let (primary_addr, primary_ctx) = spawn_peer(primary_dir.path().to_path_buf()).await;
	let (backup_addr, backup_ctx) = spawn_peer(backup_dir.path().to_path_buf()).await;

	let membership =
		Membership { family_id: FamilyId(1), primary: primary_addr.clone(), backups: vec![backup_addr.clone()] };
	primary_ctx.set_membership(membership.clone());
	backup_ctx.set_membership(membership);

	// Bind the primary's data-plane surface directly (bypassing
	// promotion, since this test constructs the primary role by hand).
	let primary_listener = tokio::net::TcpListener::bind(distfs_core::endpoint::primary_endpoint_of(&primary_addr).as_str())
		.await
		.unwrap();
	let primary_app = server::primary_router(primary_ctx.clone());
	tokio::spawn(async move {
		axum::serve(primary_listener, primary_app).await.unwrap();
	});

	tokio::time::sleep(std::time::Duration::from_millis(50)).await;

	let http = reqwest::Client::new();
	let url = format!("http://{}/write", distfs_core::endpoint::primary_endpoint_of(&primary_addr));
	let req = WriteRequest { path: "a.txt".to_string(), data: distfs_core::encoding::encode_bytes(b"hello") };
	let resp = http.post(&url).json(&req).send().await.unwrap();
	assert!(resp.status().is_success());

	tokio::time::sleep(std::time::Duration::from_millis(50)).await;

	assert_eq!(primary_ctx.store.read("a.txt").unwrap(), b"hello");
	assert_eq!(backup_ctx.store.read("a.txt").unwrap(), b"hello");
}
