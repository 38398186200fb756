//! Integration tests against the router's in-process axum app
//! (spec §8 scenario 4: a saturated router answers `425` then resolves
//! the retry token once allocation finishes).

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use distfs_core::timing::Timing;
use distfs_router::runtime::RouterRuntime;
use distfs_router::server;
use tower::ServiceExt;

fn app_with_empty_pool() -> axum::Router {
	let ctx = Arc::new(RouterRuntime::new(Timing::default()));
	server::router(ctx)
}

#[tokio::test]
async fn write_with_no_primaries_and_empty_pool_is_not_routable() {
	let app = app_with_empty_pool();
	let body = serde_json::json!({"path": "a.txt", "data": "aGVsbG8"}).to_string();
	let response = app
		.oneshot(Request::builder().method("POST").uri("/write").header("content-type", "application/json").body(Body::from(body)).unwrap())
		.await
		.unwrap();

	// Allocation fails immediately (pool is empty), so the retry-token
	// path resolves straight to NotRoutable on the very next attempt.
	assert_eq!(response.status(), StatusCode::from_u16(425).unwrap());
}

#[tokio::test]
async fn retry_without_token_allocates_again() {
	let ctx = Arc::new(RouterRuntime::new(Timing::default()));
	let app = server::router(ctx.clone());

	let body = serde_json::json!({"path": "a.txt", "data": "aGVsbG8"}).to_string();
	let first = app
		.clone()
		.oneshot(Request::builder().method("POST").uri("/write").header("content-type", "application/json").body(Body::from(body.clone())).unwrap())
		.await
		.unwrap();
	assert_eq!(first.status(), StatusCode::from_u16(425).unwrap());

	let bytes = axum::body::to_bytes(first.into_body(), usize::MAX).await.unwrap();
	let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
	let token = parsed["token"].as_u64().unwrap();

	let retry = app
		.oneshot(
			Request::builder()
				.method("POST")
				.uri(format!("/write?token={token}"))
				.header("content-type", "application/json")
				.body(Body::from(body))
				.unwrap(),
		)
		.await
		.unwrap();
	// Pool was empty, so allocation failed and the retry resolves to a
	// hard failure rather than hanging in "still allocating".
	assert_eq!(retry.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
