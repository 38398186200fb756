//! The router's HTTP surface (spec §6): the six client verbs (with the
//! `425`-allocating retry protocol), plus the peer-facing
//! `request_pool_peer` and `update_primary`.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use distfs_core::endpoint::primary_endpoint_of;
use distfs_core::error::WireStatus;
use distfs_core::rpc::{
	AllocatingResponse, CopyRequest, DeleteRequest, ExistsRequest, ReadRequest, RenameRequest, RequestPoolPeerResponse,
	UpdatePrimaryRequest, Verb, WriteRequest,
};
use distfs_core::Error;
use serde::Deserialize;

use crate::routing::{route, RouteOutcome};
use crate::runtime::RouterRuntime;
use crate::rpc_client;

type Ctx = Arc<RouterRuntime>;

#[derive(Debug, Deserialize)]
pub struct RetryQuery {
	pub token: Option<u64>,
}

pub fn router(ctx: Ctx) -> Router {
	Router::new()
		.route("/read", post(read))
		.route("/write", post(write))
		.route("/delete", post(delete))
		.route("/copy", post(copy))
		.route("/rename", post(rename))
		.route("/exists", post(exists))
		.route("/pool/request", post(request_pool_peer))
		.route("/pool/update_primary", post(update_primary))
		.with_state(ctx)
}

fn error_response(err: Error) -> Response {
	let status = match err.wire_status() {
		WireStatus::Ok => StatusCode::OK,
		WireStatus::Refused => StatusCode::FORBIDDEN,
		WireStatus::NotFound => StatusCode::NOT_FOUND,
		WireStatus::Timeout => StatusCode::REQUEST_TIMEOUT,
		WireStatus::AllocationInProgress => StatusCode::from_u16(425).expect("425 is a valid status code"),
		WireStatus::Failure => StatusCode::INTERNAL_SERVER_ERROR,
	};
	(status, err.to_string()).into_response()
}

fn allocating_response(token: u64) -> Response {
	(StatusCode::from_u16(425).expect("425 is a valid status code"), Json(AllocatingResponse { token })).into_response()
}

/// Shared precedence logic for every client verb: resolve a pending
/// retry token first; otherwise run the full dispatcher (spec §4.4,
/// §4.4B).
async fn dispatch(ctx: &Ctx, retry: &RetryQuery, verb: Verb, path: &str) -> Result<distfs_core::order::PeerAddr, Response> {
	if let Some(token) = retry.token {
		return match ctx.allocator.resolve(token) {
			Ok(Some(primary)) => Ok(primary_endpoint_of(&primary)),
			Ok(None) => Err(allocating_response(token)),
			Err(e) => Err(error_response(e)),
		};
	}

	let outcome = route(&ctx.http, &ctx.families, &ctx.pool, &ctx.allocator, ctx.timing.replication_factor, verb, path).await;
	ctx.persist();
	match outcome {
		RouteOutcome::Forward(primary) => Ok(primary_endpoint_of(&primary)),
		RouteOutcome::Allocating(token) => Err(allocating_response(token)),
	}
}

async fn read(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<ReadRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Read, &req.path).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::read(&ctx.http, &endpoint, req).await {
		Ok(resp) => Json(resp).into_response(),
		Err(e) => error_response(e),
	}
}

async fn write(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<WriteRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Write, &req.path).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::write(&ctx.http, &endpoint, req).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn delete(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<DeleteRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Delete, &req.path).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::delete(&ctx.http, &endpoint, req).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn copy(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<CopyRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Copy, &req.src).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::copy(&ctx.http, &endpoint, req).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn rename(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<RenameRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Rename, &req.old).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::rename(&ctx.http, &endpoint, req).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn exists(State(ctx): State<Ctx>, Query(retry): Query<RetryQuery>, Json(req): Json<ExistsRequest>) -> Response {
	let endpoint = match dispatch(&ctx, &retry, Verb::Exists, &req.path).await {
		Ok(endpoint) => endpoint,
		Err(resp) => return resp,
	};
	match rpc_client::exists(&ctx.http, &endpoint, req).await {
		Ok(resp) => Json(resp).into_response(),
		Err(e) => error_response(e),
	}
}

async fn request_pool_peer(State(ctx): State<Ctx>) -> Json<RequestPoolPeerResponse> {
	let addr = ctx.pool.take_one_reachable(&ctx.http).await;
	if addr.is_some() {
		ctx.persist();
	}
	Json(RequestPoolPeerResponse { addr })
}

async fn update_primary(State(ctx): State<Ctx>, Json(req): Json<UpdatePrimaryRequest>) -> impl IntoResponse {
	let Some(family_id) = ctx.families.family_of_primary(&req.old) else {
		return StatusCode::CONFLICT;
	};
	match ctx.families.update_primary(family_id, &req.old, req.new) {
		Ok(()) => {
			ctx.persist();
			StatusCode::OK
		}
		Err(_) => StatusCode::CONFLICT,
	}
}

