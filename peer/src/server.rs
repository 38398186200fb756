//! The two HTTP surfaces a peer exposes (spec §3, §6).
//!
//! `control_router` is bound at the peer's identity address for its
//! entire lifetime: registration, election, heartbeat and replication
//! all arrive there regardless of role. `primary_router` is bound only
//! once promotion completes, at [`distfs_core::endpoint::primary_endpoint_of`]
//! — the six client-routed verbs never reach a peer that isn't primary.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use distfs_core::encoding::{decode_bytes, decode_path, encode_bytes};
use distfs_core::error::WireStatus;
use distfs_core::record::OperationRecord;
use distfs_core::rpc::{
	BecomePrimaryRequest, BecomePrimaryResponse, CopyRequest, DeleteRequest, ExistsRequest, ExistsResponse,
	LivenessResponse, PrimaryHeartbeatRequest, ReadRequest, ReadResponse, RegisterFamilyRequest, RenameRequest,
	ReplicateBatchRequest, ReplicateRequest, RoutabilityQuery, RoutabilityResponse, RoutabilityVerdict,
	UpdateBackupListRequest, UpdatePrimaryAddressRequest, Verb, WriteRequest,
};
use distfs_core::Error;

use crate::daemons;
use crate::membership::Membership;
use crate::promotion::promote_self;
use crate::replication::{apply_and_replicate, apply_replicated};
use crate::runtime::{PeerRuntime, RoleKind};

type Ctx = Arc<PeerRuntime>;

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

/// Always-on control surface: registration, election, heartbeat,
/// replication and the routability probe (spec §6, "Router <-> peer"
/// and "Peer <-> peer").
pub fn control_router(ctx: Ctx) -> Router {
	Router::new()
		.route("/register_family", post(register_family))
		.route("/awaken", post(awaken))
		.route("/liveness", get(liveness))
		.route("/routability", get(routability))
		.route("/become_primary", post(become_primary))
		.route("/primary_heartbeat", post(primary_heartbeat))
		.route("/update_backup_list", post(update_backup_list))
		.route("/update_primary_address", post(update_primary_address))
		.route("/replicate", post(replicate))
		.route("/replicate_batch", post(replicate_batch))
		.with_state(ctx)
}

/// Binds and serves the data-plane surface on the peer's derived
/// primary endpoint, spawned as an independent task (spec §4.3C step 1:
/// "start a background task to launch the primary endpoint"). Runs for
/// the remainder of the process's life — a primary is never demoted
/// (spec §4.2).
pub async fn serve_primary_endpoint(ctx: Ctx) -> std::io::Result<()> {
	let addr = distfs_core::endpoint::primary_endpoint_of(&ctx.identity);
	let listener = tokio::net::TcpListener::bind(addr.as_str()).await?;
	tracing::info!(addr = %addr, "primary data-plane endpoint listening");
	let app = primary_router(ctx);
	tokio::spawn(async move {
		if let Err(e) = axum::serve(listener, app).await {
			tracing::error!(error = %e, "primary data-plane endpoint exited");
		}
	});
	Ok(())
}

/// Data-plane surface: the six client verbs, forwarded to this primary
/// by the router. Only bound after promotion (spec §4.3C step 1/10).
pub fn primary_router(ctx: Ctx) -> Router {
	Router::new()
		.route("/read", post(read))
		.route("/write", post(write))
		.route("/delete", post(delete))
		.route("/copy", post(copy))
		.route("/rename", post(rename))
		.route("/exists", post(exists))
		.with_state(ctx)
}

// ---------------------------------------------------------------------
// Control surface
// ---------------------------------------------------------------------

async fn register_family(State(ctx): State<Ctx>, Json(req): Json<RegisterFamilyRequest>) -> impl IntoResponse {
	let membership = Membership { family_id: req.family_id, primary: req.primary, backups: req.backups };
	ctx.set_membership(membership);
	ctx.touch_primary_contact();
	if ctx.role() == RoleKind::Pooled {
		ctx.set_role(RoleKind::Backup);
		daemons::start_backup_daemons(&ctx);
	}
	StatusCode::OK
}

/// Combined with `register_family` for most flows (spec §6); kept as a
/// distinct no-body endpoint for a pool peer that only needs a liveness
/// nudge after having already been registered.
async fn awaken(State(ctx): State<Ctx>) -> impl IntoResponse {
	ctx.touch_primary_contact();
	StatusCode::OK
}

async fn liveness() -> Json<LivenessResponse> {
	Json(LivenessResponse { ok: true })
}

async fn routability(State(ctx): State<Ctx>, Query(query): Query<RoutabilityQuery>) -> Json<RoutabilityResponse> {
	let verdict = if ctx.role() != RoleKind::Primary {
		RoutabilityVerdict::Refused
	} else {
		classify(&ctx, query.verb, &query.path)
	};
	Json(RoutabilityResponse { verdict })
}

/// Spec §4.4's three-way classification: a primary already holding the
/// path prefers to handle it as long as doing so would not push a
/// creating verb over quota; a creating verb it can still accommodate
/// is viable; everything else is refused.
fn classify(ctx: &Ctx, verb: Verb, path: &str) -> RoutabilityVerdict {
	let holds = ctx.store.exists(path);
	let under_quota = ctx.store.count_user_files().map(|n| n < ctx.timing.quota_files).unwrap_or(false);

	if holds && !(verb.is_creating() && !under_quota) {
		return RoutabilityVerdict::Preferred;
	}
	if verb.is_creating() && under_quota && !holds {
		return RoutabilityVerdict::Viable;
	}
	RoutabilityVerdict::Refused
}

async fn become_primary(State(ctx): State<Ctx>, Json(req): Json<BecomePrimaryRequest>) -> Json<BecomePrimaryResponse> {
	let accepted = promote_self(&ctx, req.family_id).await;
	Json(BecomePrimaryResponse { accepted })
}

async fn primary_heartbeat(State(ctx): State<Ctx>, Json(req): Json<PrimaryHeartbeatRequest>) -> impl IntoResponse {
	let Some(membership) = ctx.membership() else {
		return StatusCode::CONFLICT;
	};
	if membership.primary != req.primary || membership.family_id != req.family_id {
		return StatusCode::CONFLICT;
	}
	ctx.touch_primary_contact();
	StatusCode::OK
}

async fn update_backup_list(State(ctx): State<Ctx>, Json(req): Json<UpdateBackupListRequest>) -> impl IntoResponse {
	let Some(mut membership) = ctx.membership() else {
		return StatusCode::CONFLICT;
	};
	if membership.family_id != req.family_id {
		return StatusCode::CONFLICT;
	}
	membership.backups = req.backups;
	ctx.set_membership(membership);
	StatusCode::OK
}

async fn update_primary_address(State(ctx): State<Ctx>, Json(req): Json<UpdatePrimaryAddressRequest>) -> impl IntoResponse {
	let Some(mut membership) = ctx.membership() else {
		return StatusCode::CONFLICT;
	};
	if membership.family_id != req.family_id {
		return StatusCode::CONFLICT;
	}
	membership.primary = req.primary;
	ctx.set_membership(membership);
	ctx.touch_primary_contact();
	StatusCode::OK
}

async fn replicate(State(ctx): State<Ctx>, Json(req): Json<ReplicateRequest>) -> impl IntoResponse {
	match apply_replicated(&ctx, &req.primary, &req.record) {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn replicate_batch(State(ctx): State<Ctx>, Json(req): Json<ReplicateBatchRequest>) -> impl IntoResponse {
	for record in &req.records {
		if let Err(e) = apply_replicated(&ctx, &req.primary, record) {
			return error_response(e);
		}
	}
	StatusCode::OK.into_response()
}

// ---------------------------------------------------------------------
// Primary data-plane surface
// ---------------------------------------------------------------------

fn bad_encoding(what: &str) -> Error {
	Error::IOError(std::io::Error::new(std::io::ErrorKind::InvalidInput, format!("malformed {what}")))
}

async fn read(State(ctx): State<Ctx>, Json(req): Json<ReadRequest>) -> Response {
	let path = match decode_path(&req.path) {
		Ok(p) => p,
		Err(_) => return error_response(bad_encoding("path")),
	};
	match ctx.store.read(&path) {
		Ok(bytes) => Json(ReadResponse { data: encode_bytes(&bytes) }).into_response(),
		Err(e) => error_response(e),
	}
}

async fn write(State(ctx): State<Ctx>, Json(req): Json<WriteRequest>) -> Response {
	let path = match decode_path(&req.path) {
		Ok(p) => p,
		Err(_) => return error_response(bad_encoding("path")),
	};
	let bytes = match decode_bytes(&req.data) {
		Ok(b) => b,
		Err(_) => return error_response(bad_encoding("payload")),
	};
	let record = OperationRecord::Write { path, data: bytes };
	match apply_and_replicate(&ctx, record).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn delete(State(ctx): State<Ctx>, Json(req): Json<DeleteRequest>) -> Response {
	let path = match decode_path(&req.path) {
		Ok(p) => p,
		Err(_) => return error_response(bad_encoding("path")),
	};
	let record = OperationRecord::Delete { path };
	match apply_and_replicate(&ctx, record).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn copy(State(ctx): State<Ctx>, Json(req): Json<CopyRequest>) -> Response {
	let (src, dst) = match (decode_path(&req.src), decode_path(&req.dst)) {
		(Ok(src), Ok(dst)) => (src, dst),
		_ => return error_response(bad_encoding("path")),
	};
	let record = OperationRecord::Copy { src, dst };
	match apply_and_replicate(&ctx, record).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn rename(State(ctx): State<Ctx>, Json(req): Json<RenameRequest>) -> Response {
	let (old, new) = match (decode_path(&req.old), decode_path(&req.new)) {
		(Ok(old), Ok(new)) => (old, new),
		_ => return error_response(bad_encoding("path")),
	};
	let record = OperationRecord::Rename { old, new };
	match apply_and_replicate(&ctx, record).await {
		Ok(()) => StatusCode::OK.into_response(),
		Err(e) => error_response(e),
	}
}

async fn exists(State(ctx): State<Ctx>, Json(req): Json<ExistsRequest>) -> Response {
	match decode_path(&req.path) {
		Ok(path) => Json(ExistsResponse { exists: ctx.store.exists(&path) }).into_response(),
		Err(_) => error_response(bad_encoding("path")),
	}
}
