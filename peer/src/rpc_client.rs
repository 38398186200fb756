//! Outbound RPC helpers. Every call here goes through the shared
//! `reqwest::Client` with its fixed per-request timeout; a missing or
//! erroring reply is always classified as [`distfs_core::Error::Unreachable`]
//! (spec §5's cancellation rule) rather than surfaced as a distinct kind.

use distfs_core::encoding::encode_path;
use distfs_core::order::PeerAddr;
use distfs_core::rpc::{
	BecomePrimaryRequest, BecomePrimaryResponse, LivenessResponse, PrimaryHeartbeatRequest, RegisterFamilyRequest,
	ReplicateBatchRequest, ReplicateRequest, RequestPoolPeerResponse, RoutabilityQuery, RoutabilityResponse,
	RoutabilityVerdict, UpdateBackupListRequest, UpdatePrimaryAddressRequest, UpdatePrimaryRequest,
};
use distfs_core::{Error, Result};

async fn post_checked(http: &reqwest::Client, url: &str, body: &impl serde::Serialize) -> Result<reqwest::Response> {
	let resp = http
		.post(url)
		.json(body)
		.send()
		.await
		.map_err(|e| Error::Unreachable(format!("{url}: {e}")))?;
	if resp.status() == reqwest::StatusCode::CONFLICT {
		return Err(Error::Conflict(url.to_string()));
	}
	if !resp.status().is_success() {
		return Err(Error::Unreachable(format!("{url}: status {}", resp.status())));
	}
	Ok(resp)
}

/// For endpoints whose success response carries a JSON body
/// (`become_primary`).
async fn post_json<B: serde::Serialize, R: serde::de::DeserializeOwned>(http: &reqwest::Client, url: &str, body: &B) -> Result<R> {
	let resp = post_checked(http, url, body).await?;
	resp.json::<R>().await.map_err(|e| Error::Unreachable(format!("{url}: {e}")))
}

/// For endpoints whose success response body is empty (everything else
/// in this module).
async fn post_empty(http: &reqwest::Client, url: &str, body: &impl serde::Serialize) -> Result<()> {
	post_checked(http, url, body).await.map(|_| ())
}

pub async fn liveness(http: &reqwest::Client, addr: &PeerAddr) -> bool {
	let url = format!("http://{addr}/liveness");
	match http.get(&url).send().await {
		Ok(resp) => resp.status().is_success() && resp.json::<LivenessResponse>().await.map(|r| r.ok).unwrap_or(false),
		Err(_) => false,
	}
}

pub async fn register_family(http: &reqwest::Client, addr: &PeerAddr, req: RegisterFamilyRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/register_family"), &req).await
}

pub async fn become_primary(http: &reqwest::Client, addr: &PeerAddr, req: BecomePrimaryRequest) -> Result<bool> {
	let url = format!("http://{addr}/become_primary");
	let resp: BecomePrimaryResponse = post_json(http, &url, &req).await?;
	Ok(resp.accepted)
}

pub async fn primary_heartbeat(http: &reqwest::Client, addr: &PeerAddr, req: PrimaryHeartbeatRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/primary_heartbeat"), &req).await
}

pub async fn update_backup_list(http: &reqwest::Client, addr: &PeerAddr, req: UpdateBackupListRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/update_backup_list"), &req).await
}

pub async fn update_primary_address(http: &reqwest::Client, addr: &PeerAddr, req: UpdatePrimaryAddressRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/update_primary_address"), &req).await
}

pub async fn replicate(http: &reqwest::Client, addr: &PeerAddr, req: ReplicateRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/replicate"), &req).await
}

pub async fn replicate_batch(http: &reqwest::Client, addr: &PeerAddr, req: ReplicateBatchRequest) -> Result<()> {
	post_empty(http, &format!("http://{addr}/replicate_batch"), &req).await
}

pub async fn routability(http: &reqwest::Client, addr: &PeerAddr, query: RoutabilityQuery) -> RoutabilityVerdict {
	let verb = serde_json::to_value(query.verb).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
	let url = format!("http://{addr}/routability?verb={verb}&path={}", encode_path(&query.path));
	match http.get(&url).send().await {
		Ok(resp) if resp.status().is_success() => resp
			.json::<RoutabilityResponse>()
			.await
			.map(|r| r.verdict)
			.unwrap_or(RoutabilityVerdict::Refused),
		_ => RoutabilityVerdict::Refused,
	}
}

pub async fn request_pool_peer(http: &reqwest::Client, router_addr: &str) -> Option<PeerAddr> {
	let url = format!("http://{router_addr}/pool/request");
	match http.post(&url).send().await {
		Ok(resp) if resp.status().is_success() => resp.json::<RequestPoolPeerResponse>().await.ok().and_then(|r| r.addr),
		_ => None,
	}
}

pub async fn update_primary(http: &reqwest::Client, router_addr: &str, old: PeerAddr, new: PeerAddr) -> Result<()> {
	post_empty(http, &format!("http://{router_addr}/pool/update_primary"), &UpdatePrimaryRequest { old, new }).await
}
