//! Outbound calls the router makes to peers. Mirrors
//! `distfs_peer::rpc_client`'s posture: a missing or erroring reply is
//! always classified as [`distfs_core::Error::Unreachable`].

use distfs_core::encoding::encode_path;
use distfs_core::order::PeerAddr;
use distfs_core::rpc::{
	CopyRequest, DeleteRequest, ExistsRequest, ExistsResponse, LivenessResponse, ReadRequest, ReadResponse,
	RegisterFamilyRequest, RenameRequest, RoutabilityResponse, RoutabilityVerdict, Verb, WriteRequest,
};
use distfs_core::{Error, Result};

async fn post_checked(http: &reqwest::Client, url: &str, body: &impl serde::Serialize) -> Result<reqwest::Response> {
	let resp = http.post(url).json(body).send().await.map_err(|e| Error::Unreachable(format!("{url}: {e}")))?;
	match resp.status() {
		reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(url.to_string())),
		reqwest::StatusCode::FORBIDDEN => Err(Error::Conflict(url.to_string())),
		reqwest::StatusCode::REQUEST_TIMEOUT => Err(Error::Unreachable(url.to_string())),
		s if !s.is_success() => Err(Error::Unreachable(format!("{url}: status {s}"))),
		_ => Ok(resp),
	}
}

/// For endpoints whose success response carries a JSON body (`read`,
/// `exists`, `register_family`'s acknowledgement).
async fn post_json<B: serde::Serialize, R: serde::de::DeserializeOwned>(http: &reqwest::Client, url: &str, body: &B) -> Result<R> {
	let resp = post_checked(http, url, body).await?;
	resp.json::<R>().await.map_err(|e| Error::Unreachable(format!("{url}: {e}")))
}

/// For endpoints whose success response body is empty (`write`,
/// `delete`, `copy`, `rename`).
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

pub async fn awaken(http: &reqwest::Client, addr: &PeerAddr) -> Result<()> {
	let url = format!("http://{addr}/awaken");
	let resp = http.post(&url).send().await.map_err(|e| Error::Unreachable(format!("{url}: {e}")))?;
	if !resp.status().is_success() {
		return Err(Error::Unreachable(format!("{url}: status {}", resp.status())));
	}
	Ok(())
}

pub async fn routability(http: &reqwest::Client, addr: &PeerAddr, verb: Verb, path: &str) -> RoutabilityVerdict {
	let verb_str = serde_json::to_value(verb).ok().and_then(|v| v.as_str().map(str::to_string)).unwrap_or_default();
	let url = format!("http://{addr}/routability?verb={verb_str}&path={}", encode_path(path));
	match http.get(&url).send().await {
		Ok(resp) if resp.status().is_success() => resp
			.json::<RoutabilityResponse>()
			.await
			.map(|r| r.verdict)
			.unwrap_or(RoutabilityVerdict::Refused),
		_ => RoutabilityVerdict::Refused,
	}
}

/// Forwards a verb to `primary`'s data-plane endpoint (derived the same
/// way every peer derives its own — see `distfs_core::endpoint`).
pub async fn read(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: ReadRequest) -> Result<ReadResponse> {
	post_json(http, &format!("http://{primary_endpoint}/read"), &req).await
}

pub async fn write(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: WriteRequest) -> Result<()> {
	post_empty(http, &format!("http://{primary_endpoint}/write"), &req).await
}

pub async fn delete(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: DeleteRequest) -> Result<()> {
	post_empty(http, &format!("http://{primary_endpoint}/delete"), &req).await
}

pub async fn copy(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: CopyRequest) -> Result<()> {
	post_empty(http, &format!("http://{primary_endpoint}/copy"), &req).await
}

pub async fn rename(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: RenameRequest) -> Result<()> {
	post_empty(http, &format!("http://{primary_endpoint}/rename"), &req).await
}

pub async fn exists(http: &reqwest::Client, primary_endpoint: &PeerAddr, req: ExistsRequest) -> Result<ExistsResponse> {
	post_json(http, &format!("http://{primary_endpoint}/exists"), &req).await
}
