//! Thin retrying client library (spec §1: "the thin client library... a
//! retrying request wrapper"), implementing the six verbs, the
//! `425`-allocating retry-with-token loop (spec §4.4B), and `408`
//! timeout handling with a small capped backoff (spec §5's
//! cancellation rule: "a missing reply is classified the same as an
//! explicit failure").

use std::time::Duration;

use distfs_core::encoding::{decode_bytes, encode_bytes};
use distfs_core::rpc::{
	CopyRequest, DeleteRequest, ExistsRequest, ExistsResponse, ReadRequest, ReadResponse, RenameRequest, WriteRequest,
};
use distfs_core::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Backoff policy for both the timeout-retry loop and the
/// allocation-retry loop. Capped, not unbounded, matching the
/// teacher's posture of small fixed sleeps rather than full
/// exponential backoff.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
	pub initial_backoff: Duration,
	pub max_backoff: Duration,
	pub max_timeout_retries: u32,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self { initial_backoff: Duration::from_millis(100), max_backoff: Duration::from_secs(2), max_timeout_retries: 5 }
	}
}

pub struct Client {
	router_addr: String,
	http: reqwest::Client,
	retry: RetryPolicy,
}

impl Client {
	pub fn new(router_addr: impl Into<String>) -> Self {
		Self::with_retry_policy(router_addr, RetryPolicy::default())
	}

	pub fn with_retry_policy(router_addr: impl Into<String>, retry: RetryPolicy) -> Self {
		Self { router_addr: router_addr.into(), http: reqwest::Client::new(), retry }
	}

	pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
		let req = ReadRequest { path: path.to_string() };
		let resp: ReadResponse = self.call("read", &req).await?;
		decode_bytes(&resp.data).map_err(|_| Error::IOError(std::io::Error::new(std::io::ErrorKind::InvalidData, "malformed response payload")))
	}

	pub async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
		let req = WriteRequest { path: path.to_string(), data: encode_bytes(data) };
		self.call_empty("write", &req).await
	}

	pub async fn delete(&self, path: &str) -> Result<()> {
		let req = DeleteRequest { path: path.to_string() };
		self.call_empty("delete", &req).await
	}

	pub async fn copy(&self, src: &str, dst: &str) -> Result<()> {
		let req = CopyRequest { src: src.to_string(), dst: dst.to_string() };
		self.call_empty("copy", &req).await
	}

	pub async fn rename(&self, old: &str, new: &str) -> Result<()> {
		let req = RenameRequest { old: old.to_string(), new: new.to_string() };
		self.call_empty("rename", &req).await
	}

	pub async fn exists(&self, path: &str) -> Result<bool> {
		let req = ExistsRequest { path: path.to_string() };
		let resp: ExistsResponse = self.call("exists", &req).await?;
		Ok(resp.exists)
	}

	/// Runs the full retry protocol for a verb whose success response
	/// carries a JSON body (`read`, `exists`): resubmits with
	/// `?token=N` while the router answers `425`, and retries the
	/// network call itself with capped backoff on timeout.
	async fn call<B: Serialize, R: DeserializeOwned>(&self, verb: &str, body: &B) -> Result<R> {
		let mut token: Option<u64> = None;
		let mut allocation_backoff = self.retry.initial_backoff;

		loop {
			match self.call_once(verb, body, token).await? {
				Outcome::Done(resp) => return resp.json::<R>().await.map_err(|e| Error::Unreachable(e.to_string())),
				Outcome::Allocating(new_token) => {
					token = Some(new_token);
					tokio::time::sleep(allocation_backoff).await;
					allocation_backoff = (allocation_backoff * 2).min(self.retry.max_backoff);
				}
			}
		}
	}

	/// Same protocol as [`Client::call`], for verbs whose success
	/// response body is empty (`write`, `delete`, `copy`, `rename`).
	async fn call_empty<B: Serialize>(&self, verb: &str, body: &B) -> Result<()> {
		let mut token: Option<u64> = None;
		let mut allocation_backoff = self.retry.initial_backoff;

		loop {
			match self.call_once(verb, body, token).await? {
				Outcome::Done(_) => return Ok(()),
				Outcome::Allocating(new_token) => {
					token = Some(new_token);
					tokio::time::sleep(allocation_backoff).await;
					allocation_backoff = (allocation_backoff * 2).min(self.retry.max_backoff);
				}
			}
		}
	}

	async fn call_once<B: Serialize>(&self, verb: &str, body: &B, token: Option<u64>) -> Result<Outcome> {
		let mut url = format!("http://{}/{verb}", self.router_addr);
		if let Some(token) = token {
			url.push_str(&format!("?token={token}"));
		}

		let mut backoff = self.retry.initial_backoff;
		for attempt in 0..=self.retry.max_timeout_retries {
			match self.http.post(&url).json(body).send().await {
				Ok(resp) => return Self::interpret(resp).await,
				Err(e) if attempt == self.retry.max_timeout_retries => {
					return Err(Error::Unreachable(format!("{url}: {e}")));
				}
				Err(e) => {
					tracing::warn!(url = %url, attempt, error = %e, "request timed out, retrying");
					tokio::time::sleep(backoff).await;
					backoff = (backoff * 2).min(self.retry.max_backoff);
				}
			}
		}
		unreachable!("loop always returns or errors on its last iteration")
	}

	async fn interpret(resp: reqwest::Response) -> Result<Outcome> {
		match resp.status().as_u16() {
			200 => Ok(Outcome::Done(resp)),
			403 => Err(Error::Conflict("primary refused routing".to_string())),
			404 => Err(Error::NotFound("path not found".to_string())),
			408 => Err(Error::Unreachable("peer request timed out".to_string())),
			425 => {
				let body: distfs_core::rpc::AllocatingResponse =
					resp.json().await.map_err(|e| Error::Unreachable(e.to_string()))?;
				Ok(Outcome::Allocating(body.token))
			}
			_ => Err(Error::NotRoutable),
		}
	}
}

enum Outcome {
	Done(reqwest::Response),
	Allocating(u64),
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn default_retry_policy_caps_backoff() {
		let policy = RetryPolicy::default();
		assert!(policy.initial_backoff <= policy.max_backoff);
	}
}
