//! Typed error hierarchy for the control plane (spec §7).
//!
//! Replaces the teacher's `error-chain` with `thiserror`: one enum with the
//! six kinds spec.md names, each mapped to a wire status code at the HTTP
//! boundary rather than inside this crate (this crate stays transport
//! agnostic).

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A file path was not present (`read`/`delete`/`copy`/`rename`).
	#[error("not found: {0}")]
	NotFound(String),

	/// A genuine local disk failure.
	#[error("io error: {0}")]
	IOError(#[from] std::io::Error),

	/// A probed peer did not respond within the request timeout.
	#[error("unreachable: {0}")]
	Unreachable(String),

	/// No idle peer was available from the pool when one was required.
	#[error("pool exhausted")]
	PoolExhausted,

	/// No family could accept the request and allocation failed.
	#[error("not routable")]
	NotRoutable,

	/// Asked to replace or accept a primary that is not the current one.
	#[error("conflict: {0}")]
	Conflict(String),
}

/// Maps an `Error` to the wire status convention in spec.md §6.
///
/// Lives here (rather than only at the axum boundary) so that both
/// `distfs-peer` and `distfs-router` agree on the mapping without
/// duplicating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireStatus {
	Ok,
	Refused,
	NotFound,
	Timeout,
	AllocationInProgress,
	Failure,
}

impl WireStatus {
	pub const fn code(self) -> u16 {
		match self {
			WireStatus::Ok => 200,
			WireStatus::Refused => 403,
			WireStatus::NotFound => 404,
			WireStatus::Timeout => 408,
			WireStatus::AllocationInProgress => 425,
			WireStatus::Failure => 500,
		}
	}
}

impl fmt::Display for WireStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.code())
	}
}

impl Error {
	pub fn wire_status(&self) -> WireStatus {
		match self {
			Error::NotFound(_) => WireStatus::NotFound,
			Error::Unreachable(_) => WireStatus::Timeout,
			Error::NotRoutable => WireStatus::Failure,
			Error::PoolExhausted => WireStatus::Failure,
			Error::Conflict(_) => WireStatus::Refused,
			Error::IOError(_) => WireStatus::Failure,
		}
	}
}
