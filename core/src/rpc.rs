//! Wire DTOs shared by every HTTP endpoint in spec §6.
//!
//! spec.md treats the transport as "any request-response transport with
//! per-operation endpoints"; this module fixes the concrete shape so
//! `distfs-peer`, `distfs-router` and `distfs-client` agree on it. Bodies
//! are plain JSON over `axum`/`reqwest`, the natural modernization of the
//! teacher's `hyper` + `serde_json` pairing.

use serde::{Deserialize, Serialize};

use crate::order::PeerAddr;
use crate::record::OperationRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FamilyId(pub u64);

impl std::fmt::Display for FamilyId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The six client-facing verbs (spec §6). `Read` and `Exists` never reach
/// `OperationRecord` — they're read-only and bypass fan-out (spec §4.3D).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
	Read,
	Write,
	Delete,
	Copy,
	Rename,
	Exists,
}

impl Verb {
	/// Whether this verb can create a file the primary does not yet hold,
	/// relevant to the routability verdict (spec §4.4) and to quota checks.
	pub fn is_creating(self) -> bool {
		matches!(self, Verb::Write | Verb::Exists)
	}

	pub fn is_mutating(self) -> bool {
		matches!(self, Verb::Write | Verb::Delete | Verb::Copy | Verb::Rename)
	}
}

/// A primary's self-reported classification of whether it should handle a
/// given `(verb, path)` (spec §4.4, Glossary).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutabilityVerdict {
	Preferred,
	Viable,
	Refused,
}

// ---------------------------------------------------------------------
// Client <-> router, and router <-> primary's primary endpoint
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadRequest {
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResponse {
	pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteRequest {
	pub path: String,
	pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CopyRequest {
	pub src: String,
	pub dst: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenameRequest {
	pub old: String,
	pub new: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsRequest {
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistsResponse {
	pub exists: bool,
}

/// Returned with status `425` when `route` had to allocate a new family
/// (spec §4.4 step 4, §4.4B). The client resubmits with `?token=<n>`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocatingResponse {
	pub token: u64,
}

// ---------------------------------------------------------------------
// Router <-> peer
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestPoolPeerResponse {
	pub addr: Option<PeerAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePrimaryRequest {
	pub old: PeerAddr,
	pub new: PeerAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterFamilyRequest {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
	pub backups: Vec<PeerAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutabilityQuery {
	pub verb: Verb,
	pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutabilityResponse {
	pub verdict: RoutabilityVerdict,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LivenessResponse {
	pub ok: bool,
}

// ---------------------------------------------------------------------
// Peer <-> peer
// ---------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrimaryHeartbeatRequest {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateBackupListRequest {
	pub family_id: FamilyId,
	pub backups: Vec<PeerAddr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePrimaryAddressRequest {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BecomePrimaryRequest {
	pub family_id: FamilyId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BecomePrimaryResponse {
	pub accepted: bool,
}

/// A replicated mutating operation sent from a primary to a backup's
/// backup endpoint (spec §4.3D). Carries the sender's address so the
/// backup can enforce the invariant that it only accepts replication from
/// the primary it currently recognizes (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateRequest {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
	pub record: OperationRecord,
}

/// Bulk form used for history replay when onboarding a new or replaced
/// backup (spec §4.3C step 5, §4.3E step 3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicateBatchRequest {
	pub family_id: FamilyId,
	pub primary: PeerAddr,
	pub records: Vec<OperationRecord>,
}
