//! Shared building blocks for the distributed file store control plane.
//!
//! This crate holds nothing that talks over the network on its own; it is
//! the leaves-first layer every other crate in the workspace depends on:
//! the sandboxed local file store, the append-only operation history, the
//! deterministic peer ordering used for election, the wire DTOs shared by
//! every HTTP endpoint, and the typed error hierarchy.

pub mod encoding;
pub mod endpoint;
pub mod error;
pub mod fs;
pub mod history;
pub mod order;
pub mod record;
pub mod rpc;
pub mod timing;

pub use error::{Error, Result};
pub use order::{election_rank, PeerAddr};
pub use record::OperationRecord;
pub use timing::Timing;
