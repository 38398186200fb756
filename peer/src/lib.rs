//! Replica peer runtime (spec §4.2, §4.3).
//!
//! A peer runs one persistent "control" HTTP surface (register, election,
//! heartbeat, replication) bound to its canonical identity address, and —
//! only once promoted — a second "primary" HTTP surface (the six
//! client-routed verbs plus the routability endpoint) bound to the
//! derived primary endpoint (spec §3). Promotion starts the second
//! surface and stops the backup daemons; it never tears the first one
//! down, since `become_primary` must stay reachable for idempotent
//! re-delivery (spec §8, "idempotent promotion").

pub mod config;
pub mod daemons;
pub mod election;
pub mod health;
pub mod heartbeat;
pub mod membership;
pub mod promotion;
pub mod replication;
pub mod rpc_client;
pub mod runtime;
pub mod server;

pub use config::PeerConfig;
pub use runtime::{PeerRuntime, RoleKind};
