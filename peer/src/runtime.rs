//! Owned, mutex-guarded peer state (Design Notes: "global state -> explicit
//! owned records"). Each concern named in spec §5's shared-resource policy
//! gets its own lock; none is ever held across a network call.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Instant;

use distfs_core::fs::LocalStore;
use distfs_core::history::History;
use distfs_core::order::PeerAddr;
use distfs_core::timing::Timing;
use tokio::task::JoinHandle;

use crate::membership::Membership;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleKind {
	Pooled,
	Backup,
	Primary,
}

pub struct PeerRuntime {
	pub identity: PeerAddr,
	pub router_addr: String,
	pub data_dir: PathBuf,
	pub store: LocalStore,
	pub history: History,
	pub http: reqwest::Client,
	pub timing: Timing,

	role: Mutex<RoleKind>,
	membership: Mutex<Option<Membership>>,
	last_primary_contact: Mutex<Option<Instant>>,
	daemons: Mutex<Vec<JoinHandle<()>>>,
}

impl PeerRuntime {
	pub fn new(identity: PeerAddr, router_addr: String, data_dir: PathBuf, store: LocalStore, timing: Timing) -> Self {
		let rpc_timeout = timing.rpc_timeout();
		Self {
			identity,
			router_addr,
			data_dir,
			store,
			history: History::new(),
			http: reqwest::Client::builder().timeout(rpc_timeout).build().expect("failed to build http client"),
			timing,
			role: Mutex::new(RoleKind::Pooled),
			membership: Mutex::new(None),
			last_primary_contact: Mutex::new(None),
			daemons: Mutex::new(Vec::new()),
		}
	}

	pub fn role(&self) -> RoleKind {
		*self.role.lock().expect("role mutex poisoned")
	}

	pub fn set_role(&self, kind: RoleKind) {
		*self.role.lock().expect("role mutex poisoned") = kind;
	}

	pub fn membership(&self) -> Option<Membership> {
		self.membership.lock().expect("membership mutex poisoned").clone()
	}

	pub fn set_membership(&self, membership: Membership) {
		if let Err(e) = membership.persist(&self.data_dir) {
			tracing::warn!(error = %e, "failed to persist membership");
		}
		*self.membership.lock().expect("membership mutex poisoned") = Some(membership);
	}

	pub fn touch_primary_contact(&self) {
		*self.last_primary_contact.lock().expect("contact mutex poisoned") = Some(Instant::now());
	}

	/// `None` means this peer has never heard from a primary (spec §4.2:
	/// "initialized to the peer's start time"), so the watchdog should
	/// treat it as freshly started rather than already timed out.
	pub fn elapsed_since_primary_contact(&self) -> Option<std::time::Duration> {
		self.last_primary_contact.lock().expect("contact mutex poisoned").map(|t| t.elapsed())
	}

	pub fn register_daemon(&self, handle: JoinHandle<()>) {
		self.daemons.lock().expect("daemons mutex poisoned").push(handle);
	}

	/// Aborts every daemon started for the current role (election
	/// watchdog on a backup; heartbeat + health loop on a primary), per
	/// the Design Notes' "promotion = stop backup daemons, start primary
	/// daemons."
	pub fn stop_daemons(&self) {
		let mut daemons = self.daemons.lock().expect("daemons mutex poisoned");
		for handle in daemons.drain(..) {
			handle.abort();
		}
	}
}
