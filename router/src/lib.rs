//! Pool allocator and client request dispatcher (spec §4.4).
//!
//! Stateless-ish: the router's only owned state is the idle pool, the
//! family map, and the in-flight allocation table, each behind its own
//! lock per spec §5's "per router" shared-resource policy.

pub mod allocation;
pub mod config;
pub mod families;
pub mod persistence;
pub mod pool;
pub mod routing;
pub mod rpc_client;
pub mod runtime;
pub mod server;

pub use config::RouterConfig;
pub use runtime::RouterRuntime;
