//! Derives a peer's primary (data-plane) endpoint from its canonical
//! identity address (spec §3: "Two well-known service endpoints exist per
//! peer... The two endpoints coexist on one peer when it is a primary").
//!
//! A family's `primary`/`backups` fields and the router's `F` map both
//! store one identity address per peer (the control/backup endpoint);
//! the data-plane port is a fixed offset from it by convention, so no
//! second address ever needs to travel the wire or be persisted.

use crate::order::PeerAddr;

pub const PRIMARY_PORT_OFFSET: u16 = 1;

/// Computes the primary endpoint for a peer's canonical `host:port`
/// identity. Panics is avoided by falling back to the identity itself if
/// the port cannot be parsed (documented as an open edge case, see
/// DESIGN.md — every peer in this system is always started with a
/// numeric port so this fallback is not expected to trigger).
pub fn primary_endpoint_of(identity: &PeerAddr) -> PeerAddr {
	match split_host_port(identity.as_str()) {
		Some((host, port)) => PeerAddr::new(format!("{host}:{}", port.saturating_add(PRIMARY_PORT_OFFSET))),
		None => identity.clone(),
	}
}

fn split_host_port(addr: &str) -> Option<(&str, u16)> {
	let idx = addr.rfind(':')?;
	let (host, port_str) = (&addr[..idx], &addr[idx + 1..]);
	let port: u16 = port_str.parse().ok()?;
	Some((host, port))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn offsets_the_port() {
		let identity = PeerAddr::new("127.0.0.1:9000");
		assert_eq!(primary_endpoint_of(&identity).as_str(), "127.0.0.1:9001");
	}

	#[test]
	fn falls_back_without_numeric_port() {
		let identity = PeerAddr::new("not-an-address");
		assert_eq!(primary_endpoint_of(&identity), identity);
	}
}
