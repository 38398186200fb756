//! Percent-encoding helpers for the client/router wire boundary (spec §6).
//!
//! Paths and payloads travel the wire as percent-encoded strings; this
//! module is the single place that encodes/decodes them, so every other
//! layer (the local store, the history, the RPC handlers) deals only in
//! opaque `Vec<u8>`/`&str`, per spec §4.1's closing paragraph.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

const FRAGMENT: &AsciiSet = &CONTROLS.add(b' ').add(b'"').add(b'<').add(b'>').add(b'`').add(b'%').add(b'/').add(b'?').add(b'#');

pub fn encode_path(path: &str) -> String {
	utf8_percent_encode(path, FRAGMENT).to_string()
}

pub fn decode_path(encoded: &str) -> Result<String, std::str::Utf8Error> {
	Ok(percent_decode_str(encoded).decode_utf8()?.into_owned())
}

/// Payload bytes are base64'd, then percent-encoded, so arbitrary binary
/// data survives a query string or JSON string field unmodified.
pub fn encode_bytes(bytes: &[u8]) -> String {
	use base64::Engine;
	base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub fn decode_bytes(encoded: &str) -> Result<Vec<u8>, base64::DecodeError> {
	use base64::Engine;
	base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(encoded)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn path_round_trips() {
		let path = "some dir/a file.txt";
		let encoded = encode_path(path);
		assert_eq!(decode_path(&encoded).unwrap(), path);
	}

	#[test]
	fn bytes_round_trip() {
		let data = b"\x00\x01binary\xffdata";
		let encoded = encode_bytes(data);
		assert_eq!(decode_bytes(&encoded).unwrap(), data);
	}
}
