//! # Boundary Encoding
//!
//! Every binary value that crosses the vault boundary (keys, nonces, tags,
//! ciphertexts, signatures, whole tokens) is URL-safe base64 without padding.
//! One engine, one place, so nobody sneaks in `STANDARD` with `+` and `/`.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Encode bytes as URL-safe base64, no padding.
pub fn to_base64url(data: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode URL-safe base64 (no padding). Padded or standard-alphabet input is
/// rejected rather than guessed at.
pub fn from_base64url(data: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD.decode(data).ok()
}
