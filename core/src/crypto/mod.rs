//! # Cryptographic Primitives for credvault
//!
//! Every key, every sealed payload and every content hash in the vault flows
//! through here.
//!
//! - **Ed25519** for wallet identity keys.
//! - **AES-256-GCM** for credential payloads.
//! - **SHA-256** for content hashes.
//! - **HMAC-SHA256** for share tokens (see [`crate::share`]).
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here is a thin, type-safe wrapper around audited
//! implementations. The only decisions made locally are encodings and which
//! errors collapse into which.

pub mod encoding;
pub mod encryption;
pub mod hash;
pub mod keys;
pub mod secret;
pub mod secrets;

pub use encoding::{from_base64url, to_base64url};
pub use encryption::{decrypt_payload, encrypt_payload, EncryptedPayload};
pub use hash::{canonical_bytes, hash_payload, sha256};
pub use keys::IdentityKeypair;
pub use secret::SecretKey;
pub use secrets::{provision_secrets, WalletSecrets};
