//! # Vault Configuration & Constants
//!
//! Every magic number in credvault lives here. Key lengths, nonce sizes, the
//! share-token separator, and the runtime-tunable [`VaultConfig`].
//!
//! Changing the cryptographic constants after wallets exist in the wild makes
//! every stored credential unreadable. Don't.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{VaultError, VaultResult};

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// Ed25519 for wallet identity keys.
pub const SIGNING_ALGORITHM: &str = "Ed25519";

/// Ed25519 private seed length in bytes.
pub const SIGNING_KEY_LENGTH: usize = 32;

/// Raw Ed25519 public key length in bytes (before SPKI wrapping).
pub const VERIFYING_KEY_LENGTH: usize = 32;

/// AES-256-GCM for credential payloads.
pub const SYMMETRIC_ALGORITHM: &str = "AES-256-GCM";

/// AES-256-GCM key length in bytes. Also the length of the share signing key.
pub const AES_KEY_LENGTH: usize = 32;

/// AES-256-GCM nonce length in bytes. 96 bits. Twelve. Not sixteen.
pub const AES_NONCE_LENGTH: usize = 12;

/// AES-256-GCM authentication tag length in bytes.
pub const AES_TAG_LENGTH: usize = 16;

/// Length of the HMAC key used to sign share tokens.
pub const SHARE_KEY_LENGTH: usize = 32;

/// HMAC-SHA256 output length in bytes.
pub const SHARE_SIGNATURE_LENGTH: usize = 32;

/// Separator between credential id and expiry in the share-token signing input.
pub const SHARE_SIGNING_SEPARATOR: char = '.';

/// Last calendar year a share-token expiry may fall in. `expiresAt` is a
/// four-digit RFC 3339 year.
pub const MAX_SHARE_EXPIRY_YEAR: i32 = 9999;

/// SHA-256 digest length in bytes. The hex rendering is twice this.
pub const HASH_OUTPUT_LENGTH: usize = 32;

// ---------------------------------------------------------------------------
// DID
// ---------------------------------------------------------------------------

/// Prefix of every identifier this wallet issues.
pub const DID_KEY_PREFIX: &str = "did:key:";

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default share-token lifetime in seconds (10 minutes).
pub const DEFAULT_SHARE_TTL_SECS: i64 = 600;

/// Longest configurable default share-token lifetime (one year).
pub const MAX_SHARE_TTL_SECS: i64 = 365 * 24 * 60 * 60;

/// Default upper bound on a credential payload's canonical size (1 MiB).
pub const DEFAULT_MAX_PAYLOAD_BYTES: usize = 1024 * 1024;

/// Runtime configuration for a [`VaultService`](crate::vault::VaultService).
///
/// Everything here is safe to change between restarts. Unlike the constants
/// above, nothing stored depends on these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Lifetime applied to share tokens when the caller doesn't pick an expiry.
    pub share_token_ttl_secs: i64,
    /// Largest canonical payload accepted for encryption.
    pub max_payload_bytes: usize,
}

impl VaultConfig {
    /// The default share lifetime as a chrono [`Duration`], or `None` if the
    /// configured seconds don't fit one.
    pub fn share_token_ttl(&self) -> Option<Duration> {
        Duration::try_seconds(self.share_token_ttl_secs)
    }

    /// Reject settings the service can't honour. Call once at startup.
    pub fn validate(&self) -> VaultResult<()> {
        if self.share_token_ttl_secs <= 0 || self.share_token_ttl_secs > MAX_SHARE_TTL_SECS {
            return Err(VaultError::InvalidRequest(format!(
                "share token lifetime must be between 1 and {MAX_SHARE_TTL_SECS} seconds, got {}",
                self.share_token_ttl_secs
            )));
        }
        if self.max_payload_bytes == 0 {
            return Err(VaultError::InvalidRequest(
                "max payload size must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            share_token_ttl_secs: DEFAULT_SHARE_TTL_SECS,
            max_payload_bytes: DEFAULT_MAX_PAYLOAD_BYTES,
        }
    }
}
