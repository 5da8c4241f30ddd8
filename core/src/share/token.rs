//! # Share Tokens
//!
//! A share token is a bearer capability: whoever presents a valid, unexpired
//! token can read the one credential it names. The token is self-certifying,
//! so verification needs the token and the wallet's share signing key and
//! nothing else. No lookups, no server-side state.
//!
//! ## Construction
//!
//! ```text
//! input     = credentialId || "." || expiresAt          (RFC 3339, ms, UTC "Z")
//! sig       = base64url(HMAC-SHA256(share_signing_key, input))
//! token     = base64url(JSON { credentialId, expiresAt, sig })
//! ```
//!
//! ## Verification order
//!
//! 1. Decode and parse. Anything unparseable is `malformed token`.
//! 2. Decode `sig`, recompute the MAC and compare the raw bytes in constant
//!    time. Mismatch, including a `sig` that isn't base64url, is
//!    `invalid signature`.
//! 3. Only then look at the clock. Past expiry is `token expired`.
//!
//! Checking the signature before the expiry means an attacker learns nothing
//! about the expiry logic from a forged token.
//!
//! ## No revocation
//!
//! Tokens can't be revoked before they expire. Issue short lifetimes.
//!
//! ## Expiry range
//!
//! `expiresAt` must render as a four-digit RFC 3339 year, so issuing refuses
//! expiries outside years 0000 through 9999. Anything else would produce a
//! token that its own verifier reads as malformed.

use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

use crate::config::{MAX_SHARE_EXPIRY_YEAR, SHARE_SIGNING_SEPARATOR};
use crate::crypto::encoding::{from_base64url, to_base64url};
use crate::crypto::SecretKey;
use crate::error::{VaultError, VaultResult};

type HmacSha256 = Hmac<Sha256>;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// An issued share token plus the claims it attests, for the issuer's benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareToken {
    /// The opaque bearer string handed to the verifier.
    pub token: String,
    pub credential_id: String,
    /// Serialized exactly as signed, e.g. `2026-03-01T12:10:00.000Z`.
    #[serde(serialize_with = "serialize_expiry")]
    pub expires_at: DateTime<Utc>,
}

fn serialize_expiry<S: serde::Serializer>(
    expires_at: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_expiry(*expires_at))
}

/// Why a token was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShareRejection {
    #[serde(rename = "malformed token")]
    Malformed,
    #[serde(rename = "invalid signature")]
    InvalidSignature,
    #[serde(rename = "token expired")]
    Expired,
    /// No wallet, so no key to check against. Only the service layer emits this.
    #[serde(rename = "wallet not initialized")]
    WalletNotInitialized,
}

impl ShareRejection {
    pub fn reason(&self) -> &'static str {
        match self {
            ShareRejection::Malformed => "malformed token",
            ShareRejection::InvalidSignature => "invalid signature",
            ShareRejection::Expired => "token expired",
            ShareRejection::WalletNotInitialized => "wallet not initialized",
        }
    }
}

impl fmt::Display for ShareRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

impl From<ShareRejection> for VaultError {
    fn from(rejection: ShareRejection) -> Self {
        match rejection {
            ShareRejection::Malformed => VaultError::MalformedToken,
            ShareRejection::InvalidSignature => VaultError::InvalidSignature,
            ShareRejection::Expired => VaultError::TokenExpired,
            ShareRejection::WalletNotInitialized => VaultError::WalletNotInitialized,
        }
    }
}

/// Outcome of [`verify_share_token`]. Never an error: bad tokens are an
/// expected input, not an exceptional one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareVerification {
    /// The credential the token names. Empty when the token didn't parse.
    pub credential_id: String,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<ShareRejection>,
}

impl ShareVerification {
    fn accepted(credential_id: String) -> Self {
        Self {
            credential_id,
            valid: true,
            reason: None,
        }
    }

    pub(crate) fn rejected(credential_id: String, reason: ShareRejection) -> Self {
        Self {
            credential_id,
            valid: false,
            reason: Some(reason),
        }
    }

    /// Collapse into a `Result`: the credential id, or the matching error.
    pub fn into_result(self) -> VaultResult<String> {
        match self.reason {
            None if self.valid => Ok(self.credential_id),
            Some(rejection) => Err(rejection.into()),
            None => Err(VaultError::MalformedToken),
        }
    }
}

/// The JSON object inside the token.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenEnvelope {
    credential_id: String,
    expires_at: String,
    sig: String,
}

// ---------------------------------------------------------------------------
// Issue / verify
// ---------------------------------------------------------------------------

/// Render a timestamp exactly the way it is signed: RFC 3339, millisecond
/// precision, `Z` suffix.
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn signing_input(credential_id: &str, expires_at: &str) -> String {
    format!("{credential_id}{SHARE_SIGNING_SEPARATOR}{expires_at}")
}

fn compute_mac(credential_id: &str, expires_at: &str, key: &SecretKey) -> Vec<u8> {
    // HMAC accepts keys of any length; the `Err` arm is unreachable.
    let Ok(mut mac) = HmacSha256::new_from_slice(key.expose_secret()) else {
        return Vec::new();
    };
    mac.update(signing_input(credential_id, expires_at).as_bytes());
    mac.finalize().into_bytes().to_vec()
}

/// Issue a token granting read access to `credential_id` until `expires_at`.
///
/// Sub-millisecond precision is dropped so that the returned `expires_at`
/// is exactly the instant the token attests. Fails with
/// [`VaultError::InvalidRequest`] when `expires_at` falls outside years
/// 0000 through 9999.
///
/// # Example
///
/// ```
/// use chrono::{Duration, Utc};
/// use credvault::crypto::SecretKey;
/// use credvault::share::{issue_share_token, verify_share_token};
///
/// let key = SecretKey::random();
/// let token = issue_share_token("cred-1", Utc::now() + Duration::minutes(10), &key).unwrap();
///
/// let outcome = verify_share_token(&token.token, &key, Utc::now());
/// assert!(outcome.valid);
/// assert_eq!(outcome.credential_id, "cred-1");
/// ```
pub fn issue_share_token(
    credential_id: &str,
    expires_at: DateTime<Utc>,
    key: &SecretKey,
) -> VaultResult<ShareToken> {
    if !(0..=MAX_SHARE_EXPIRY_YEAR).contains(&expires_at.year()) {
        return Err(VaultError::InvalidRequest(format!(
            "expiresAt must fall between years 0000 and {MAX_SHARE_EXPIRY_YEAR}"
        )));
    }
    let expires_at = expires_at.trunc_subsecs(3);
    let expires_str = format_expiry(expires_at);
    let sig = to_base64url(compute_mac(credential_id, &expires_str, key));

    let envelope = TokenEnvelope {
        credential_id: credential_id.to_string(),
        expires_at: expires_str,
        sig,
    };
    // A struct of three strings always serializes.
    let json = serde_json::to_vec(&envelope).unwrap_or_default();

    Ok(ShareToken {
        token: to_base64url(json),
        credential_id: credential_id.to_string(),
        expires_at,
    })
}

/// Check a token against the wallet's share signing key at time `now`.
pub fn verify_share_token(token: &str, key: &SecretKey, now: DateTime<Utc>) -> ShareVerification {
    let Some(envelope) = decode_envelope(token) else {
        tracing::debug!(reason = "malformed token", "share token rejected");
        return ShareVerification::rejected(String::new(), ShareRejection::Malformed);
    };
    let Ok(expires_at) = DateTime::parse_from_rfc3339(&envelope.expires_at) else {
        tracing::debug!(reason = "malformed token", "share token rejected");
        return ShareVerification::rejected(String::new(), ShareRejection::Malformed);
    };

    let expected = compute_mac(&envelope.credential_id, &envelope.expires_at, key);
    let presented = from_base64url(&envelope.sig).unwrap_or_default();
    let matches: bool = presented.as_slice().ct_eq(expected.as_slice()).into();
    if !matches {
        tracing::debug!(
            credential_id = %envelope.credential_id,
            reason = "invalid signature",
            "share token rejected"
        );
        return ShareVerification::rejected(envelope.credential_id, ShareRejection::InvalidSignature);
    }

    if now > expires_at.with_timezone(&Utc) {
        tracing::debug!(
            credential_id = %envelope.credential_id,
            reason = "token expired",
            "share token rejected"
        );
        return ShareVerification::rejected(envelope.credential_id, ShareRejection::Expired);
    }

    ShareVerification::accepted(envelope.credential_id)
}

fn decode_envelope(token: &str) -> Option<TokenEnvelope> {
    let raw = from_base64url(token.trim())?;
    serde_json::from_slice(&raw).ok()
}
