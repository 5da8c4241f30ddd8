//! # Secret Key Container
//!
//! [`SecretKey`] holds 32 bytes that must never leave the process by
//! accident: the identity seed, the data key, and the share signing key.
//!
//! - No `Serialize`. Persisting a secret means calling
//!   [`expose_secret`](SecretKey::expose_secret) on purpose.
//! - `Debug` prints `SecretKey(<redacted>)`. Logs are forever.
//! - Bytes are zeroized on drop.
//! - Equality is constant time.

use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::AES_KEY_LENGTH;

/// A 256-bit secret, zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey([u8; AES_KEY_LENGTH]);

impl SecretKey {
    /// Wrap existing key bytes. The caller's copy is not zeroized; if it
    /// came from somewhere sensitive, clean it up yourself.
    pub fn from_bytes(bytes: [u8; AES_KEY_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Length-checked constructor for bytes coming out of storage.
    pub fn try_from_slice(slice: &[u8]) -> Option<Self> {
        let bytes: [u8; AES_KEY_LENGTH] = slice.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Draw a fresh key from the OS CSPRNG.
    ///
    /// Panics if the OS entropy source fails. There is no sensible recovery
    /// from that, and retrying would just hand out weaker keys.
    pub fn random() -> Self {
        let mut bytes = [0u8; AES_KEY_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Borrow the raw key bytes. Every call site is a place a secret can leak.
    pub fn expose_secret(&self) -> &[u8; AES_KEY_LENGTH] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.ct_eq(&other.0).into()
    }
}

impl Eq for SecretKey {}
