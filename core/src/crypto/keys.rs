//! # Identity Key Management
//!
//! Ed25519 key pairs for wallet identities.
//!
//! A wallet's identity key is what its DID names. The public half is exported
//! as a SubjectPublicKeyInfo DER document (the same bytes OpenSSL, WebCrypto
//! and Node would produce), which keeps the encoded identifier interoperable
//! with tooling outside this crate.
//!
//! ## Security considerations
//!
//! - The 32-byte seed lives in a [`SecretKey`], zeroized on drop. The dalek
//!   `SigningKey` zeroizes itself too.
//! - Key generation uses `OsRng`. If the OS RNG is broken, so is everything.
//! - Key bytes are never logged. `Debug` prints the public half only.

use ed25519_dalek::pkcs8::{DecodePublicKey, EncodePublicKey};
use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::fmt;

use super::encoding::to_base64url;
use super::secret::SecretKey;
use crate::config::VERIFYING_KEY_LENGTH;
use crate::error::{VaultError, VaultResult};

/// An Ed25519 identity key pair.
///
/// Not `Serialize`. Getting the seed out means calling
/// [`seed`](Self::seed) and owning the consequences.
pub struct IdentityKeypair {
    signing_key: SigningKey,
}

impl IdentityKeypair {
    /// Generate a fresh key pair from the OS CSPRNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Rebuild a key pair from its 32-byte seed.
    pub fn from_seed(seed: &SecretKey) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed.expose_secret()),
        }
    }

    /// The private seed, wrapped so it zeroizes on drop.
    pub fn seed(&self) -> SecretKey {
        SecretKey::from_bytes(self.signing_key.to_bytes())
    }

    /// Raw 32-byte Ed25519 public key.
    pub fn public_key_bytes(&self) -> [u8; VERIFYING_KEY_LENGTH] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// The public key as SubjectPublicKeyInfo DER (44 bytes for Ed25519).
    pub fn public_key_der(&self) -> VaultResult<Vec<u8>> {
        encode_public_key_der(&self.signing_key.verifying_key())
    }
}

impl fmt::Debug for IdentityKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IdentityKeypair(pub={})",
            to_base64url(self.public_key_bytes())
        )
    }
}

/// Wrap a verifying key in SubjectPublicKeyInfo DER.
pub fn encode_public_key_der(key: &VerifyingKey) -> VaultResult<Vec<u8>> {
    key.to_public_key_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|_| VaultError::KeyEncoding)
}

/// Parse SubjectPublicKeyInfo DER back into a verifying key.
pub fn decode_public_key_der(der: &[u8]) -> VaultResult<VerifyingKey> {
    VerifyingKey::from_public_key_der(der).map_err(|_| VaultError::KeyEncoding)
}
