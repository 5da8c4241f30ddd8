//! # Error Taxonomy
//!
//! One error type for the whole vault. Callers (the HTTP layer, mostly) map
//! these onto user-facing results; the core never retries and never logs
//! the secret material that led to a failure.
//!
//! Cryptographic failures are vague. "Wrong key" and "tampered
//! ciphertext" are the same error as far as anyone outside this crate knows.

use thiserror::Error;

/// Everything that can go wrong inside the vault.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// An operation needed wallet key material but no wallet was provisioned.
    #[error("wallet not initialized")]
    WalletNotInitialized,

    /// A wallet already exists for this owner and the store refused to overwrite it.
    #[error("wallet already exists")]
    WalletAlreadyExists,

    /// AEAD tag check failed. Covers wrong key, flipped bits, and mangled
    /// nonce/tag encodings alike.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Ciphertext authenticated but the plaintext didn't parse back into a
    /// payload. Shouldn't happen unless someone encrypted garbage with our key.
    #[error("decrypted payload could not be decoded")]
    DecodeError,

    #[error("malformed token")]
    MalformedToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("token expired")]
    TokenExpired,

    #[error("credential not found: {0}")]
    CredentialNotFound(String),

    /// Canonical payload exceeds the configured maximum.
    #[error("payload too large: {size} bytes exceeds limit of {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The public key could not be wrapped in its interoperable encoding.
    #[error("key encoding failed")]
    KeyEncoding,

    #[error("storage error: {0}")]
    Storage(String),
}

pub type VaultResult<T> = Result<T, VaultError>;
