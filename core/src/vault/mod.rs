//! # Vault Module
//!
//! Where a wallet's key material meets the credentials it protects.
//!
//! ## Architecture
//!
//! ```text
//! wallet.rs     - Wallet: identity key pair, DID, data key, share key
//! credential.rs - Credential metadata and sealed payloads
//! service.rs    - VaultService: every operation, over injected stores
//! ```
//!
//! ## Design Principles
//!
//! 1. **A wallet is immutable once provisioned.** It is shared as
//!    `Arc<Wallet>` and nothing ever takes a write lock on key material.
//!
//! 2. **Secrets stay inside.** `Wallet` has no `Serialize`; callers see
//!    [`WalletPublicView`]. Nothing here logs a key or a plaintext.
//!
//! 3. **Stores are injected.** [`VaultService`] is generic over
//!    [`WalletStore`](crate::storage::WalletStore) and
//!    [`CredentialStore`](crate::storage::CredentialStore), so the same code
//!    runs over memory in tests and sled in production.

pub mod credential;
pub mod service;
pub mod wallet;

pub use credential::{
    CredentialMeta, CredentialStatus, NewCredential, OpenedCredential, StoredCredential,
};
pub use service::VaultService;
pub use wallet::{Wallet, WalletPublicView};
