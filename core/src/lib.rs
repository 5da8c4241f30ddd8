// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Credvault - Core Library
//!
//! The cryptographic core of a verifiable-credential wallet. One owner, one
//! wallet, any number of credentials sealed under that wallet's keys.
//!
//! Ed25519 for the owner's identity (exported as SPKI DER and wrapped in a
//! `did:key`), AES-256-GCM for credential bodies, SHA-256 over canonical
//! JSON for integrity fingerprints, and HMAC-SHA256 for short-lived share
//! tokens that let a third party read exactly one credential.
//!
//! ## Architecture
//!
//! - **crypto** - Primitives: keys, AEAD, canonical hashing, base64url.
//! - **identity** - Key pair generation and DID derivation.
//! - **share** - Share-token issuance and verification.
//! - **vault** - Wallets, credentials, and the [`VaultService`] facade.
//! - **storage** - Store traits plus in-memory and sled implementations.
//! - **clock** - Injectable time source.
//! - **config** - Protocol constants and runtime settings.
//! - **error** - The [`VaultError`] taxonomy.
//!
//! ## Quick start
//!
//! ```
//! use credvault::config::VaultConfig;
//! use credvault::identity::DidMethod;
//! use credvault::vault::{NewCredential, VaultService};
//! use serde_json::json;
//!
//! let vault = VaultService::in_memory(VaultConfig::default());
//! vault.create_wallet("Alice", DidMethod::Key).unwrap();
//!
//! let meta = vault
//!     .store_credential(NewCredential {
//!         issuer: "did:web:university.example".into(),
//!         subject: "did:key:alice".into(),
//!         types: vec!["VerifiableCredential".into()],
//!         payload: json!({ "degree": "BSc" }),
//!         expires_at: None,
//!     })
//!     .unwrap();
//!
//! let share = vault.share_credential(&meta.id, None).unwrap();
//! let opened = vault.redeem_share_token(&share.token).unwrap();
//! assert_eq!(opened.payload["degree"], "BSc");
//! ```
//!
//! ## Design Philosophy
//!
//! 1. No unsafe code. Anywhere.
//! 2. Secrets zeroize on drop and never reach a log line.
//! 3. Crypto failures say as little as possible about why.

pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod identity;
pub mod share;
pub mod storage;
pub mod vault;

pub use error::{VaultError, VaultResult};
pub use vault::VaultService;
