//! # Wallet Secrets Provisioning
//!
//! Each wallet gets two symmetric secrets:
//!
//! - the **data key**, which encrypts credential payloads, and
//! - the **share signing key**, which MACs share tokens.
//!
//! Both are independent 256-bit draws from the OS CSPRNG. Neither is derived
//! from the other or from the identity key pair, so leaking one tells an
//! attacker nothing about the rest.

use super::secret::SecretKey;

/// The symmetric half of a wallet's key material.
#[derive(Debug, Clone)]
pub struct WalletSecrets {
    pub data_key: SecretKey,
    pub share_signing_key: SecretKey,
}

/// Generate a fresh, independent pair of wallet secrets.
///
/// Called once per wallet, during provisioning.
pub fn provision_secrets() -> WalletSecrets {
    WalletSecrets {
        data_key: SecretKey::random(),
        share_signing_key: SecretKey::random(),
    }
}
