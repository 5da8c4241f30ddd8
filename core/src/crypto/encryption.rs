//! # AES-256-GCM Payload Encryption
//!
//! Envelope encryption for credential payloads. Each wallet owns one data
//! key; every payload stored under that wallet is sealed with it.
//!
//! We use AES-256-GCM because:
//!
//! - It's an AEAD cipher. Encryption and integrity in one call, no
//!   encrypt-then-MAC bikeshedding.
//! - Hardware acceleration is everywhere.
//! - 256-bit keys leave plenty of margin.
//!
//! ## Nonce management
//!
//! Every call to [`encrypt_payload`] draws a fresh 96-bit nonce from the OS
//! CSPRNG. Reusing a nonce under the same key leaks the XOR of the plaintexts
//! and lets an attacker forge tags, so there is no API that accepts a
//! caller-chosen nonce.
//!
//! ## Wire format
//!
//! Unlike a packed `nonce || ciphertext || tag` blob, an [`EncryptedPayload`]
//! keeps the three parts as separate URL-safe base64 strings. The tag is
//! detached from the ciphertext, so the ciphertext is exactly as long as the
//! canonical plaintext.
//!
//! ## Failure modes
//!
//! Decryption has exactly one cryptographic failure:
//! [`VaultError::AuthenticationFailure`]. Wrong key, flipped bit, truncated
//! tag, a nonce that doesn't decode: all the same error, and no plaintext is
//! ever handed back. If the tag checks out but the bytes aren't JSON you get
//! [`VaultError::DecodeError`] instead.

use aes_gcm::{
    aead::{AeadInPlace, KeyInit},
    Aes256Gcm, Key, Nonce, Tag,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use zeroize::Zeroizing;

use super::encoding::{from_base64url, to_base64url};
use super::hash::canonical_bytes;
use super::secret::SecretKey;
use crate::config::{AES_NONCE_LENGTH, AES_TAG_LENGTH};
use crate::error::{VaultError, VaultResult};

/// A sealed credential payload.
///
/// The three fields are produced together by one encryption and must be
/// consumed together by one decryption. Swapping the nonce or tag from a
/// different payload fails authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Ciphertext, URL-safe base64.
    pub ciphertext: String,
    /// 96-bit nonce, URL-safe base64. Older records call this `iv`.
    #[serde(alias = "iv")]
    pub nonce: String,
    /// 128-bit GCM tag, URL-safe base64.
    pub tag: String,
}

/// Seal raw bytes under `key` with a fresh random nonce.
///
/// Callers holding a structured payload want [`encrypt_payload`]; this is the
/// lower layer for callers that already produced canonical bytes.
pub fn encrypt_bytes(plaintext: &[u8], key: &SecretKey) -> VaultResult<EncryptedPayload> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.expose_secret()));

    let mut nonce_bytes = [0u8; AES_NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let mut buffer = plaintext.to_vec();
    // GCM only refuses messages beyond 2^36 bytes.
    let tag = cipher
        .encrypt_in_place_detached(nonce, b"", &mut buffer)
        .map_err(|_| VaultError::PayloadTooLarge {
            size: plaintext.len(),
            limit: usize::MAX,
        })?;

    Ok(EncryptedPayload {
        ciphertext: to_base64url(&buffer),
        nonce: to_base64url(nonce_bytes),
        tag: to_base64url(tag),
    })
}

/// Open a sealed payload and return the raw plaintext bytes.
///
/// The returned buffer zeroizes itself on drop.
pub fn decrypt_bytes(
    encrypted: &EncryptedPayload,
    key: &SecretKey,
) -> VaultResult<Zeroizing<Vec<u8>>> {
    // A field that doesn't decode is indistinguishable from a forged one.
    let nonce_bytes =
        from_base64url(&encrypted.nonce).ok_or(VaultError::AuthenticationFailure)?;
    let tag_bytes = from_base64url(&encrypted.tag).ok_or(VaultError::AuthenticationFailure)?;
    let ciphertext =
        from_base64url(&encrypted.ciphertext).ok_or(VaultError::AuthenticationFailure)?;

    if nonce_bytes.len() != AES_NONCE_LENGTH || tag_bytes.len() != AES_TAG_LENGTH {
        return Err(VaultError::AuthenticationFailure);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.expose_secret()));
    let nonce = Nonce::from_slice(&nonce_bytes);
    let tag = Tag::from_slice(&tag_bytes);

    let mut buffer = Zeroizing::new(ciphertext);
    cipher
        .decrypt_in_place_detached(nonce, b"", &mut buffer, tag)
        .map_err(|_| VaultError::AuthenticationFailure)?;
    Ok(buffer)
}

/// Encrypt a structured payload under the wallet's data key.
///
/// # Example
///
/// ```
/// use credvault::crypto::{decrypt_payload, encrypt_payload, SecretKey};
/// use serde_json::json;
///
/// let key = SecretKey::random();
/// let payload = json!({ "degree": "BSc Computer Science" });
///
/// let sealed = encrypt_payload(&payload, &key).unwrap();
/// assert_eq!(decrypt_payload(&sealed, &key).unwrap(), payload);
/// ```
pub fn encrypt_payload(payload: &Value, key: &SecretKey) -> VaultResult<EncryptedPayload> {
    let plaintext = Zeroizing::new(canonical_bytes(payload));
    encrypt_bytes(&plaintext, key)
}

/// Decrypt a payload produced by [`encrypt_payload`].
pub fn decrypt_payload(encrypted: &EncryptedPayload, key: &SecretKey) -> VaultResult<Value> {
    let plaintext = decrypt_bytes(encrypted, key)?;
    serde_json::from_slice(&plaintext).map_err(|_| VaultError::DecodeError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn test_key() -> SecretKey {
        let mut key = [0u8; 32];
        for (i, byte) in key.iter_mut().enumerate() {
            *byte = i as u8;
        }
        SecretKey::from_bytes(key)
    }

    fn sample_payload() -> Value {
        json!({
            "credentialSubject": { "id": "did:example:alice", "degree": "BSc" },
            "issuanceDate": "2026-01-01T00:00:00Z",
            "scores": [97, 88, 91],
        })
    }

    fn flip_bit(encoded: &str, bit: usize) -> String {
        let mut bytes = from_base64url(encoded).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        to_base64url(bytes)
    }

    #[test]
    fn roundtrip() {
        let key = test_key();
        let sealed = encrypt_payload(&sample_payload(), &key).unwrap();
        assert_eq!(decrypt_payload(&sealed, &key).unwrap(), sample_payload());
    }

    #[test]
    fn field_lengths() {
        let key = test_key();
        let payload = sample_payload();
        let sealed = encrypt_payload(&payload, &key).unwrap();

        assert_eq!(from_base64url(&sealed.nonce).unwrap().len(), AES_NONCE_LENGTH);
        assert_eq!(from_base64url(&sealed.tag).unwrap().len(), AES_TAG_LENGTH);
        // Detached tag: ciphertext is exactly plaintext-sized.
        assert_eq!(
            from_base64url(&sealed.ciphertext).unwrap().len(),
            canonical_bytes(&payload).len()
        );
    }

    #[test]
    fn unique_nonces() {
        let key = test_key();
        let a = encrypt_payload(&sample_payload(), &key).unwrap();
        let b = encrypt_payload(&sample_payload(), &key).unwrap();
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails_authentication() {
        let sealed = encrypt_payload(&sample_payload(), &test_key()).unwrap();
        let other = SecretKey::random();
        assert_eq!(
            decrypt_payload(&sealed, &other),
            Err(VaultError::AuthenticationFailure)
        );
    }

    #[test]
    fn every_ciphertext_and_tag_bit_is_authenticated() {
        let key = test_key();
        let sealed = encrypt_payload(&json!({ "k": "v" }), &key).unwrap();
        let ct_bits = from_base64url(&sealed.ciphertext).unwrap().len() * 8;

        for bit in 0..ct_bits {
            let mut tampered = sealed.clone();
            tampered.ciphertext = flip_bit(&sealed.ciphertext, bit);
            assert_eq!(
                decrypt_payload(&tampered, &key),
                Err(VaultError::AuthenticationFailure),
                "ciphertext bit {bit}"
            );
        }

        for bit in 0..AES_TAG_LENGTH * 8 {
            let mut tampered = sealed.clone();
            tampered.tag = flip_bit(&sealed.tag, bit);
            assert_eq!(
                decrypt_payload(&tampered, &key),
                Err(VaultError::AuthenticationFailure),
                "tag bit {bit}"
            );
        }
    }

    #[test]
    fn swapped_nonce_fails_authentication() {
        let key = test_key();
        let a = encrypt_payload(&sample_payload(), &key).unwrap();
        let b = encrypt_payload(&sample_payload(), &key).unwrap();
        let franken = EncryptedPayload {
            nonce: b.nonce,
            ..a
        };
        assert_eq!(
            decrypt_payload(&franken, &key),
            Err(VaultError::AuthenticationFailure)
        );
    }

    #[test]
    fn malformed_fields_look_like_tampering() {
        let key = test_key();
        let sealed = encrypt_payload(&sample_payload(), &key).unwrap();

        let bad_nonce = EncryptedPayload {
            nonce: "%%%".into(),
            ..sealed.clone()
        };
        let short_tag = EncryptedPayload {
            tag: to_base64url([0u8; 8]),
            ..sealed.clone()
        };
        let long_nonce = EncryptedPayload {
            nonce: to_base64url([0u8; 16]),
            ..sealed
        };

        for case in [bad_nonce, short_tag, long_nonce] {
            assert_eq!(
                decrypt_payload(&case, &key),
                Err(VaultError::AuthenticationFailure)
            );
        }
    }

    #[test]
    fn authenticated_garbage_is_a_decode_error() {
        let key = test_key();
        let sealed = encrypt_bytes(b"definitely { not json", &key).unwrap();
        assert_eq!(decrypt_payload(&sealed, &key), Err(VaultError::DecodeError));
    }

    #[test]
    fn accepts_legacy_iv_field_name() {
        let key = test_key();
        let sealed = encrypt_payload(&sample_payload(), &key).unwrap();
        let legacy = json!({
            "ciphertext": sealed.ciphertext,
            "iv": sealed.nonce,
            "tag": sealed.tag,
        });
        let parsed: EncryptedPayload = serde_json::from_value(legacy).unwrap();
        assert_eq!(decrypt_payload(&parsed, &key).unwrap(), sample_payload());
    }

    #[test]
    fn empty_object_roundtrips() {
        let key = test_key();
        let sealed = encrypt_payload(&json!({}), &key).unwrap();
        assert_eq!(decrypt_payload(&sealed, &key).unwrap(), json!({}));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..6)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip(payload in arb_json(), key_bytes in any::<[u8; 32]>()) {
            let key = SecretKey::from_bytes(key_bytes);
            let sealed = encrypt_payload(&payload, &key).unwrap();
            prop_assert_eq!(decrypt_payload(&sealed, &key).unwrap(), payload);
        }

        #[test]
        fn prop_single_bit_flip_fails(payload in arb_json(), seed in any::<usize>()) {
            let key = test_key();
            let sealed = encrypt_payload(&payload, &key).unwrap();
            let ct_len = from_base64url(&sealed.ciphertext).unwrap().len();
            let total_bits = (ct_len + AES_TAG_LENGTH) * 8;
            let bit = seed % total_bits;

            let mut tampered = sealed.clone();
            if bit < ct_len * 8 {
                tampered.ciphertext = flip_bit(&sealed.ciphertext, bit);
            } else {
                tampered.tag = flip_bit(&sealed.tag, bit - ct_len * 8);
            }
            prop_assert_eq!(
                decrypt_payload(&tampered, &key),
                Err(VaultError::AuthenticationFailure)
            );
        }
    }
}
