//! AES-256-GCM for gateway-encrypted resources.
//!
//! The gateway encrypts platform certificates (and callback resources) under
//! the merchant's API v3 key, a 32-byte secret agreed out-of-band.
//!
//! # Wire Format
//!
//! ```text
//! ciphertext = base64([N bytes ciphertext][16 bytes auth tag])
//! nonce      = 12 ASCII bytes, sent separately
//! aad        = ASCII context string, sent separately (may be empty)
//! ```
//!
//! A tag mismatch is always an error. Plaintext is never returned unless the
//! tag verified.

use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Nonce,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{Result, WxPayError};

/// Size of the API v3 key in bytes.
pub const KEY_SIZE: usize = 32;

/// Size of the nonce in bytes (96 bits for GCM).
pub const NONCE_SIZE: usize = 12;

/// Size of the authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Algorithm label the gateway attaches to encrypted resources.
pub const AEAD_AES_256_GCM: &str = "AEAD_AES_256_GCM";

/// An encrypted resource as it appears in gateway JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedResource {
    /// Algorithm label, `AEAD_AES_256_GCM` when present.
    #[serde(default)]
    pub algorithm: String,
    /// GCM nonce as sent by the gateway.
    pub nonce: String,
    /// Associated data bound into the tag.
    #[serde(default)]
    pub associated_data: String,
    /// Base64 ciphertext followed by the tag.
    pub ciphertext: String,
    /// Object type of the plaintext, set on callback resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_type: Option<String>,
}

/// The merchant's API v3 key.
///
/// Zeroized on drop. `Debug` never prints the key.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ApiV3Key {
    bytes: [u8; KEY_SIZE],
}

impl ApiV3Key {
    /// Create a key from exactly 32 bytes.
    ///
    /// The key configured in the merchant console is a 32-character ASCII
    /// string; pass its bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> Result<Self> {
        let bytes = bytes.as_ref();
        let bytes: [u8; KEY_SIZE] = bytes.try_into().map_err(|_| {
            WxPayError::Decryption(format!(
                "API v3 key must be {KEY_SIZE} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self { bytes })
    }

    /// Decrypt raw ciphertext (tag appended).
    pub fn decrypt(&self, ciphertext: &[u8], nonce: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        decrypt_aes_256_gcm(ciphertext, nonce, associated_data, &self.bytes)
    }

    /// Encrypt plaintext, returning ciphertext with the tag appended.
    pub fn encrypt(&self, plaintext: &[u8], nonce: &[u8], associated_data: &[u8]) -> Result<Vec<u8>> {
        encrypt_aes_256_gcm(plaintext, nonce, associated_data, &self.bytes)
    }

    /// Decrypt a resource object received from the gateway.
    pub fn decrypt_resource(&self, resource: &EncryptedResource) -> Result<Vec<u8>> {
        if !resource.algorithm.is_empty() && resource.algorithm != AEAD_AES_256_GCM {
            return Err(WxPayError::Decryption(format!(
                "unsupported algorithm {}",
                resource.algorithm
            )));
        }
        let ciphertext = BASE64
            .decode(resource.ciphertext.trim())
            .map_err(|e| WxPayError::Decryption(format!("ciphertext is not base64: {e}")))?;
        self.decrypt(
            &ciphertext,
            resource.nonce.as_bytes(),
            resource.associated_data.as_bytes(),
        )
    }

    /// Encrypt `plaintext` into a resource object, the inverse of
    /// [`ApiV3Key::decrypt_resource`].
    pub fn encrypt_resource(
        &self,
        plaintext: &[u8],
        nonce: &str,
        associated_data: &str,
    ) -> Result<EncryptedResource> {
        let ciphertext = self.encrypt(plaintext, nonce.as_bytes(), associated_data.as_bytes())?;
        Ok(EncryptedResource {
            algorithm: AEAD_AES_256_GCM.to_string(),
            nonce: nonce.to_string(),
            associated_data: associated_data.to_string(),
            ciphertext: BASE64.encode(ciphertext),
            original_type: None,
        })
    }
}

impl std::fmt::Debug for ApiV3Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiV3Key(<redacted>)")
    }
}

type Nonce12 = Nonce<aes_gcm::aead::consts::U12>;

fn cipher_and_nonce<'n>(key: &[u8], nonce: &'n [u8]) -> std::result::Result<(Aes256Gcm, &'n Nonce12), String> {
    if key.len() != KEY_SIZE {
        return Err(format!("key must be {KEY_SIZE} bytes, got {}", key.len()));
    }
    if nonce.len() != NONCE_SIZE {
        return Err(format!("nonce must be {NONCE_SIZE} bytes, got {}", nonce.len()));
    }
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|e| e.to_string())?;
    Ok((cipher, Nonce::from_slice(nonce)))
}

/// AES-256-GCM authenticated decryption.
///
/// # Errors
///
/// Returns [`WxPayError::Decryption`] if:
/// - The key is not 32 bytes or the nonce is not 12 bytes
/// - The ciphertext is shorter than the tag
/// - The tag does not verify (wrong key, nonce, associated data, or tampering)
pub fn decrypt_aes_256_gcm(
    ciphertext: &[u8],
    nonce: &[u8],
    associated_data: &[u8],
    key: &[u8],
) -> Result<Vec<u8>> {
    let (cipher, nonce) = cipher_and_nonce(key, nonce).map_err(WxPayError::Decryption)?;
    if ciphertext.len() < TAG_SIZE {
        return Err(WxPayError::Decryption(
            "ciphertext shorter than authentication tag".to_string(),
        ));
    }

    cipher
        .decrypt(
            nonce,
            Payload {
                msg: ciphertext,
                aad: associated_data,
            },
        )
        .map_err(|_| WxPayError::Decryption("authentication failed".to_string()))
}

/// AES-256-GCM encryption; output is ciphertext followed by the 16-byte tag.
///
/// Fails with [`WxPayError::Encryption`] on a bad key or nonce length.
pub fn encrypt_aes_256_gcm(
    plaintext: &[u8],
    nonce: &[u8],
    associated_data: &[u8],
    key: &[u8],
) -> Result<Vec<u8>> {
    let (cipher, nonce) = cipher_and_nonce(key, nonce).map_err(WxPayError::Encryption)?;
    cipher
        .encrypt(
            nonce,
            Payload {
                msg: plaintext,
                aad: associated_data,
            },
        )
        .map_err(|e| WxPayError::Encryption(e.to_string()))
}
