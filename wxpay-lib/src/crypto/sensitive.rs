//! RSA-OAEP for sensitive request and response fields.
//!
//! Personal data in request bodies (names, phone numbers, ID numbers) must be
//! encrypted with the public key of a platform certificate, and the request
//! must name that certificate in `Wechatpay-Serial`. The gateway encrypts
//! such fields in responses with the merchant's public key.
//!
//! Padding is OAEP with SHA-1 and MGF1-SHA-1, as the gateway specifies.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::{Oaep, RsaPrivateKey};

use crate::certificates::PlatformCertificate;
use crate::{Result, WxPayError};

/// Encrypt a field for the gateway, returning Base64 ciphertext.
///
/// Use the newest certificate, see [`crate::CertificateStore::latest`].
pub fn encrypt_sensitive(plaintext: &str, certificate: &PlatformCertificate) -> Result<String> {
    let ciphertext = certificate
        .public_key
        .encrypt(
            &mut rand::thread_rng(),
            Oaep::new::<sha1::Sha1>(),
            plaintext.as_bytes(),
        )
        .map_err(|e| WxPayError::Encryption(e.to_string()))?;
    Ok(BASE64.encode(ciphertext))
}

/// Decrypt a Base64 field the gateway encrypted to the merchant key.
pub fn decrypt_sensitive(ciphertext_b64: &str, private_key: &RsaPrivateKey) -> Result<String> {
    let ciphertext = BASE64
        .decode(ciphertext_b64.trim())
        .map_err(|e| WxPayError::Decryption(format!("ciphertext is not base64: {e}")))?;
    let plaintext = private_key
        .decrypt(Oaep::new::<sha1::Sha1>(), &ciphertext)
        .map_err(|e| WxPayError::Decryption(e.to_string()))?;
    String::from_utf8(plaintext)
        .map_err(|_| WxPayError::Decryption("plaintext is not UTF-8".to_string()))
}
