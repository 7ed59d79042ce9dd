//! RSA PKCS#1 v1.5 / SHA-256 request signing and signature checks.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;

use super::keys::decode_private_key;
use crate::protocol::nonce::{generate_nonce, unix_timestamp};
use crate::protocol::{CanonicalRequest, Method, SignatureEnvelope};
use crate::{Result, WxPayError};

/// Signs canonical request strings with the merchant private key.
///
/// The key never leaves this type and is not printed by `Debug`.
#[derive(Clone)]
pub struct RequestSigner {
    private_key: RsaPrivateKey,
    signing_key: SigningKey<Sha256>,
}

impl RequestSigner {
    /// Create a signer from a decoded private key.
    pub fn new(private_key: RsaPrivateKey) -> Self {
        let signing_key = SigningKey::<Sha256>::new(private_key.clone());
        Self {
            private_key,
            signing_key,
        }
    }

    /// Create a signer from PKCS#8 or PKCS#1 PEM.
    pub fn from_pem(pem: &str) -> Result<Self> {
        decode_private_key(pem).map(Self::new)
    }

    /// Sign `message` and return the Base64 signature.
    ///
    /// The digest is SHA-256 over the raw bytes. Blinding consumes secure
    /// randomness; the signature itself is deterministic.
    pub fn sign(&self, message: &[u8]) -> Result<String> {
        let signature: Signature = self
            .signing_key
            .try_sign_with_rng(&mut rand::thread_rng(), message)
            .map_err(|e| WxPayError::Signing(e.to_string()))?;
        Ok(BASE64.encode(signature.to_bytes()))
    }

    /// Sign a request with an explicit timestamp and nonce.
    pub fn sign_request(&self, request: &CanonicalRequest<'_>) -> Result<SignatureEnvelope> {
        let signature = self.sign(&request.to_bytes())?;
        Ok(SignatureEnvelope {
            nonce: request.nonce.to_string(),
            timestamp: request.timestamp,
            signature,
        })
    }

    /// Sign a request with a fresh nonce and the current time.
    pub fn sign_now(&self, method: Method, path: &str, body: &[u8]) -> Result<SignatureEnvelope> {
        let nonce = generate_nonce();
        self.sign_request(&CanonicalRequest {
            method,
            path,
            timestamp: unix_timestamp(),
            nonce: &nonce,
            body,
        })
    }

    /// The merchant private key, for decrypting fields the gateway encrypted
    /// to the merchant.
    pub(crate) fn private_key(&self) -> &RsaPrivateKey {
        &self.private_key
    }

    /// Public half of the merchant key.
    pub fn public_key(&self) -> RsaPublicKey {
        RsaPublicKey::from(&self.private_key)
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner").finish_non_exhaustive()
    }
}

/// Sign `message` with `private_key` (PKCS#1 v1.5, SHA-256, Base64 output).
pub fn sign(message: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    RequestSigner::new(private_key.clone()).sign(message)
}

/// Check a Base64 PKCS#1 v1.5 / SHA-256 signature over `message`.
///
/// Returns `false` for undecodable Base64 and malformed signatures as well as
/// for genuine mismatches: every failure rejects.
pub fn verify_signature(message: &[u8], signature_b64: &str, public_key: &RsaPublicKey) -> bool {
    let Ok(raw) = BASE64.decode(signature_b64.trim()) else {
        return false;
    };
    let Ok(signature) = Signature::try_from(raw.as_slice()) else {
        return false;
    };
    VerifyingKey::<Sha256>::new(public_key.clone())
        .verify(message, &signature)
        .is_ok()
}
