//! Cryptographic primitives for the WeChat Pay API v3 protocol.
//!
//! # Security Properties
//!
//! - **Request authenticity**: RSA PKCS#1 v1.5 over SHA-256 with the merchant key
//! - **Response authenticity**: the same scheme, checked with a platform certificate
//! - **Certificate confidentiality and integrity**: AES-256-GCM under the API v3 key;
//!   any tag failure is fatal
//! - **Sensitive fields**: RSA-OAEP under the newest platform certificate

pub mod aead;
pub mod keys;
pub mod sensitive;
mod signer;

pub use aead::{decrypt_aes_256_gcm, encrypt_aes_256_gcm, ApiV3Key, EncryptedResource};
pub use signer::{sign, verify_signature, RequestSigner};
