//! Shared helpers for integration tests.
//!
//! Built only on the public API so the tests exercise what callers see.

#![allow(dead_code)]

use std::collections::HashMap;

use wxpay_lib::{
    canonical_response, ApiV3Key, CertificateEntry, CertificateListing, Credential, RequestSigner,
};

pub const MERCHANT_KEY_PEM: &str = include_str!("../fixtures/merchant_key.pem");
pub const MERCHANT_PUBLIC_PEM: &str = include_str!("../fixtures/merchant_public.pem");
pub const PLATFORM_A_KEY_PEM: &str = include_str!("../fixtures/platform_a_key.pem");
pub const PLATFORM_A_CERT_PEM: &str = include_str!("../fixtures/platform_a_cert.pem");
pub const PLATFORM_B_KEY_PEM: &str = include_str!("../fixtures/platform_b_key.pem");
pub const PLATFORM_B_CERT_PEM: &str = include_str!("../fixtures/platform_b_cert.pem");

pub const PLATFORM_A_SERIAL: &str = "5157F09EFDC096DE15EBE81A47057A7232F1B8E1";
pub const PLATFORM_B_SERIAL: &str = "3A1B5C2D4E6F708192A3B4C5D6E7F80912345678";

pub const MERCHANT_ID: &str = "1900000001";
pub const MERCHANT_SERIAL: &str = "6F2A0B1C3D4E5F60718293A4B5C6D7E8F9012345";
pub const API_V3_KEY: &str = "a7cde1ZfE6Ebsd4d9B8C2eF1aB2cD3eF";

pub fn credential() -> Credential {
    Credential::from_pem(MERCHANT_ID, MERCHANT_SERIAL, MERCHANT_KEY_PEM).unwrap()
}

pub fn api_v3_key() -> ApiV3Key {
    ApiV3Key::new(API_V3_KEY).unwrap()
}

/// Encrypted listing body for `(serial, pem)` pairs. Nonces are distinct
/// 12-character strings.
pub fn listing_json(certificates: &[(&str, &str)]) -> Vec<u8> {
    let key = api_v3_key();
    let data = certificates
        .iter()
        .enumerate()
        .map(|(i, (serial_no, pem))| CertificateEntry {
            serial_no: serial_no.to_string(),
            effective_time: "2024-01-01T00:00:00+08:00".to_string(),
            expire_time: "2029-01-01T00:00:00+08:00".to_string(),
            encrypt_certificate: Some(
                key.encrypt_resource(pem.as_bytes(), &format!("nonce{i:07}"), "certificate")
                    .unwrap(),
            ),
        })
        .collect();
    serde_json::to_vec(&CertificateListing { data }).unwrap()
}

/// Signature headers for `body` signed by a platform key.
pub struct ResponseSignature {
    pub timestamp: String,
    pub nonce: String,
    pub signature: String,
    pub serial_no: String,
}

pub fn sign_response(body: &[u8], serial_no: &str, platform_key_pem: &str) -> ResponseSignature {
    let timestamp = "1700000000".to_string();
    let nonce = "c5ac7061fccab6bf3e254dcf98995b8c".to_string();
    let signature = RequestSigner::from_pem(platform_key_pem)
        .unwrap()
        .sign(&canonical_response(&timestamp, &nonce, body))
        .unwrap();
    ResponseSignature {
        timestamp,
        nonce,
        signature,
        serial_no: serial_no.to_string(),
    }
}

/// Split an `Authorization` header into its scheme and `key="value"` pairs.
pub fn parse_authorization(header: &str) -> (String, HashMap<String, String>) {
    let (scheme, rest) = header.split_once(' ').unwrap();
    let fields = rest
        .split(',')
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap();
            (key.to_string(), value.trim_matches('"').to_string())
        })
        .collect();
    (scheme.to_string(), fields)
}
