//! Builders for gateway payloads.

use rand::distributions::Alphanumeric;
use rand::Rng;

use super::fixtures;
use crate::certificates::{CertificateEntry, CertificateListing};
use crate::crypto::{ApiV3Key, EncryptedResource, RequestSigner};
use crate::protocol::canonical_response;
use crate::protocol::nonce::{generate_nonce, unix_timestamp};
use crate::protocol::paths::headers;
use crate::transport::{ResponseHeaders, TransportResponse};

const ASSOCIATED_DATA: &str = "certificate";

fn gcm_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// Builds a `/v3/certificates` listing encrypted under an API v3 key.
pub struct ListingBuilder {
    key: ApiV3Key,
    entries: Vec<CertificateEntry>,
}

impl ListingBuilder {
    /// Start an empty listing.
    pub fn new(key: ApiV3Key) -> Self {
        Self {
            key,
            entries: Vec::new(),
        }
    }

    fn entry(serial_no: &str, resource: Option<EncryptedResource>) -> CertificateEntry {
        CertificateEntry {
            serial_no: serial_no.to_string(),
            effective_time: fixtures::EFFECTIVE_TIME.to_string(),
            expire_time: fixtures::EXPIRE_TIME.to_string(),
            encrypt_certificate: resource,
        }
    }

    fn encrypt(&self, pem: &str) -> EncryptedResource {
        self.key
            .encrypt_resource(pem.as_bytes(), &gcm_nonce(), ASSOCIATED_DATA)
            .expect("encrypt fixture certificate")
    }

    /// Add a correctly encrypted certificate.
    pub fn certificate(mut self, serial_no: &str, pem: &str) -> Self {
        let resource = self.encrypt(pem);
        self.entries.push(Self::entry(serial_no, Some(resource)));
        self
    }

    /// Add an entry whose ciphertext has one byte flipped.
    pub fn corrupted(mut self, serial_no: &str, pem: &str) -> Self {
        use base64::engine::general_purpose::STANDARD as BASE64;
        use base64::Engine as _;

        let mut resource = self.encrypt(pem);
        let mut raw = BASE64.decode(&resource.ciphertext).expect("fixture base64");
        raw[0] ^= 0x01;
        resource.ciphertext = BASE64.encode(raw);
        self.entries.push(Self::entry(serial_no, Some(resource)));
        self
    }

    /// Add an entry with no encrypted certificate.
    pub fn without_ciphertext(mut self, serial_no: &str) -> Self {
        self.entries.push(Self::entry(serial_no, None));
        self
    }

    /// The listing.
    pub fn build(&self) -> CertificateListing {
        CertificateListing {
            data: self.entries.clone(),
        }
    }

    /// The listing as a JSON body.
    pub fn to_json(&self) -> Vec<u8> {
        serde_json::to_vec(&self.build()).expect("serialize listing")
    }
}

/// A gateway response signed now by the fixture platform key for `serial_no`.
pub fn signed_response(status: u16, body: impl Into<Vec<u8>>, serial_no: &str) -> TransportResponse {
    signed_response_at(
        status,
        body,
        serial_no,
        &unix_timestamp().to_string(),
        &generate_nonce(),
    )
}

/// Like [`signed_response`] with an explicit timestamp and nonce.
pub fn signed_response_at(
    status: u16,
    body: impl Into<Vec<u8>>,
    serial_no: &str,
    timestamp: &str,
    nonce: &str,
) -> TransportResponse {
    let body = body.into();
    let signer = RequestSigner::from_pem(fixtures::platform_key_for(serial_no))
        .expect("fixture platform key");
    let signature = signer
        .sign(&canonical_response(timestamp, nonce, &body))
        .expect("sign fixture response");

    TransportResponse {
        status,
        headers: ResponseHeaders::new()
            .with("Content-Type", "application/json")
            .with(headers::WECHATPAY_TIMESTAMP, timestamp)
            .with(headers::WECHATPAY_NONCE, nonce)
            .with(headers::WECHATPAY_SIGNATURE, signature)
            .with(headers::WECHATPAY_SERIAL, serial_no),
        body,
    }
}
