//! Merchant credential: identity plus the key that signs every request.

use std::path::PathBuf;

use crate::crypto::{ApiV3Key, RequestSigner};
use crate::protocol::nonce::{generate_nonce, unix_timestamp};
use crate::protocol::{CanonicalRequest, Method, SignatureEnvelope, AUTHORIZATION_SCHEME};
use crate::{Result, WxPayError};

/// A signed request: the signer output and the header value built from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedRequest {
    /// Nonce, timestamp and signature.
    pub envelope: SignatureEnvelope,
    /// `Authorization` header value.
    pub authorization: String,
}

/// Merchant id, certificate serial and private key.
///
/// Immutable once built.
#[derive(Clone, Debug)]
pub struct Credential {
    merchant_id: String,
    serial_no: String,
    signer: RequestSigner,
}

impl Credential {
    /// Build a credential from an already decoded signer.
    pub fn new(
        merchant_id: impl Into<String>,
        serial_no: impl Into<String>,
        signer: RequestSigner,
    ) -> Result<Self> {
        let merchant_id = merchant_id.into();
        let serial_no = serial_no.into();
        if merchant_id.trim().is_empty() {
            return Err(WxPayError::invalid_credential("mchid", "missing"));
        }
        if serial_no.trim().is_empty() {
            return Err(WxPayError::invalid_credential("serial_no", "missing"));
        }
        Ok(Self {
            merchant_id,
            serial_no,
            signer,
        })
    }

    /// Build a credential from a PKCS#8 or PKCS#1 private key PEM.
    pub fn from_pem(
        merchant_id: impl Into<String>,
        serial_no: impl Into<String>,
        private_key_pem: &str,
    ) -> Result<Self> {
        Self::new(merchant_id, serial_no, RequestSigner::from_pem(private_key_pem)?)
    }

    /// Merchant id (`mchid`).
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Serial number of the merchant API certificate.
    pub fn serial_no(&self) -> &str {
        &self.serial_no
    }

    /// The request signer.
    pub fn signer(&self) -> &RequestSigner {
        &self.signer
    }

    /// Sign a request with a fresh nonce and the current time.
    pub fn authorize(&self, method: Method, path: &str, body: &[u8]) -> Result<SignedRequest> {
        self.authorize_with(method, path, body, unix_timestamp(), &generate_nonce())
    }

    /// Sign a request with an explicit timestamp and nonce.
    pub fn authorize_with(
        &self,
        method: Method,
        path: &str,
        body: &[u8],
        timestamp: i64,
        nonce: &str,
    ) -> Result<SignedRequest> {
        let envelope = self.signer.sign_request(&CanonicalRequest {
            method,
            path,
            timestamp,
            nonce,
            body,
        })?;
        let authorization =
            envelope.to_authorization(AUTHORIZATION_SCHEME, &self.merchant_id, &self.serial_no)?;
        Ok(SignedRequest {
            envelope,
            authorization,
        })
    }
}

/// Merchant settings as loaded from the environment or a config file.
#[derive(Clone)]
pub struct CredentialConfig {
    /// Merchant id.
    pub merchant_id: String,
    /// Merchant API certificate serial number.
    pub serial_no: String,
    /// Path to the merchant private key PEM.
    pub private_key_path: PathBuf,
    /// API v3 key as configured in the merchant console.
    pub api_v3_key: String,
}

impl CredentialConfig {
    /// Load from environment variables.
    ///
    /// Requires:
    /// - `WXPAY_MCHID`: merchant id
    /// - `WXPAY_SERIAL_NO`: merchant certificate serial
    /// - `WXPAY_PRIVATE_KEY_PATH`: path to the private key PEM
    /// - `WXPAY_API_V3_KEY`: 32-character API v3 key
    ///
    /// Returns `None` if any of them is unset.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            merchant_id: std::env::var("WXPAY_MCHID").ok()?,
            serial_no: std::env::var("WXPAY_SERIAL_NO").ok()?,
            private_key_path: PathBuf::from(std::env::var("WXPAY_PRIVATE_KEY_PATH").ok()?),
            api_v3_key: std::env::var("WXPAY_API_V3_KEY").ok()?,
        })
    }

    /// Read the private key and build the credential and API v3 key.
    pub fn load(&self) -> Result<(Credential, ApiV3Key)> {
        let pem = std::fs::read_to_string(&self.private_key_path).map_err(|e| {
            WxPayError::invalid_credential(
                "private_key",
                format!("cannot read {}: {e}", self.private_key_path.display()),
            )
        })?;
        let credential = Credential::from_pem(&self.merchant_id, &self.serial_no, &pem)?;
        let api_v3_key = ApiV3Key::new(self.api_v3_key.as_bytes())?;
        Ok((credential, api_v3_key))
    }
}

impl std::fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("merchant_id", &self.merchant_id)
            .field("serial_no", &self.serial_no)
            .field("private_key_path", &self.private_key_path)
            .finish_non_exhaustive()
    }
}
