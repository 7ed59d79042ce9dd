//! WeChat Pay API v3 client core.
//!
//! This crate implements the authorization protocol spoken with the WeChat Pay
//! gateway and leaves the per-endpoint request catalog to callers:
//!
//! - **Request signing**: canonical signing strings, RSA PKCS#1 v1.5 / SHA-256
//!   signatures and the `WECHATPAY2-SHA256-RSA2048` authorization header
//! - **Response verification**: detached signatures checked against a store of
//!   gateway platform certificates selected by serial number
//! - **Platform certificates**: authorized listing call plus concurrent
//!   AES-256-GCM decryption of every returned certificate
//! - **Transport Abstraction**: trait-based design, with a reqwest implementation
//!   behind the default `http-transport` feature
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use wxpay_lib::{ApiV3Key, Credential, GatewayClient, GatewayConfig, GatewayRequest, HttpTransport};
//!
//! let credential = Credential::from_pem("1900000001", "5157F09EFDC096DE15EBE81A47057A7232F1B8E1", &pem)?;
//! let api_v3_key = ApiV3Key::new(api_v3_key_bytes)?;
//! let transport = HttpTransport::new(GatewayConfig::default())?;
//!
//! let client = GatewayClient::new(credential, api_v3_key, transport);
//! client.refresh_certificates().await?;
//!
//! let response = client.execute(GatewayRequest::get("/v3/refund/domestic/refunds/R1")).await?;
//! assert!(response.verified);
//! ```

pub mod certificates;
pub mod client;
pub mod credential;
pub mod crypto;
pub mod errors;
pub mod protocol;
pub mod transport;
pub mod verify;

/// Test utilities for signing and certificate tests.
///
/// This module is only available with the `test-utils` feature or in test builds.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use certificates::{
    fetch_and_decrypt, CertificateEntry, CertificateFetcher, CertificateListing, CertificateStore,
    PlatformCertificate,
};
pub use client::{GatewayClient, GatewayRequest, GatewayResponse};
pub use credential::{Credential, CredentialConfig, SignedRequest};
pub use crypto::{ApiV3Key, EncryptedResource, RequestSigner};
pub use errors::{WxPayError, WxPayErrorCode};
pub use protocol::{
    build_authorization, canonical_request, canonical_response, CanonicalRequest,
    SignatureEnvelope, AUTHORIZATION_SCHEME,
};
pub use transport::{
    GatewayConfig, GatewayTransport, Method, ResponseHeaders, TransportRequest, TransportResponse,
};
pub use verify::{verify_response, VerificationInput};

#[cfg(feature = "http-transport")]
pub use transport::HttpTransport;

/// Common result alias for WeChat Pay operations.
pub type Result<T> = std::result::Result<T, WxPayError>;
