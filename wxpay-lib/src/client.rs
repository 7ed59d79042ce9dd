//! Authorized request execution.
//!
//! [`GatewayClient`] is the primitive the endpoint catalog is built on: sign a
//! request, send it, reject non-2xx replies, and verify the response
//! signature before anything reads the body.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::certificates::{CertificateFetcher, CertificateStore};
use crate::credential::Credential;
use crate::crypto::sensitive;
use crate::crypto::{ApiV3Key, EncryptedResource};
use crate::protocol::paths::headers;
use crate::protocol::Method;
use crate::transport::{GatewayTransport, ResponseHeaders, TransportRequest};
use crate::verify::{verify_response, VerificationInput};
use crate::{Result, WxPayError};

/// One call to make through [`GatewayClient::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayRequest {
    /// HTTP method.
    pub method: Method,
    /// Path including the query string.
    pub path: String,
    /// Body bytes, signed and sent verbatim.
    pub body: Vec<u8>,
    /// Platform certificate the body's sensitive fields were encrypted for.
    pub platform_serial: Option<String>,
}

impl GatewayRequest {
    /// Create a request.
    pub fn new(method: Method, path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            method,
            path: path.into(),
            body: body.into(),
            platform_serial: None,
        }
    }

    /// A bodyless GET.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path, Vec::new())
    }

    /// A POST with a raw body.
    pub fn post(path: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::new(Method::Post, path, body)
    }

    /// A request with a JSON-serialized body.
    pub fn json<B: Serialize + ?Sized>(
        method: Method,
        path: impl Into<String>,
        body: &B,
    ) -> Result<Self> {
        Ok(Self::new(method, path, serde_json::to_vec(body)?))
    }

    /// Send `Wechatpay-Serial` naming the platform certificate used to
    /// encrypt fields in the body.
    pub fn with_platform_serial(mut self, serial_no: impl Into<String>) -> Self {
        self.platform_serial = Some(serial_no.into());
        self
    }
}

/// A 2xx reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatewayResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: ResponseHeaders,
    /// Raw body.
    pub body: Vec<u8>,
    /// Whether a signature was present and verified. `false` only for an
    /// empty body sent without signature headers (e.g. `204 No Content`).
    pub verified: bool,
}

impl GatewayResponse {
    /// Deserialize the body as JSON.
    ///
    /// Fails with [`WxPayError::UnsignedResponse`] unless the reply was
    /// verified.
    pub fn json<R: DeserializeOwned>(&self) -> Result<R> {
        if !self.verified {
            return Err(WxPayError::UnsignedResponse {
                status: self.status,
            });
        }
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// `Request-ID` assigned by the gateway.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(headers::REQUEST_ID)
    }
}

/// Client for the gateway's authorized API.
///
/// Holds the merchant credential, the API v3 key, a transport and a shared
/// certificate store. The store starts empty; fill it with
/// [`GatewayClient::refresh_certificates`] or seed it out-of-band.
pub struct GatewayClient<T> {
    credential: Credential,
    api_v3_key: ApiV3Key,
    transport: T,
    certificates: Arc<CertificateStore>,
    fetcher: CertificateFetcher,
}

impl<T: GatewayTransport> GatewayClient<T> {
    /// Create a client with an empty certificate store.
    pub fn new(credential: Credential, api_v3_key: ApiV3Key, transport: T) -> Self {
        Self {
            credential,
            api_v3_key,
            transport,
            certificates: Arc::new(CertificateStore::new()),
            fetcher: CertificateFetcher::new(),
        }
    }

    /// Share an existing certificate store.
    pub fn with_certificate_store(mut self, certificates: Arc<CertificateStore>) -> Self {
        self.certificates = certificates;
        self
    }

    /// Use a configured fetcher for [`GatewayClient::refresh_certificates`].
    pub fn with_fetcher(mut self, fetcher: CertificateFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The certificate store responses are verified against.
    pub fn certificates(&self) -> &Arc<CertificateStore> {
        &self.certificates
    }

    /// The merchant credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `Authorization` header value for a request, with a fresh nonce and
    /// the current time.
    pub fn authorization(&self, method: Method, path: &str, body: &[u8]) -> Result<String> {
        Ok(self.credential.authorize(method, path, body)?.authorization)
    }

    /// Sign, send and verify one request.
    ///
    /// # Errors
    ///
    /// - [`WxPayError::Gateway`] for a non-2xx status
    /// - [`WxPayError::UnknownCertificate`] / [`WxPayError::SignatureMismatch`]
    ///   when a signed reply does not verify
    /// - [`WxPayError::UnsignedResponse`] when a 2xx reply has a body but no
    ///   signature headers
    /// - transport errors as returned by the transport
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(method = %request.method, path = %request.path))
    )]
    pub async fn execute(&self, request: GatewayRequest) -> Result<GatewayResponse> {
        let signed = self
            .credential
            .authorize(request.method, &request.path, &request.body)?;

        let mut request_headers = vec![(headers::AUTHORIZATION.to_string(), signed.authorization)];
        if let Some(serial_no) = request.platform_serial {
            request_headers.push((headers::WECHATPAY_SERIAL.to_string(), serial_no));
        }

        let response = self
            .transport
            .send(TransportRequest {
                method: request.method,
                path: request.path,
                headers: request_headers,
                body: request.body,
            })
            .await?;

        if !response.is_success() {
            return Err(WxPayError::from_gateway_reply(response.status, &response.body));
        }

        let verified = match VerificationInput::from_headers(&response.headers, response.body.clone())? {
            Some(input) => {
                verify_response(&input, &self.certificates)?;
                true
            }
            None if response.body.is_empty() => {
                #[cfg(feature = "tracing")]
                tracing::debug!(status = response.status, "empty reply carries no signature");
                false
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(status = response.status, "rejecting unsigned reply");
                return Err(WxPayError::UnsignedResponse {
                    status: response.status,
                });
            }
        };

        Ok(GatewayResponse {
            status: response.status,
            headers: response.headers,
            body: response.body,
            verified,
        })
    }

    /// GET `path` and deserialize the verified JSON reply.
    pub async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R> {
        self.execute(GatewayRequest::get(path)).await?.json()
    }

    /// POST `body` as JSON to `path` and deserialize the verified JSON reply.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.execute(GatewayRequest::json(Method::Post, path, body)?)
            .await?
            .json()
    }

    /// Fetch and decrypt the platform certificates, then publish them into
    /// the client's store.
    ///
    /// The store is only touched after the whole batch succeeded. Returns the
    /// number of certificates fetched.
    pub async fn refresh_certificates(&self) -> Result<usize> {
        let batch = self
            .fetcher
            .fetch(&self.credential, &self.api_v3_key, &self.transport)
            .await?;
        let count = batch.len()?;
        self.certificates.publish(batch)?;
        Ok(count)
    }

    /// Encrypt a sensitive field with the newest platform certificate.
    ///
    /// Returns the certificate serial (send it via
    /// [`GatewayRequest::with_platform_serial`]) and the Base64 ciphertext.
    pub fn encrypt_sensitive(&self, plaintext: &str) -> Result<(String, String)> {
        let certificate = self
            .certificates
            .latest()?
            .ok_or_else(|| WxPayError::UnknownCertificate {
                serial_no: String::new(),
            })?;
        let ciphertext = sensitive::encrypt_sensitive(plaintext, &certificate)?;
        Ok((certificate.serial_no.clone(), ciphertext))
    }

    /// Decrypt a sensitive field the gateway encrypted to the merchant key.
    pub fn decrypt_sensitive(&self, ciphertext_b64: &str) -> Result<String> {
        sensitive::decrypt_sensitive(ciphertext_b64, self.credential.signer().private_key())
    }

    /// Decrypt an AES-256-GCM resource (callback payloads use the same scheme
    /// as certificates).
    pub fn decrypt_resource(&self, resource: &EncryptedResource) -> Result<Vec<u8>> {
        self.api_v3_key.decrypt_resource(resource)
    }
}
