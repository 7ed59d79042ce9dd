//! Platform certificate fetch-and-decrypt.
//!
//! One authorized `GET /v3/certificates`, then one blocking task per
//! encrypted entry. Tasks write into a private staging store; the caller gets
//! that store only if every task succeeded. The first failure aborts the
//! remaining tasks and fails the whole batch, since an entry that does not
//! decrypt means the API v3 key is wrong or the listing was tampered with.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use super::store::{CertificateStore, PlatformCertificate};
use crate::credential::Credential;
use crate::crypto::{ApiV3Key, EncryptedResource};
use crate::protocol::paths::{headers, CERTIFICATES_PATH};
use crate::protocol::Method;
use crate::transport::{GatewayTransport, TransportRequest, TransportResponse};
use crate::verify::{verify_response, VerificationInput};
use crate::{Result, WxPayError};

/// Body of the certificate listing response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateListing {
    /// One entry per platform certificate currently valid at the gateway.
    #[serde(default)]
    pub data: Vec<CertificateEntry>,
}

/// One platform certificate in the listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateEntry {
    /// Certificate serial number.
    pub serial_no: String,
    /// RFC 3339 start of validity.
    #[serde(default)]
    pub effective_time: String,
    /// RFC 3339 end of validity.
    #[serde(default)]
    pub expire_time: String,
    /// Certificate PEM encrypted under the API v3 key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypt_certificate: Option<EncryptedResource>,
}

impl CertificateEntry {
    fn encrypted(&self) -> Option<&EncryptedResource> {
        self.encrypt_certificate
            .as_ref()
            .filter(|resource| !resource.ciphertext.is_empty())
    }

    /// Decrypt this entry into a [`PlatformCertificate`].
    pub fn decrypt(&self, api_v3_key: &ApiV3Key) -> Result<PlatformCertificate> {
        let resource = self
            .encrypted()
            .ok_or_else(|| WxPayError::Decryption("entry carries no ciphertext".to_string()))?;
        let plaintext = api_v3_key.decrypt_resource(resource)?;
        let pem = String::from_utf8(plaintext)
            .map_err(|_| WxPayError::Decryption("certificate is not UTF-8".to_string()))?;

        Ok(PlatformCertificate::from_pem(self.serial_no.clone(), pem)?.with_validity(
            parse_time("effective_time", &self.effective_time)?,
            parse_time("expire_time", &self.expire_time)?,
        ))
    }
}

fn parse_time(field: &str, value: &str) -> Result<Option<DateTime<FixedOffset>>> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(Some)
        .map_err(|e| WxPayError::invalid_data(field, e.to_string()))
}

/// Fetch the certificate listing and decrypt every entry.
///
/// Equivalent to `CertificateFetcher::new().fetch(..)`. Every failure,
/// including transport and gateway errors, comes back as
/// [`WxPayError::CertificateFetch`].
pub async fn fetch_and_decrypt<T>(
    credential: &Credential,
    api_v3_key: &ApiV3Key,
    transport: &T,
) -> Result<CertificateStore>
where
    T: GatewayTransport + ?Sized,
{
    CertificateFetcher::new()
        .fetch(credential, api_v3_key, transport)
        .await
}

/// Configurable certificate fetch.
#[derive(Clone, Copy, Debug, Default)]
pub struct CertificateFetcher {
    verify_listing: bool,
}

impl CertificateFetcher {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also check the listing response's own signature against the freshly
    /// decrypted certificates. Off by default.
    pub fn verify_listing(mut self, enabled: bool) -> Self {
        self.verify_listing = enabled;
        self
    }

    /// Run the full batch: sign, send, parse, decrypt.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(skip_all, fields(mchid = %credential.merchant_id()))
    )]
    pub async fn fetch<T>(
        &self,
        credential: &Credential,
        api_v3_key: &ApiV3Key,
        transport: &T,
    ) -> Result<CertificateStore>
    where
        T: GatewayTransport + ?Sized,
    {
        let response = request_listing(credential, transport)
            .await
            .map_err(|e| WxPayError::certificate_fetch(None, e))?;

        let listing: CertificateListing = serde_json::from_slice(&response.body)
            .map_err(|e| WxPayError::certificate_fetch(None, e.into()))?;

        let store = decrypt_listing(&listing, api_v3_key).await?;

        if self.verify_listing {
            check_listing_signature(&response, &store)
                .map_err(|e| WxPayError::certificate_fetch(None, e))?;
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(count = store.len()?, "platform certificates decrypted");

        Ok(store)
    }
}

async fn request_listing<T>(credential: &Credential, transport: &T) -> Result<TransportResponse>
where
    T: GatewayTransport + ?Sized,
{
    let signed = credential.authorize(Method::Get, CERTIFICATES_PATH, b"")?;
    let response = transport
        .send(TransportRequest {
            method: Method::Get,
            path: CERTIFICATES_PATH.to_string(),
            headers: vec![(headers::AUTHORIZATION.to_string(), signed.authorization)],
            body: Vec::new(),
        })
        .await?;

    if !response.is_success() {
        return Err(WxPayError::from_gateway_reply(response.status, &response.body));
    }
    Ok(response)
}

fn check_listing_signature(response: &TransportResponse, store: &CertificateStore) -> Result<()> {
    let input = VerificationInput::from_headers(&response.headers, response.body.clone())?
        .ok_or_else(|| WxPayError::invalid_data("response", "listing carries no signature headers"))?;
    verify_response(&input, store)
}

/// Decrypt every entry that carries ciphertext, concurrently.
///
/// Entries without ciphertext are skipped. The first failing entry aborts
/// the tasks still queued and fails the batch; nothing staged so far is
/// returned.
pub async fn decrypt_listing(
    listing: &CertificateListing,
    api_v3_key: &ApiV3Key,
) -> Result<CertificateStore> {
    let staging = Arc::new(CertificateStore::new());
    let mut tasks = JoinSet::new();

    for entry in &listing.data {
        if entry.encrypted().is_none() {
            #[cfg(feature = "tracing")]
            tracing::debug!(serial_no = %entry.serial_no, "skipping entry without ciphertext");
            continue;
        }

        let entry = entry.clone();
        let key = api_v3_key.clone();
        let staging = Arc::clone(&staging);
        tasks.spawn_blocking(move || {
            entry
                .decrypt(&key)
                .and_then(|certificate| staging.put(certificate))
                .map_err(|e| (entry.serial_no, e))
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err((serial_no, err))) => {
                tasks.abort_all();
                #[cfg(feature = "tracing")]
                tracing::warn!(serial_no = %serial_no, error = %err, "certificate batch failed");
                return Err(WxPayError::certificate_fetch(Some(serial_no), err));
            }
            Err(join_err) => {
                tasks.abort_all();
                return Err(WxPayError::certificate_fetch(
                    None,
                    WxPayError::Internal(format!("decryption task failed: {join_err}")),
                ));
            }
        }
    }

    match Arc::try_unwrap(staging) {
        Ok(store) => Ok(store),
        Err(shared) => shared.snapshot(),
    }
}
