//! Response signature verification.
//!
//! Every signed gateway reply carries four headers: `Wechatpay-Timestamp`,
//! `Wechatpay-Nonce`, `Wechatpay-Signature` and `Wechatpay-Serial`. The
//! signature covers `"{timestamp}\n{nonce}\n{body}\n"` and was made with the
//! platform certificate named by the serial.
//!
//! Verification fails closed: an unknown serial, a bad signature, or
//! partial headers never count as verified.

use crate::certificates::CertificateStore;
use crate::protocol::canonical_response;
use crate::protocol::paths::headers;
use crate::transport::ResponseHeaders;
use crate::{Result, WxPayError};

/// Everything needed to check one response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerificationInput {
    /// `Wechatpay-Timestamp`, verbatim.
    pub timestamp: String,
    /// `Wechatpay-Nonce`.
    pub nonce: String,
    /// Raw response body.
    pub body: Vec<u8>,
    /// `Wechatpay-Signature` (Base64).
    pub signature: String,
    /// `Wechatpay-Serial`, selects the verifying key.
    pub serial_no: String,
}

impl VerificationInput {
    /// Extract the signature headers from a response.
    ///
    /// Returns `Ok(None)` when none of them is present (the response was not
    /// signed) and an [`WxPayError::InvalidData`] error naming the first
    /// missing header when only some are.
    pub fn from_headers(
        response_headers: &ResponseHeaders,
        body: impl Into<Vec<u8>>,
    ) -> Result<Option<Self>> {
        let timestamp = response_headers.get(headers::WECHATPAY_TIMESTAMP);
        let nonce = response_headers.get(headers::WECHATPAY_NONCE);
        let signature = response_headers.get(headers::WECHATPAY_SIGNATURE);
        let serial_no = response_headers.get(headers::WECHATPAY_SERIAL);

        if timestamp.is_none() && nonce.is_none() && signature.is_none() && serial_no.is_none() {
            return Ok(None);
        }

        let require = |name: &str, value: Option<&str>| {
            value
                .map(str::to_string)
                .ok_or_else(|| WxPayError::invalid_data(name, "missing"))
        };
        let timestamp = require(headers::WECHATPAY_TIMESTAMP, timestamp)?;
        let nonce = require(headers::WECHATPAY_NONCE, nonce)?;
        let signature = require(headers::WECHATPAY_SIGNATURE, signature)?;
        let serial_no = require(headers::WECHATPAY_SERIAL, serial_no)?;

        Ok(Some(Self {
            timestamp,
            nonce,
            body: body.into(),
            signature,
            serial_no,
        }))
    }

    /// The canonical string the gateway signed.
    pub fn message(&self) -> Vec<u8> {
        canonical_response(&self.timestamp, &self.nonce, &self.body)
    }
}

/// Check a response signature against the store.
///
/// # Errors
///
/// - [`WxPayError::UnknownCertificate`] if the serial is not stored; refetch
///   certificates and try once more
/// - [`WxPayError::SignatureMismatch`] if the signature does not verify; the
///   response must be rejected
pub fn verify_response(input: &VerificationInput, store: &CertificateStore) -> Result<()> {
    let certificate = store
        .get(&input.serial_no)?
        .ok_or_else(|| WxPayError::UnknownCertificate {
            serial_no: input.serial_no.clone(),
        })?;

    if certificate.verify(&input.message(), &input.signature) {
        Ok(())
    } else {
        #[cfg(feature = "tracing")]
        tracing::warn!(serial_no = %input.serial_no, "response signature mismatch");
        Err(WxPayError::SignatureMismatch {
            serial_no: input.serial_no.clone(),
        })
    }
}
