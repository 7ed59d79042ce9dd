//! `Authorization` header assembly.
//!
//! Format:
//!
//! ```text
//! {scheme} mchid="{mchid}",nonce_str="{nonce}",timestamp="{timestamp}",serial_no="{serial_no}",signature="{signature}"
//! ```
//!
//! The gateway parses by key name, but documented examples and some legacy
//! validators are order-sensitive, so the field order is fixed.

use crate::{Result, WxPayError};

/// Authorization scheme for RSA-2048 / SHA-256 request signatures.
pub const AUTHORIZATION_SCHEME: &str = "WECHATPAY2-SHA256-RSA2048";

/// Signer output for one request: everything the header needs besides the
/// merchant identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignatureEnvelope {
    /// Nonce that went into the canonical string.
    pub nonce: String,
    /// Unix timestamp (seconds) that went into the canonical string.
    pub timestamp: i64,
    /// Base64 signature over the canonical string.
    pub signature: String,
}

impl SignatureEnvelope {
    /// Assemble the header value for this envelope.
    pub fn to_authorization(&self, scheme: &str, merchant_id: &str, serial_no: &str) -> Result<String> {
        build_authorization(
            scheme,
            merchant_id,
            &self.nonce,
            &self.timestamp.to_string(),
            serial_no,
            &self.signature,
        )
    }
}

/// Build the `Authorization` header value.
///
/// Every field is required. An empty value, or one that would break out of
/// its quotes, fails with [`WxPayError::InvalidCredentialInput`] instead of
/// producing a malformed header.
///
/// # Example
///
/// ```
/// use wxpay_lib::build_authorization;
///
/// let header = build_authorization(
///     "WECHATPAY2-SHA256-RSA2048", "10000", "N1", "T1", "S1", "SIG1",
/// ).unwrap();
/// assert_eq!(
///     header,
///     r#"WECHATPAY2-SHA256-RSA2048 mchid="10000",nonce_str="N1",timestamp="T1",serial_no="S1",signature="SIG1""#
/// );
/// ```
pub fn build_authorization(
    scheme: &str,
    merchant_id: &str,
    nonce: &str,
    timestamp: &str,
    serial_no: &str,
    signature: &str,
) -> Result<String> {
    if scheme.is_empty() || scheme.chars().any(char::is_whitespace) {
        return Err(WxPayError::invalid_credential(
            "scheme",
            "must be a single non-empty token",
        ));
    }

    let fields = [
        ("mchid", merchant_id),
        ("nonce_str", nonce),
        ("timestamp", timestamp),
        ("serial_no", serial_no),
        ("signature", signature),
    ];

    let mut header = String::with_capacity(
        scheme.len() + fields.iter().map(|(k, v)| k.len() + v.len() + 4).sum::<usize>(),
    );
    header.push_str(scheme);
    header.push(' ');

    for (index, (key, value)) in fields.iter().enumerate() {
        check_field(key, value)?;
        if index > 0 {
            header.push(',');
        }
        header.push_str(key);
        header.push_str("=\"");
        header.push_str(value);
        header.push('"');
    }

    Ok(header)
}

fn check_field(key: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(WxPayError::invalid_credential(key, "missing"));
    }
    if value.contains('"') || value.contains(['\r', '\n']) {
        return Err(WxPayError::invalid_credential(
            key,
            "contains a quote or line break",
        ));
    }
    Ok(())
}
