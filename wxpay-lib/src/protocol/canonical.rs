//! Canonical signing strings.
//!
//! Builders return bytes rather than `String`: response bodies are signed
//! verbatim and are not guaranteed to be valid UTF-8.

use std::fmt;

/// HTTP method as it appears in the canonical request string.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Upper-case token used both on the wire and in the canonical string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outgoing call, as seen by the signer.
///
/// Constructed per call and never persisted.
///
/// # Example
///
/// ```
/// use wxpay_lib::{CanonicalRequest, Method};
///
/// let request = CanonicalRequest {
///     method: Method::Get,
///     path: "/v3/certificates",
///     timestamp: 1700000000,
///     nonce: "593BEC0C930BF1AFEB40B4A08C8FB242",
///     body: b"",
/// };
/// assert_eq!(
///     request.to_bytes(),
///     b"GET\n/v3/certificates\n1700000000\n593BEC0C930BF1AFEB40B4A08C8FB242\n\n".to_vec()
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    /// HTTP method.
    pub method: Method,
    /// Path including the query string, exactly as sent.
    pub path: &'a str,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Per-request random token.
    pub nonce: &'a str,
    /// Request body bytes (empty for GET).
    pub body: &'a [u8],
}

impl CanonicalRequest<'_> {
    /// Serialize into the exact byte sequence that gets signed.
    pub fn to_bytes(&self) -> Vec<u8> {
        canonical_request(self.method, self.path, self.timestamp, self.nonce, self.body)
    }
}

/// Build `METHOD\nPATH\nTIMESTAMP\nNONCE\nBODY\n`.
pub fn canonical_request(
    method: Method,
    path: &str,
    timestamp: i64,
    nonce: &str,
    body: &[u8],
) -> Vec<u8> {
    let timestamp = timestamp.to_string();
    let mut out = Vec::with_capacity(
        method.as_str().len() + path.len() + timestamp.len() + nonce.len() + body.len() + 5,
    );
    push_line(&mut out, method.as_str().as_bytes());
    push_line(&mut out, path.as_bytes());
    push_line(&mut out, timestamp.as_bytes());
    push_line(&mut out, nonce.as_bytes());
    push_line(&mut out, body);
    out
}

/// Build `TIMESTAMP\nNONCE\nBODY\n` for checking a gateway response.
///
/// `timestamp` is taken verbatim from the `Wechatpay-Timestamp` header and is
/// not reformatted.
pub fn canonical_response(timestamp: &str, nonce: &str, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(timestamp.len() + nonce.len() + body.len() + 3);
    push_line(&mut out, timestamp.as_bytes());
    push_line(&mut out, nonce.as_bytes());
    push_line(&mut out, body);
    out
}

fn push_line(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(field);
    out.push(b'\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_certificate_listing_request() {
        let nonce = "abcdefghijklmnopqrstuvwxyz012345";
        let bytes = canonical_request(Method::Get, "/v3/certificates", 1700000000, nonce, b"");
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            format!("GET\n/v3/certificates\n1700000000\n{nonce}\n\n")
        );
    }

    #[test]
    fn test_post_body_is_verbatim() {
        let body = br#"{"out_refund_no":"R1","amount":{"refund":1, "total":1}}"#;
        let bytes = canonical_request(
            Method::Post,
            "/v3/refund/domestic/refunds",
            1554208460,
            "593BEC0C930BF1AFEB40B4A08C8FB242",
            body,
        );
        let expected = [
            b"POST\n/v3/refund/domestic/refunds\n1554208460\n593BEC0C930BF1AFEB40B4A08C8FB242\n"
                .as_slice(),
            body.as_slice(),
            b"\n".as_slice(),
        ]
        .concat();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_query_string_is_kept() {
        let bytes = canonical_request(
            Method::Get,
            "/v3/profitsharing/orders/P1?sub_mchid=1900000109&transaction_id=4208",
            1,
            "n",
            b"",
        );
        assert!(bytes
            .windows(b"?sub_mchid=1900000109&transaction_id=4208\n".len())
            .any(|w| w == b"?sub_mchid=1900000109&transaction_id=4208\n"));
    }

    #[test]
    fn test_response_string() {
        let bytes = canonical_response("1700000000", "N1", br#"{"ok":true}"#);
        assert_eq!(bytes, b"1700000000\nN1\n{\"ok\":true}\n".to_vec());
    }

    #[test]
    fn test_response_body_not_utf8() {
        let bytes = canonical_response("1", "n", &[0xff, 0xfe]);
        assert_eq!(bytes, vec![b'1', b'\n', b'n', b'\n', 0xff, 0xfe, b'\n']);
    }

    #[test]
    fn test_method_tokens() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }

    proptest! {
        #[test]
        fn prop_canonical_request_is_deterministic(
            path in "/[a-z0-9/_?=&]{0,40}",
            timestamp in 0i64..4_000_000_000,
            nonce in "[A-Za-z0-9]{32}",
            body in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let first = canonical_request(Method::Post, &path, timestamp, &nonce, &body);
            let second = CanonicalRequest {
                method: Method::Post,
                path: &path,
                timestamp,
                nonce: &nonce,
                body: &body,
            }
            .to_bytes();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.iter().filter(|b| **b == b'\n').count()
                - body.iter().filter(|b| **b == b'\n').count(), 5);
            prop_assert_eq!(first.last(), Some(&b'\n'));
        }
    }
}
