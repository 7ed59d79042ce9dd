//! Error types for WeChat Pay operations.
//!
//! Every failure of the signing, verification and certificate flows surfaces
//! to the immediate caller. Nothing in this crate downgrades a verification or
//! decryption failure to a warning, and nothing retries on its own.

/// Error codes for FFI and log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum WxPayErrorCode {
    /// Transport/network layer error
    Transport = 2000,
    /// Connection failed
    ConnectionFailed = 2001,
    /// Connection timeout
    ConnectionTimeout = 2002,
    /// Gateway answered with a non-2xx status
    Gateway = 2100,
    /// Request signing failed
    Signing = 3000,
    /// Required credential field missing or malformed
    InvalidCredentialInput = 3001,
    /// Authenticated decryption failed
    Decryption = 3100,
    /// Asymmetric encryption of a sensitive field failed
    Encryption = 3101,
    /// No platform certificate for the given serial number
    UnknownCertificate = 3200,
    /// Response signature did not verify
    SignatureMismatch = 3201,
    /// A 2xx reply with a body carried no signature headers
    UnsignedResponse = 3202,
    /// Platform certificate fetch-and-decrypt batch failed
    CertificateFetch = 3300,
    /// Invalid request/data
    InvalidData = 5000,
    /// Serialization error
    Serialization = 5002,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for WeChat Pay operations.
#[derive(Debug, thiserror::Error)]
pub enum WxPayError {
    /// Malformed private key, or the signature primitive rejected the digest.
    #[error("signing error: {0}")]
    Signing(String),

    /// A field required to build a credential or authorization is missing.
    #[error("invalid credential input {field}: {reason}")]
    InvalidCredentialInput {
        /// Field name as it appears in the authorization header
        field: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Authentication-tag mismatch, wrong key length or malformed ciphertext.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Encrypting a sensitive field under a platform certificate failed.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// The serial number is not present in the certificate store.
    #[error("unknown platform certificate: {serial_no}")]
    UnknownCertificate {
        /// Serial number carried by the response
        serial_no: String,
    },

    /// The response signature does not match the stored public key.
    #[error("response signature mismatch for certificate {serial_no}")]
    SignatureMismatch {
        /// Serial number of the certificate used for the check
        serial_no: String,
    },

    /// A 2xx reply carried a body but none of the signature headers.
    #[error("gateway reply with status {status} is not signed")]
    UnsignedResponse {
        /// HTTP status code of the reply
        status: u16,
    },

    /// Fetching or decrypting platform certificates failed as a batch.
    #[error("platform certificate fetch failed: {source}")]
    CertificateFetch {
        /// Serial number of the entry that failed, when known
        serial_no: Option<String>,
        /// First failure observed in the batch
        #[source]
        source: Box<WxPayError>,
    },

    /// The gateway answered with a non-2xx status.
    #[error("gateway returned {status}: {code} {message}")]
    Gateway {
        /// HTTP status code
        status: u16,
        /// Gateway error code (e.g. `SIGN_ERROR`), empty when the body was not JSON
        code: String,
        /// Gateway error message or raw body
        message: String,
    },

    /// Transport/network layer error.
    #[error("transport error: {0}")]
    Transport(String),

    /// Connection failed.
    #[error("connection to {target} failed: {reason}")]
    ConnectionFailed {
        /// Target endpoint or service
        target: String,
        /// Underlying error message
        reason: String,
    },

    /// Connection timeout.
    #[error("{operation} timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Invalid data provided.
    #[error("invalid {field}: {reason}")]
    InvalidData {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal/unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WxPayError {
    /// Get the error code for FFI/log correlation.
    pub fn code(&self) -> WxPayErrorCode {
        match self {
            Self::Signing(_) => WxPayErrorCode::Signing,
            Self::InvalidCredentialInput { .. } => WxPayErrorCode::InvalidCredentialInput,
            Self::Decryption(_) => WxPayErrorCode::Decryption,
            Self::Encryption(_) => WxPayErrorCode::Encryption,
            Self::UnknownCertificate { .. } => WxPayErrorCode::UnknownCertificate,
            Self::SignatureMismatch { .. } => WxPayErrorCode::SignatureMismatch,
            Self::UnsignedResponse { .. } => WxPayErrorCode::UnsignedResponse,
            Self::CertificateFetch { .. } => WxPayErrorCode::CertificateFetch,
            Self::Gateway { .. } => WxPayErrorCode::Gateway,
            Self::Transport(_) => WxPayErrorCode::Transport,
            Self::ConnectionFailed { .. } => WxPayErrorCode::ConnectionFailed,
            Self::ConnectionTimeout { .. } => WxPayErrorCode::ConnectionTimeout,
            Self::InvalidData { .. } => WxPayErrorCode::InvalidData,
            Self::Serialization(_) => WxPayErrorCode::Serialization,
            Self::Internal(_) => WxPayErrorCode::Internal,
        }
    }

    /// Returns true if this error is potentially recoverable by retrying the
    /// same call. Cryptographic failures never are.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::ConnectionFailed { .. } | Self::ConnectionTimeout { .. }
        )
    }

    /// Returns true when the caller should fetch platform certificates again
    /// and retry verification once.
    pub fn needs_certificate_refresh(&self) -> bool {
        matches!(self, Self::UnknownCertificate { .. })
    }

    /// Create an invalid credential input error.
    pub fn invalid_credential(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCredentialInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid data error.
    pub fn invalid_data(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidData {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a failure of the certificate fetch-and-decrypt batch.
    pub fn certificate_fetch(serial_no: Option<String>, source: WxPayError) -> Self {
        Self::CertificateFetch {
            serial_no,
            source: Box::new(source),
        }
    }

    /// Build a gateway error from a non-2xx reply.
    ///
    /// The gateway answers errors with `{"code": "...", "message": "..."}`;
    /// anything else is kept verbatim as the message.
    pub fn from_gateway_reply(status: u16, body: &[u8]) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            #[serde(default)]
            code: String,
            #[serde(default)]
            message: String,
        }

        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(reply) => Self::Gateway {
                status,
                code: reply.code,
                message: reply.message,
            },
            Err(_) => Self::Gateway {
                status,
                code: String::new(),
                message: String::from_utf8_lossy(body).into_owned(),
            },
        }
    }
}

impl From<serde_json::Error> for WxPayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
