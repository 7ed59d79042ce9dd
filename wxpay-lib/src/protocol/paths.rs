//! Gateway endpoints and header names.

/// Primary API host.
pub const DEFAULT_BASE_URL: &str = "https://api.mch.weixin.qq.com";

/// Backup API host, used when the primary domain is unreachable.
pub const BACKUP_BASE_URL: &str = "https://api2.mch.weixin.qq.com";

/// Platform certificate listing.
pub const CERTIFICATES_PATH: &str = "/v3/certificates";

/// Header names used by the authorization protocol.
pub mod headers {
    /// Request credential.
    pub const AUTHORIZATION: &str = "Authorization";
    /// Platform certificate serial a request body was encrypted for.
    pub const WECHATPAY_SERIAL: &str = "Wechatpay-Serial";
    /// Response signing timestamp.
    pub const WECHATPAY_TIMESTAMP: &str = "Wechatpay-Timestamp";
    /// Response signing nonce.
    pub const WECHATPAY_NONCE: &str = "Wechatpay-Nonce";
    /// Response detached signature (Base64).
    pub const WECHATPAY_SIGNATURE: &str = "Wechatpay-Signature";
    /// Gateway request identifier, useful in support tickets.
    pub const REQUEST_ID: &str = "Request-ID";
}
