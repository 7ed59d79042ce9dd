//! Transport abstraction for reaching the gateway.
//!
//! The authorization core only needs one primitive: send a request, get back
//! the status, headers and raw body. Connection pooling, TLS and retries
//! belong to the implementation. [`HttpTransport`] (feature `http-transport`)
//! is the reqwest-backed default; tests script a mock instead.

mod config;
#[cfg(feature = "http-transport")]
mod http;
mod traits;

pub use crate::protocol::Method;
pub use config::GatewayConfig;
#[cfg(feature = "http-transport")]
pub use http::HttpTransport;
pub use traits::{GatewayTransport, ResponseHeaders, TransportRequest, TransportResponse};
