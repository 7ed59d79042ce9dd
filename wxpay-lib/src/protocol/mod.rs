//! WeChat Pay API v3 authorization protocol conventions.
//!
//! This module defines the single source of truth for:
//! - Canonical signing strings for requests and responses
//! - The `Authorization` header credential format
//! - Endpoint paths, header names and nonce generation
//!
//! The gateway recomputes the canonical string on its side, so any deviation in
//! field order, whitespace or encoding makes every signed call fail.
//!
//! # Canonical Strings
//!
//! | Direction | Format                                               |
//! |-----------|------------------------------------------------------|
//! | Request   | `{METHOD}\n{PATH}\n{TIMESTAMP}\n{NONCE}\n{BODY}\n`   |
//! | Response  | `{TIMESTAMP}\n{NONCE}\n{BODY}\n`                     |
//!
//! `PATH` includes the query string. `BODY` is empty for bodyless requests.
//! Fields are never escaped.

mod authorization;
mod canonical;
pub mod nonce;
pub mod paths;

pub use authorization::{build_authorization, SignatureEnvelope, AUTHORIZATION_SCHEME};
pub use canonical::{canonical_request, canonical_response, CanonicalRequest, Method};
