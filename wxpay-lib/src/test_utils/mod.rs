//! Test utilities for signing, verification and certificate tests.
//!
//! This module provides:
//! - PEM fixtures for a merchant key and two platform certificates
//! - A builder for encrypted certificate listings
//! - Signed gateway responses
//! - A scripted transport that records what it was sent
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wxpay_lib::test_utils::{fixtures, ListingBuilder, MockTransport};
//! use wxpay_lib::{fetch_and_decrypt, TransportResponse};
//!
//! let listing = ListingBuilder::new(fixtures::api_v3_key())
//!     .certificate(fixtures::PLATFORM_A_SERIAL, fixtures::PLATFORM_A_CERT_PEM);
//!
//! let transport = MockTransport::new();
//! transport.push_response(TransportResponse::new(200, listing.to_json()));
//!
//! let store = fetch_and_decrypt(&fixtures::credential(), &fixtures::api_v3_key(), &transport).await?;
//! assert_eq!(store.len()?, 1);
//! ```

mod builders;
pub mod fixtures;
mod mock_transport;

pub use builders::{signed_response, signed_response_at, ListingBuilder};
pub use mock_transport::MockTransport;
