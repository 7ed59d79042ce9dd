//! Gateway platform certificates: the trust store and the fetch-and-decrypt
//! batch that fills it.
//!
//! Responses are signed with the private key of a platform certificate that
//! the gateway rotates. A [`CertificateStore`] maps serial numbers to public
//! keys; it is filled either out-of-band with [`CertificateStore::seed`] or
//! from the `/v3/certificates` listing with [`fetch_and_decrypt`].

mod fetch;
mod store;

pub use fetch::{
    decrypt_listing, fetch_and_decrypt, CertificateEntry, CertificateFetcher, CertificateListing,
};
pub use store::{CertificateStore, PlatformCertificate};
