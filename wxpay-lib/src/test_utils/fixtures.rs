//! Throwaway keys and certificates. Never use outside tests.

use crate::{ApiV3Key, Credential};

/// Merchant private key, PKCS#8.
pub const MERCHANT_KEY_PEM: &str = include_str!("../../tests/fixtures/merchant_key.pem");
/// Same merchant key, PKCS#1.
pub const MERCHANT_KEY_PKCS1_PEM: &str =
    include_str!("../../tests/fixtures/merchant_key_pkcs1.pem");
/// Merchant public key, SPKI.
pub const MERCHANT_PUBLIC_PEM: &str = include_str!("../../tests/fixtures/merchant_public.pem");

/// First platform key pair.
pub const PLATFORM_A_KEY_PEM: &str = include_str!("../../tests/fixtures/platform_a_key.pem");
/// First platform certificate.
pub const PLATFORM_A_CERT_PEM: &str = include_str!("../../tests/fixtures/platform_a_cert.pem");
/// First platform public key, SPKI.
pub const PLATFORM_A_PUBLIC_PEM: &str =
    include_str!("../../tests/fixtures/platform_a_public.pem");
/// Serial number of [`PLATFORM_A_CERT_PEM`].
pub const PLATFORM_A_SERIAL: &str = "5157F09EFDC096DE15EBE81A47057A7232F1B8E1";

/// Second platform key pair.
pub const PLATFORM_B_KEY_PEM: &str = include_str!("../../tests/fixtures/platform_b_key.pem");
/// Second platform certificate.
pub const PLATFORM_B_CERT_PEM: &str = include_str!("../../tests/fixtures/platform_b_cert.pem");
/// Serial number of [`PLATFORM_B_CERT_PEM`].
pub const PLATFORM_B_SERIAL: &str = "3A1B5C2D4E6F708192A3B4C5D6E7F80912345678";

/// Test merchant id.
pub const MERCHANT_ID: &str = "1900000001";
/// Test merchant certificate serial.
pub const MERCHANT_SERIAL: &str = "6F2A0B1C3D4E5F60718293A4B5C6D7E8F9012345";
/// Test API v3 key.
pub const API_V3_KEY: &str = "a7cde1ZfE6Ebsd4d9B8C2eF1aB2cD3eF";

/// Validity window attached to fixture listing entries.
pub const EFFECTIVE_TIME: &str = "2024-01-01T00:00:00+08:00";
/// See [`EFFECTIVE_TIME`].
pub const EXPIRE_TIME: &str = "2029-01-01T00:00:00+08:00";

/// Merchant credential built from the fixtures.
pub fn credential() -> Credential {
    Credential::from_pem(MERCHANT_ID, MERCHANT_SERIAL, MERCHANT_KEY_PEM)
        .expect("fixture merchant key")
}

/// [`API_V3_KEY`] as a key.
pub fn api_v3_key() -> ApiV3Key {
    ApiV3Key::new(API_V3_KEY).expect("fixture API v3 key")
}

/// Private key PEM for a fixture platform serial; unknown serials sign with A.
pub fn platform_key_for(serial_no: &str) -> &'static str {
    if serial_no == PLATFORM_B_SERIAL {
        PLATFORM_B_KEY_PEM
    } else {
        PLATFORM_A_KEY_PEM
    }
}
