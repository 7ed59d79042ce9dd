//! Nonce and timestamp generation for request signing.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated nonces.
pub const NONCE_LEN: usize = 32;

/// Generate a random alphanumeric nonce of [`NONCE_LEN`] characters.
///
/// # Example
///
/// ```
/// use wxpay_lib::protocol::nonce::{generate_nonce, NONCE_LEN};
///
/// let nonce = generate_nonce();
/// assert_eq!(nonce.len(), NONCE_LEN);
/// assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect()
}

/// Current Unix time in seconds.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}
