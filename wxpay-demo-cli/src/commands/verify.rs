//! Verify command - check a response signature out-of-band

use std::path::Path;

use anyhow::{Context, Result};
use wxpay_lib::{verify_response, CertificateStore, VerificationInput};

use crate::ui;

pub async fn run(
    cert: &Path,
    serial_no: &str,
    timestamp: &str,
    nonce: &str,
    signature: &str,
    body: &Path,
) -> Result<()> {
    let pem = std::fs::read_to_string(cert)
        .with_context(|| format!("reading certificate {}", cert.display()))?;
    let store = CertificateStore::new();
    store.seed(&pem, serial_no)?;

    let input = VerificationInput {
        timestamp: timestamp.to_string(),
        nonce: nonce.to_string(),
        body: super::read_body(Some(body))?,
        signature: signature.to_string(),
        serial_no: serial_no.to_string(),
    };

    ui::escaped("Canonical", &input.message());
    verify_response(&input, &store)?;
    ui::success(&format!("Signature verified with certificate {serial_no}"));
    Ok(())
}
