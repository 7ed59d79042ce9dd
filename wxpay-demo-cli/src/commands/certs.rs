//! Certs command - fetch, decrypt and optionally save platform certificates

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use wxpay_lib::{CertificateFetcher, CertificateStore, GatewayConfig, HttpTransport};

use super::MerchantArgs;
use crate::ui;

pub async fn run(
    merchant: &MerchantArgs,
    base_url: &str,
    timeout: u64,
    output: Option<&Path>,
    verify_listing: bool,
    verbose: bool,
) -> Result<()> {
    let (credential, api_v3_key) = merchant.config()?.load()?;
    let transport = HttpTransport::new(GatewayConfig::new(base_url).with_timeout(timeout))?;

    let spinner = ui::spinner("Fetching platform certificates...");
    let result = CertificateFetcher::new()
        .verify_listing(verify_listing)
        .fetch(&credential, &api_v3_key, &transport)
        .await;
    spinner.finish_and_clear();
    let store = result?;

    if store.is_empty()? {
        ui::warning("Gateway returned no certificates");
        return Ok(());
    }

    ui::header(&format!("Platform Certificates ({})", store.len()?));
    print_store(&store, verbose)?;

    if let Some(dir) = output {
        let written = write_pems(&store, dir)?;
        for path in &written {
            ui::success(&format!("Saved {}", path.display()));
        }
    }

    Ok(())
}

fn print_store(store: &CertificateStore, verbose: bool) -> Result<()> {
    let now = chrono::Utc::now();
    let latest = store.latest()?.map(|c| c.serial_no.clone());

    for serial_no in store.serial_numbers()? {
        let Some(certificate) = store.get(&serial_no)? else {
            continue;
        };
        ui::separator();
        ui::key_value("Serial", &certificate.serial_no);
        ui::key_value("Effective", &fmt_time(certificate.effective_time));
        ui::key_value("Expires", &fmt_time(certificate.expire_time));
        if latest.as_deref() == Some(serial_no.as_str()) {
            ui::info("Newest certificate, use it for sensitive fields");
        }
        if certificate.is_expired_at(now) {
            ui::warning("Expired");
        }
        if verbose {
            println!("{}", certificate.public_key_pem);
        }
    }
    Ok(())
}

fn fmt_time(time: Option<chrono::DateTime<chrono::FixedOffset>>) -> String {
    time.map(|t| t.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Write `<serial>.pem` for every stored certificate.
fn write_pems(store: &CertificateStore, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut written = Vec::new();
    for serial_no in store.serial_numbers()? {
        if let Some(certificate) = store.get(&serial_no)? {
            let path = dir.join(format!("{serial_no}.pem"));
            std::fs::write(&path, &certificate.public_key_pem)
                .with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }
    }
    Ok(written)
}
