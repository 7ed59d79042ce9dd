//! CLI command implementations

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use wxpay_lib::{ApiV3Key, Credential, CredentialConfig};

pub mod certs;
pub mod decrypt;
pub mod sign;
pub mod verify;

/// Merchant settings shared by the commands that talk to the gateway.
#[derive(Args, Debug, Default)]
pub struct MerchantArgs {
    /// Merchant id
    #[arg(long, env = "WXPAY_MCHID", global = true)]
    pub mchid: Option<String>,

    /// Merchant API certificate serial number
    #[arg(long, env = "WXPAY_SERIAL_NO", global = true)]
    pub serial_no: Option<String>,

    /// Merchant private key PEM (apiclient_key.pem)
    #[arg(long, env = "WXPAY_PRIVATE_KEY_PATH", global = true)]
    pub private_key: Option<PathBuf>,

    /// API v3 key
    #[arg(long, env = "WXPAY_API_V3_KEY", hide_env_values = true, global = true)]
    pub api_v3_key: Option<String>,
}

fn require<'a, T>(value: &'a Option<T>, name: &str) -> Result<&'a T> {
    value
        .as_ref()
        .ok_or_else(|| anyhow!("missing {name} (flag or environment variable)"))
}

impl MerchantArgs {
    /// Load the merchant credential.
    pub fn credential(&self) -> Result<Credential> {
        let mchid = require(&self.mchid, "--mchid / WXPAY_MCHID")?;
        let serial_no = require(&self.serial_no, "--serial-no / WXPAY_SERIAL_NO")?;
        let path = require(&self.private_key, "--private-key / WXPAY_PRIVATE_KEY_PATH")?;
        let pem = std::fs::read_to_string(path)
            .with_context(|| format!("reading private key {}", path.display()))?;
        Ok(Credential::from_pem(mchid.as_str(), serial_no.as_str(), &pem)?)
    }

    /// Load the API v3 key.
    pub fn api_v3_key(&self) -> Result<ApiV3Key> {
        let key = require(&self.api_v3_key, "--api-v3-key / WXPAY_API_V3_KEY")?;
        Ok(ApiV3Key::new(key.as_bytes())?)
    }

    /// Everything at once, as a library config.
    pub fn config(&self) -> Result<CredentialConfig> {
        Ok(CredentialConfig {
            merchant_id: require(&self.mchid, "--mchid / WXPAY_MCHID")?.clone(),
            serial_no: require(&self.serial_no, "--serial-no / WXPAY_SERIAL_NO")?.clone(),
            private_key_path: require(&self.private_key, "--private-key / WXPAY_PRIVATE_KEY_PATH")?
                .clone(),
            api_v3_key: require(&self.api_v3_key, "--api-v3-key / WXPAY_API_V3_KEY")?.clone(),
        })
    }
}

/// Read a body file; a missing path means an empty body.
pub fn read_body(path: Option<&std::path::Path>) -> Result<Vec<u8>> {
    match path {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading body {}", path.display()))
        }
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_are_named() {
        let err = MerchantArgs::default().credential().unwrap_err();
        assert!(err.to_string().contains("WXPAY_MCHID"));

        let err = MerchantArgs::default().api_v3_key().unwrap_err();
        assert!(err.to_string().contains("WXPAY_API_V3_KEY"));
    }

    #[test]
    fn test_short_api_key_rejected() {
        let args = MerchantArgs {
            api_v3_key: Some("short".into()),
            ..Default::default()
        };
        assert!(args.api_v3_key().is_err());
    }

    #[test]
    fn test_read_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, br#"{"a":1}"#).unwrap();
        assert_eq!(read_body(Some(&path)).unwrap(), br#"{"a":1}"#);
        assert!(read_body(None).unwrap().is_empty());
    }
}
