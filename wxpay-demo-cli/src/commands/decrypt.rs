//! Decrypt command - open an AEAD_AES_256_GCM resource

use anyhow::Result;
use wxpay_lib::crypto::aead::AEAD_AES_256_GCM;
use wxpay_lib::EncryptedResource;

use super::MerchantArgs;
use crate::ui;

pub async fn run(
    merchant: &MerchantArgs,
    nonce: &str,
    associated_data: &str,
    ciphertext: &str,
) -> Result<()> {
    let key = merchant.api_v3_key()?;
    let resource = EncryptedResource {
        algorithm: AEAD_AES_256_GCM.to_string(),
        nonce: nonce.to_string(),
        associated_data: associated_data.to_string(),
        ciphertext: ciphertext.to_string(),
        original_type: None,
    };

    let plaintext = key.decrypt_resource(&resource)?;
    match serde_json::from_slice::<serde_json::Value>(&plaintext) {
        Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
        Err(_) => println!("{}", String::from_utf8_lossy(&plaintext)),
    }
    ui::success("Decrypted and authenticated");
    Ok(())
}
