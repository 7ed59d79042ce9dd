//! Sign command - print the canonical string and Authorization header

use std::path::Path;

use anyhow::Result;
use clap::ValueEnum;
use wxpay_lib::{CanonicalRequest, Method};

use super::MerchantArgs;
use crate::ui;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::Get,
            HttpMethod::Post => Method::Post,
            HttpMethod::Put => Method::Put,
            HttpMethod::Patch => Method::Patch,
            HttpMethod::Delete => Method::Delete,
        }
    }
}

pub async fn run(
    merchant: &MerchantArgs,
    method: HttpMethod,
    path: &str,
    body_path: Option<&Path>,
    fixed: Option<(i64, String)>,
) -> Result<()> {
    let credential = merchant.credential()?;
    let body = super::read_body(body_path)?;
    let method = Method::from(method);

    let signed = match &fixed {
        Some((timestamp, nonce)) => {
            credential.authorize_with(method, path, &body, *timestamp, nonce)?
        }
        None => credential.authorize(method, path, &body)?,
    };

    let canonical = CanonicalRequest {
        method,
        path,
        timestamp: signed.envelope.timestamp,
        nonce: &signed.envelope.nonce,
        body: &body,
    }
    .to_bytes();

    ui::header("Signed Request");
    ui::key_value("Method", method.as_str());
    ui::key_value("Path", path);
    ui::key_value("Timestamp", &signed.envelope.timestamp.to_string());
    ui::key_value("Nonce", &signed.envelope.nonce);
    ui::escaped("Canonical", &canonical);
    ui::separator();
    println!("Authorization: {}", signed.authorization);

    tracing::debug!(body_len = body.len(), "request signed");
    Ok(())
}
