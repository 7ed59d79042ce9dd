//! wxpay Demo CLI
//!
//! Command-line interface for signing requests, fetching platform
//! certificates and checking response signatures against the WeChat Pay
//! API v3 gateway.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "wxpay-demo")]
#[command(about = "wxpay Demo CLI - sign, fetch and verify WeChat Pay API v3 traffic", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    merchant: commands::MerchantArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical string and Authorization header for a request
    Sign {
        /// HTTP method
        #[arg(short, long, value_enum, default_value = "get")]
        method: commands::sign::HttpMethod,

        /// Path including the query string
        #[arg(short, long, default_value = "/v3/certificates")]
        path: String,

        /// File holding the request body
        #[arg(long)]
        body: Option<PathBuf>,

        /// Fixed timestamp instead of the current time
        #[arg(long, requires = "nonce")]
        timestamp: Option<i64>,

        /// Fixed nonce instead of a random one
        #[arg(long, requires = "timestamp")]
        nonce: Option<String>,
    },

    /// Fetch and decrypt the platform certificates
    Certs {
        /// Write each certificate to <DIR>/<serial>.pem
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Gateway base URL
        #[arg(long, env = "WXPAY_BASE_URL", default_value = "https://api.mch.weixin.qq.com")]
        base_url: String,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Also verify the listing response signature
        #[arg(long)]
        verify_listing: bool,
    },

    /// Verify a response signature against a certificate
    Verify {
        /// Platform certificate or public key PEM
        #[arg(long)]
        cert: PathBuf,

        /// Wechatpay-Serial
        #[arg(long)]
        serial: String,

        /// Wechatpay-Timestamp
        #[arg(long)]
        timestamp: String,

        /// Wechatpay-Nonce
        #[arg(long)]
        nonce: String,

        /// Wechatpay-Signature
        #[arg(long)]
        signature: String,

        /// File holding the raw response body
        #[arg(long)]
        body: PathBuf,
    },

    /// Decrypt an AEAD_AES_256_GCM resource with the API v3 key
    Decrypt {
        /// Resource nonce
        #[arg(long)]
        nonce: String,

        /// Resource associated data
        #[arg(long, default_value = "")]
        associated_data: String,

        /// Base64 ciphertext
        #[arg(long)]
        ciphertext: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("wxpay_demo_cli=debug,wxpay_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("wxpay_demo_cli=info,wxpay_lib=warn")
            .init();
    }

    let result = match cli.command {
        Commands::Sign {
            method,
            path,
            body,
            timestamp,
            nonce,
        } => {
            let fixed = timestamp.zip(nonce);
            commands::sign::run(&cli.merchant, method, &path, body.as_deref(), fixed).await
        }
        Commands::Certs {
            output,
            base_url,
            timeout,
            verify_listing,
        } => {
            commands::certs::run(
                &cli.merchant,
                &base_url,
                timeout,
                output.as_deref(),
                verify_listing,
                cli.verbose,
            )
            .await
        }
        Commands::Verify {
            cert,
            serial,
            timestamp,
            nonce,
            signature,
            body,
        } => {
            commands::verify::run(&cert, &serial, &timestamp, &nonce, &signature, &body).await
        }
        Commands::Decrypt {
            nonce,
            associated_data,
            ciphertext,
        } => commands::decrypt::run(&cli.merchant, &nonce, &associated_data, &ciphertext).await,
    };

    if let Err(e) = &result {
        ui::error(&format!("{e:#}"));
    }
    result
}
