mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{AppConfig, Overrides};
use spotbridge_exchange::signer::now_millis;
use spotbridge_exchange::{
    BinanceTestClient, Credentials, Method, Params, SignedRequest, Signer, API_KEY_HEADER,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "spotbridge")]
#[command(about = "HTTP proxy for the Binance spot testnet: account, prices, klines and orders")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Optional TOML config file
    #[arg(short, long, env = "SPOTBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Exchange REST root (default: https://testnet.binance.vision/api)
    #[arg(long, env = "BINANCE_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Exchange API key
    #[arg(long, env = "BINANCE_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Exchange API secret
    #[arg(long, env = "BINANCE_API_SECRET", hide_env_values = true, global = true)]
    api_secret: Option<String>,

    /// recvWindow sent with signed requests, in milliseconds
    #[arg(long, env = "BINANCE_RECV_WINDOW", global = true)]
    recv_window: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address (default 0.0.0.0:8000)
        #[arg(short, long)]
        bind: Option<String>,

        /// Allowed CORS origin; repeat for several. Any origin when omitted.
        #[arg(long = "cors-origin")]
        cors_origins: Vec<String>,
    },

    /// Print the signed request for a path without sending it
    Sign {
        /// Endpoint path, e.g. /v3/account
        #[arg(short, long)]
        path: String,

        /// GET, POST or DELETE
        #[arg(short, long, default_value = "GET")]
        method: Method,

        /// Request parameter as key=value; repeat in wire order
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,

        /// Epoch milliseconds to sign with (default: now)
        #[arg(long)]
        timestamp: Option<u64>,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real env vars still apply.
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    if cli.json_logs {
        fmt().json().with_env_filter(filter).with_target(false).init();
    } else {
        fmt().with_env_filter(filter).with_target(false).init();
    }

    let mut config = AppConfig::load(cli.config.as_deref())?;
    let mut overrides = Overrides {
        base_url: cli.base_url,
        api_key: cli.api_key,
        api_secret: cli.api_secret,
        recv_window_ms: cli.recv_window,
        ..Default::default()
    };

    match cli.command {
        Commands::Serve { bind, cors_origins } => {
            overrides.bind = bind;
            overrides.cors_origins = cors_origins;
            config.apply(overrides);

            let client = BinanceTestClient::new(&config.exchange);
            tracing::info!(
                base_url = %config.exchange.base_url,
                bind = %config.server.bind,
                signed_endpoints = client.has_credentials(),
                "Starting spotbridge"
            );
            spotbridge_api::start_server(
                Arc::new(client),
                &config.server.bind,
                &config.server.cors_origins,
            )
            .await?;
        }
        Commands::Sign {
            path,
            method,
            params,
            timestamp,
        } => {
            config.apply(overrides);
            sign_request(&config, &path, method, params, timestamp)?;
        }
    }

    Ok(())
}

fn sign_request(
    config: &AppConfig,
    path: &str,
    method: Method,
    params: Vec<(String, String)>,
    timestamp: Option<u64>,
) -> Result<()> {
    let credentials = Credentials::from_options(
        config.exchange.api_key.as_deref(),
        config.exchange.api_secret.as_deref(),
    )?;
    let mut signer = Signer::new(credentials);
    if let Some(window) = config.exchange.recv_window_ms {
        signer = signer.with_recv_window(window);
    }

    let params: Params = params.into_iter().collect();
    let signed = signer.sign(method, path, params, timestamp.unwrap_or_else(now_millis))?;
    tracing::debug!(path = %path, timestamp = signed.timestamp, "Signed request");

    print!(
        "{}",
        render_signed_request(&config.exchange.base_url, &signed, signer.api_key())
    );
    Ok(())
}

/// Lay a signed request out the way it would go on the wire: request line,
/// key header, then the form body for POST.
fn render_signed_request(base_url: &str, signed: &SignedRequest, api_key: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let method = signed.method;
    let path = &signed.path;
    if method.carries_body() {
        format!(
            "{method} {base}{path}\n{API_KEY_HEADER}: {api_key}\n\n{}\n",
            signed.encoded()
        )
    } else {
        format!(
            "{method} {base}{path}?{}\n{API_KEY_HEADER}: {api_key}\n",
            signed.encoded()
        )
    }
}
