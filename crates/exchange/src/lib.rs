//! Binance spot testnet adapter.
//!
//! Signs private calls with HMAC-SHA256, sends them over reqwest and
//! reshapes the exchange's JSON into `spotbridge-core` models.

pub mod client;
pub mod config;
pub mod credentials;
pub mod signer;
pub mod transport;
mod wire;

pub use client::BinanceTestClient;
pub use config::{ExchangeConfig, TESTNET_BASE_URL};
pub use credentials::Credentials;
pub use signer::{Method, Params, SignedRequest, Signer, API_KEY_HEADER};
pub use transport::{RawResponse, Transport};
