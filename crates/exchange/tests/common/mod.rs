//! Shared fixtures for the exchange client integration tests.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use spotbridge_exchange::{BinanceTestClient, ExchangeConfig};
use wiremock::MockServer;

pub const TEST_KEY: &str = "K";
pub const TEST_SECRET: &str = "S";

/// Start a mock exchange.
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server's `/api` root.
pub fn client_for(server: &MockServer, key: Option<&str>, secret: Option<&str>) -> BinanceTestClient {
    BinanceTestClient::new(&ExchangeConfig {
        base_url: format!("{}/api", server.uri()),
        api_key: key.map(str::to_string),
        api_secret: secret.map(str::to_string),
        recv_window_ms: None,
    })
}

/// Split `payload&signature=hex` and check the signature against `secret`.
#[allow(dead_code)]
pub fn assert_signed(encoded: &str, secret: &str) -> String {
    let (payload, signature) = encoded
        .rsplit_once("&signature=")
        .expect("request should carry a signature");
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(payload.as_bytes());
    assert_eq!(hex::encode(mac.finalize().into_bytes()), signature);
    payload.to_string()
}
