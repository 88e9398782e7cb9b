use serde::{Deserialize, Serialize};
use std::fmt;

/// REST root of the Binance spot testnet. Paths such as `/v3/account` are appended.
pub const TESTNET_BASE_URL: &str = "https://testnet.binance.vision/api";

/// Immutable settings for the exchange client, loaded once at startup.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Sent as `recvWindow` on signed calls when set.
    pub recv_window_ms: Option<u64>,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            base_url: TESTNET_BASE_URL.to_string(),
            api_key: None,
            api_secret: None,
            recv_window_ms: None,
        }
    }
}

impl fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key)
            .field("api_secret", &self.api_secret.as_ref().map(|_| "<redacted>"))
            .field("recv_window_ms", &self.recv_window_ms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_testnet() {
        let config = ExchangeConfig::default();
        assert_eq!(config.base_url, TESTNET_BASE_URL);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = ExchangeConfig {
            api_key: Some("public-key".to_string()),
            api_secret: Some("very-secret".to_string()),
            ..Default::default()
        };
        let printed = format!("{config:?}");
        assert!(printed.contains("public-key"));
        assert!(!printed.contains("very-secret"));
    }
}
