use spotbridge_core::{ExchangeError, ExchangeResult};
use std::fmt;

/// API key identifier plus HMAC secret. Never mutated after construction.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret: String,
}

impl Credentials {
    /// Fails with `ExchangeError::Configuration` if either value is blank.
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> ExchangeResult<Self> {
        let api_key = api_key.into();
        let secret = secret.into();
        if api_key.trim().is_empty() {
            return Err(ExchangeError::Configuration(
                "exchange API key is empty".to_string(),
            ));
        }
        if secret.trim().is_empty() {
            return Err(ExchangeError::Configuration(
                "exchange API secret is empty".to_string(),
            ));
        }
        Ok(Self { api_key, secret })
    }

    /// Build from optional settings, treating a missing value like an empty one.
    pub fn from_options(api_key: Option<&str>, secret: Option<&str>) -> ExchangeResult<Self> {
        match (api_key, secret) {
            (Some(key), Some(secret)) => Self::new(key, secret),
            (None, _) => Err(ExchangeError::Configuration(
                "exchange API key is not set (BINANCE_API_KEY)".to_string(),
            )),
            (_, None) => Err(ExchangeError::Configuration(
                "exchange API secret is not set (BINANCE_API_SECRET)".to_string(),
            )),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub(crate) fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("secret", &"<redacted>")
            .finish()
    }
}
