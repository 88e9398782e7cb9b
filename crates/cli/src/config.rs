use anyhow::Context;
use serde::Deserialize;
use spotbridge_exchange::ExchangeConfig;
use std::path::Path;

/// Settings read from the optional TOML file, then overridden by flags/env.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub exchange: ExchangeConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8000".to_string(),
            cors_origins: Vec::new(),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub recv_window_ms: Option<u64>,
    pub bind: Option<String>,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Read `path` if given, otherwise start from defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_toml(&raw)
                    .with_context(|| format!("invalid config file {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.exchange.base_url = base_url;
        }
        if overrides.api_key.is_some() {
            self.exchange.api_key = overrides.api_key;
        }
        if overrides.api_secret.is_some() {
            self.exchange.api_secret = overrides.api_secret;
        }
        if overrides.recv_window_ms.is_some() {
            self.exchange.recv_window_ms = overrides.recv_window_ms;
        }
        if let Some(bind) = overrides.bind {
            self.server.bind = bind;
        }
        if !overrides.cors_origins.is_empty() {
            self.server.cors_origins = overrides.cors_origins;
        }
    }
}
