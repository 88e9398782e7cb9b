use crate::models::*;
use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeError {
    /// Credentials or other startup settings are missing or unusable.
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The request never produced an HTTP response (DNS, connect, TLS, timeout).
    ///
    /// Non-2xx answers are reported as [`ExchangeError::Status`]; use
    /// [`ExchangeError::is_transport`] to match both.
    #[error("Transport error: {0}")]
    Transport(String),
    /// The exchange answered with a non-2xx status.
    #[error("Exchange returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    /// Caller input was rejected before anything was sent.
    #[error("Validation error: {0}")]
    Validation(String),
    /// The exchange answered 2xx but the body did not have the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ExchangeError {
    /// Network failures and non-2xx answers both count as transport failures.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExchangeError::Transport(_) | ExchangeError::Status { .. }
        )
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;

// ---------------------------------------------------------------------------
// Exchange Trait
// ---------------------------------------------------------------------------

/// The operations the HTTP routes need from an exchange.
///
/// Implementations sign private calls themselves; callers only see reshaped
/// models or a typed error.
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Account identity plus the BTC, USDT and ETH free balances.
    async fn account(&self) -> ExchangeResult<AccountInfo>;

    /// Latest price for a symbol (public, unsigned).
    async fn price(&self, symbol: &str) -> ExchangeResult<PriceInfo>;

    /// Historical klines (public, unsigned).
    async fn price_history(&self, query: &HistoryQuery) -> ExchangeResult<Vec<CandleInfo>>;

    /// Place a live order, or validate one when `order.test` is set.
    async fn place_order(&self, order: &OrderRequest) -> ExchangeResult<OrderOutcome>;
}
