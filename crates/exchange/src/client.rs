use crate::config::ExchangeConfig;
use crate::credentials::Credentials;
use crate::signer::{Method, Params, Signer};
use crate::transport::{RawResponse, Transport};
use crate::wire::{self, RawAccount, RawTicker};
use async_trait::async_trait;
use serde_json::Value;
use spotbridge_core::*;
use tracing::{info, warn};

const ACCOUNT_PATH: &str = "/v3/account";
const TICKER_PRICE_PATH: &str = "/v3/ticker/price";
const KLINES_PATH: &str = "/v3/klines";
const ORDER_PATH: &str = "/v3/order";
const TEST_ORDER_PATH: &str = "/v3/order/test";

/// Binance spot testnet client.
///
/// Public market data goes straight through the transport. Account and order
/// calls are signed first and fail with `ExchangeError::Configuration` when
/// no credentials were configured.
#[derive(Debug, Clone)]
pub struct BinanceTestClient {
    transport: Transport,
    signer: Option<Signer>,
}

impl BinanceTestClient {
    pub fn new(config: &ExchangeConfig) -> Self {
        let signer = match Credentials::from_options(
            config.api_key.as_deref(),
            config.api_secret.as_deref(),
        ) {
            Ok(credentials) => {
                let signer = Signer::new(credentials);
                Some(match config.recv_window_ms {
                    Some(window) => signer.with_recv_window(window),
                    None => signer,
                })
            }
            Err(e) => {
                warn!(error = %e, "Signed endpoints disabled");
                None
            }
        };
        Self::from_parts(Transport::new(&config.base_url), signer)
    }

    pub fn from_parts(transport: Transport, signer: Option<Signer>) -> Self {
        Self { transport, signer }
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    /// Sign `params` with the current time and send them to `path`.
    ///
    /// Fails with `ExchangeError::Configuration` before any network I/O when
    /// the client has no credentials.
    pub async fn execute_signed_request(
        &self,
        path: &str,
        params: Params,
        method: Method,
    ) -> ExchangeResult<RawResponse> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::Configuration(
                "exchange credentials are not configured (BINANCE_API_KEY / BINANCE_API_SECRET)"
                    .to_string(),
            )
        })?;
        let request = signer.sign_now(method, path, params)?;
        self.transport.send(&request, signer.api_key()).await
    }
}

#[async_trait]
impl Exchange for BinanceTestClient {
    async fn account(&self) -> ExchangeResult<AccountInfo> {
        let response = self
            .execute_signed_request(ACCOUNT_PATH, Params::new(), Method::Get)
            .await?;
        Ok(response.json::<RawAccount>()?.into_account_info())
    }

    async fn price(&self, symbol: &str) -> ExchangeResult<PriceInfo> {
        let symbol = normalize_symbol(symbol)?;
        let params = Params::new().with("symbol", symbol);
        let response = self.transport.get_public(TICKER_PRICE_PATH, &params).await?;
        Ok(response.json::<RawTicker>()?.into())
    }

    async fn price_history(&self, query: &HistoryQuery) -> ExchangeResult<Vec<CandleInfo>> {
        let params = Params::new()
            .with("symbol", &query.symbol)
            .with("interval", query.interval)
            .with("limit", query.limit);
        let response = self.transport.get_public(KLINES_PATH, &params).await?;
        let rows: Vec<Vec<Value>> = response.json()?;
        rows.iter().map(|row| wire::parse_kline(row)).collect()
    }

    async fn place_order(&self, order: &OrderRequest) -> ExchangeResult<OrderOutcome> {
        let order = order.validated()?;
        let path = if order.test { TEST_ORDER_PATH } else { ORDER_PATH };

        info!(
            symbol = %order.symbol,
            side = order.side.as_str(),
            order_type = order.order_type.as_str(),
            quantity = %order.quantity,
            test = order.test,
            "Placing order"
        );

        let response = self
            .execute_signed_request(path, wire::order_params(&order), Method::Post)
            .await?;

        if order.test {
            Ok(OrderOutcome::test_accepted())
        } else {
            Ok(OrderOutcome::Placed(response.json()?))
        }
    }
}
