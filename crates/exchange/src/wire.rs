//! Raw exchange payloads and their mapping onto core models.

use crate::signer::Params;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use spotbridge_core::*;
use std::str::FromStr;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawAccount {
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default = "default_account_type")]
    pub account_type: String,
    #[serde(default)]
    pub balances: Vec<RawBalance>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBalance {
    pub asset: String,
    pub free: Decimal,
}

fn default_account_type() -> String {
    "SPOT".to_string()
}

impl RawAccount {
    fn free(&self, asset: &str) -> Decimal {
        self.balances
            .iter()
            .find(|b| b.asset == asset)
            .map(|b| b.free)
            .unwrap_or(Decimal::ZERO)
    }

    pub fn into_account_info(self) -> AccountInfo {
        AccountInfo {
            uid: self.uid.or(self.account_id).unwrap_or(0),
            btc_balance: AssetBalance::new("BTC", self.free("BTC")),
            usdt_balance: AssetBalance::new("USDT", self.free("USDT")),
            eth_balance: AssetBalance::new("ETH", self.free("ETH")),
            account_type: self.account_type,
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct RawTicker {
    pub symbol: String,
    pub price: Decimal,
}

impl From<RawTicker> for PriceInfo {
    fn from(raw: RawTicker) -> Self {
        PriceInfo {
            symbol: raw.symbol,
            price: raw.price,
        }
    }
}

// ---------------------------------------------------------------------------
// Klines
// ---------------------------------------------------------------------------

/// Map one positional kline array:
/// `[open_time, open, high, low, close, volume, close_time, quote_volume,
///   trades, taker_base, taker_quote, ignore]`.
pub(crate) fn parse_kline(row: &[Value]) -> ExchangeResult<CandleInfo> {
    if row.len() < 12 {
        return Err(ExchangeError::Decode(format!(
            "kline has {} fields, expected 12",
            row.len()
        )));
    }
    Ok(CandleInfo {
        open_time: format_millis(integer_at(row, 0)?)?,
        open: decimal_at(row, 1)?,
        high: decimal_at(row, 2)?,
        low: decimal_at(row, 3)?,
        close: decimal_at(row, 4)?,
        volume: decimal_at(row, 5)?,
        close_time: format_millis(integer_at(row, 6)?)?,
        quote_asset_volume: decimal_at(row, 7)?,
        number_of_trades: integer_at(row, 8)?.max(0) as u64,
        taker_buy_base_asset_volume: decimal_at(row, 9)?,
        taker_buy_quote_asset_volume: decimal_at(row, 10)?,
        ignore: match &row[11] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
    })
}

fn decimal_at(row: &[Value], idx: usize) -> ExchangeResult<Decimal> {
    let parsed = match &row[idx] {
        Value::String(s) => Decimal::from_str(s).ok(),
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        ExchangeError::Decode(format!("kline field {idx} is not a decimal: {}", row[idx]))
    })
}

fn integer_at(row: &[Value], idx: usize) -> ExchangeResult<i64> {
    row[idx].as_i64().ok_or_else(|| {
        ExchangeError::Decode(format!("kline field {idx} is not an integer: {}", row[idx]))
    })
}

/// Epoch milliseconds as `%Y-%m-%d %H:%M:%S` in UTC.
pub(crate) fn format_millis(ms: i64) -> ExchangeResult<String> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format(TIME_FORMAT).to_string())
        .ok_or_else(|| ExchangeError::Decode(format!("timestamp out of range: {ms}")))
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order parameters in the order the exchange documents them.
pub(crate) fn order_params(order: &OrderRequest) -> Params {
    let mut params = Params::new()
        .with("symbol", &order.symbol)
        .with("side", order.side.as_str())
        .with("type", order.order_type.as_str());
    if let Some(tif) = order.time_in_force {
        params.insert("timeInForce", tif.as_str());
    }
    params.insert("quantity", order.quantity);
    if let Some(price) = order.price {
        params.insert("price", price);
    }
    params
}
