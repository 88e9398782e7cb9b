use crate::traits::ExchangeError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// Validate and normalise a trading pair symbol (e.g. "btcusdt" -> "BTCUSDT").
pub fn normalize_symbol(raw: &str) -> Result<String, ExchangeError> {
    let symbol = raw.trim();
    if symbol.is_empty() {
        return Err(ExchangeError::Validation("symbol is required".to_string()));
    }
    if !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ExchangeError::Validation(format!(
            "symbol must be alphanumeric: {symbol}"
        )));
    }
    Ok(symbol.to_ascii_uppercase())
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

/// Free balance of a single asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    pub asset: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

impl AssetBalance {
    pub fn new(asset: &str, balance: Decimal) -> Self {
        Self {
            asset: asset.to_string(),
            balance,
        }
    }
}

/// Account summary returned by `GET /api/account`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountInfo {
    pub uid: u64,
    pub account_type: String,
    pub btc_balance: AssetBalance,
    pub usdt_balance: AssetBalance,
    pub eth_balance: AssetBalance,
}

// ---------------------------------------------------------------------------
// Market Data
// ---------------------------------------------------------------------------

/// Latest traded price for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceInfo {
    pub symbol: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

/// A single kline, reshaped from the exchange's positional array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleInfo {
    /// `%Y-%m-%d %H:%M:%S`, UTC.
    pub open_time: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub open: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub high: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub low: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub close: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub volume: Decimal,
    pub close_time: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub quote_asset_volume: Decimal,
    pub number_of_trades: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub taker_buy_base_asset_volume: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub taker_buy_quote_asset_volume: Decimal,
    pub ignore: String,
}

/// Kline interval accepted by the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    Second1,
    Minute1,
    Minute3,
    Minute5,
    Minute15,
    Minute30,
    #[default]
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour8,
    Hour12,
    Day1,
    Day3,
    Week1,
    Month1,
}

impl Interval {
    pub const ALL: [Interval; 16] = [
        Interval::Second1,
        Interval::Minute1,
        Interval::Minute3,
        Interval::Minute5,
        Interval::Minute15,
        Interval::Minute30,
        Interval::Hour1,
        Interval::Hour2,
        Interval::Hour4,
        Interval::Hour6,
        Interval::Hour8,
        Interval::Hour12,
        Interval::Day1,
        Interval::Day3,
        Interval::Week1,
        Interval::Month1,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Second1 => "1s",
            Interval::Minute1 => "1m",
            Interval::Minute3 => "3m",
            Interval::Minute5 => "5m",
            Interval::Minute15 => "15m",
            Interval::Minute30 => "30m",
            Interval::Hour1 => "1h",
            Interval::Hour2 => "2h",
            Interval::Hour4 => "4h",
            Interval::Hour6 => "6h",
            Interval::Hour8 => "8h",
            Interval::Hour12 => "12h",
            Interval::Day1 => "1d",
            Interval::Day3 => "3d",
            Interval::Week1 => "1w",
            Interval::Month1 => "1M",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ExchangeError;

    // Case-sensitive: "1m" is a minute, "1M" is a month.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .iter()
            .copied()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| ExchangeError::Validation(format!("unsupported interval: {s}")))
    }
}

/// Validated parameters for a price history lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub symbol: String,
    pub interval: Interval,
    pub limit: u16,
}

impl HistoryQuery {
    pub const DEFAULT_LIMIT: u16 = 100;
    pub const MAX_LIMIT: u16 = 1000;

    pub fn new(
        symbol: &str,
        interval: Option<&str>,
        limit: Option<u32>,
    ) -> Result<Self, ExchangeError> {
        let symbol = normalize_symbol(symbol)?;
        let interval = match interval {
            Some(raw) => raw.parse()?,
            None => Interval::default(),
        };
        let limit = limit.unwrap_or(u32::from(Self::DEFAULT_LIMIT));
        if limit == 0 || limit > u32::from(Self::MAX_LIMIT) {
            return Err(ExchangeError::Validation(format!(
                "limit must be between 1 and {}, got {limit}",
                Self::MAX_LIMIT
            )));
        }
        Ok(Self {
            symbol,
            interval,
            limit: limit as u16,
        })
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl FromStr for Side {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            _ => Err(ExchangeError::Validation(format!("unknown side: {}", s.trim()))),
        }
    }
}

impl TryFrom<String> for Side {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// The type of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum OrderType {
    Market,
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "MARKET",
            OrderType::Limit => "LIMIT",
        }
    }
}

impl FromStr for OrderType {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MARKET" => Ok(OrderType::Market),
            "LIMIT" => Ok(OrderType::Limit),
            _ => Err(ExchangeError::Validation(format!(
                "unsupported order type: {}",
                s.trim()
            ))),
        }
    }
}

impl TryFrom<String> for OrderType {
    type Error = ExchangeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// How long a limit order stays working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    #[default]
    Gtc,
    Ioc,
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// Body of `POST /api/order`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Decimal,
    /// Required for limit orders.
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub time_in_force: Option<TimeInForce>,
    /// Route to the exchange's validation-only endpoint.
    #[serde(default)]
    pub test: bool,
}

impl OrderRequest {
    pub fn market(symbol: &str, side: Side, quantity: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            time_in_force: None,
            test: false,
        }
    }

    pub fn limit(symbol: &str, side: Side, quantity: Decimal, price: Decimal) -> Self {
        Self {
            symbol: symbol.to_string(),
            side,
            order_type: OrderType::Limit,
            quantity,
            price: Some(price),
            time_in_force: Some(TimeInForce::Gtc),
            test: false,
        }
    }

    /// Check the request and return a copy with the symbol normalised.
    pub fn validated(&self) -> Result<Self, ExchangeError> {
        let symbol = normalize_symbol(&self.symbol)?;
        if self.quantity <= Decimal::ZERO {
            return Err(ExchangeError::Validation(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }
        let (price, time_in_force) = match self.order_type {
            OrderType::Market => (None, None),
            OrderType::Limit => match self.price {
                Some(p) if p > Decimal::ZERO => {
                    (Some(p), Some(self.time_in_force.unwrap_or_default()))
                }
                Some(p) => {
                    return Err(ExchangeError::Validation(format!(
                        "limit price must be positive, got {p}"
                    )))
                }
                None => {
                    return Err(ExchangeError::Validation(
                        "limit orders require a price".to_string(),
                    ))
                }
            },
        };
        Ok(Self {
            symbol,
            price,
            time_in_force,
            ..self.clone()
        })
    }
}

/// What the order endpoint hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderOutcome {
    /// The exchange accepted a test order; nothing was placed.
    Test { message: String },
    /// Exchange acknowledgement, passed through unchanged.
    Placed(serde_json::Value),
}

impl OrderOutcome {
    pub fn test_accepted() -> Self {
        OrderOutcome::Test {
            message: "Test order sent successfully".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol(" btcusdt ").unwrap(), "BTCUSDT");
        assert!(matches!(
            normalize_symbol(""),
            Err(ExchangeError::Validation(_))
        ));
        assert!(matches!(
            normalize_symbol("BTC/USDT"),
            Err(ExchangeError::Validation(_))
        ));
    }

    #[test]
    fn test_interval_is_case_sensitive() {
        assert_eq!("1m".parse::<Interval>().unwrap(), Interval::Minute1);
        assert_eq!("1M".parse::<Interval>().unwrap(), Interval::Month1);
        assert!("2m".parse::<Interval>().is_err());
    }

    #[test]
    fn test_history_query_defaults() {
        let q = HistoryQuery::new("ethusdt", None, None).unwrap();
        assert_eq!(q.symbol, "ETHUSDT");
        assert_eq!(q.interval, Interval::Hour1);
        assert_eq!(q.limit, 100);
    }

    #[test]
    fn test_history_query_limit_bounds() {
        assert!(HistoryQuery::new("BTCUSDT", Some("1d"), Some(1000)).is_ok());
        assert!(HistoryQuery::new("BTCUSDT", Some("1d"), Some(0)).is_err());
        assert!(HistoryQuery::new("BTCUSDT", Some("1d"), Some(1001)).is_err());
    }

    #[test]
    fn test_order_request_deserialize_lowercase() {
        let order: OrderRequest = serde_json::from_value(serde_json::json!({
            "symbol": "btcusdt",
            "side": "buy",
            "order_type": "market",
            "quantity": "0.01",
            "test": true
        }))
        .unwrap();

        assert_eq!(order.side, Side::Buy);
        assert_eq!(order.order_type, OrderType::Market);
        assert_eq!(order.quantity, dec!(0.01));
        assert!(order.test);
    }

    #[test]
    fn test_order_request_rejects_unknown_side() {
        let result: Result<OrderRequest, _> = serde_json::from_value(serde_json::json!({
            "symbol": "BTCUSDT",
            "side": "hold",
            "order_type": "market",
            "quantity": "1"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_validated_market_order_drops_price() {
        let mut order = OrderRequest::market("btcusdt", Side::Sell, dec!(2));
        order.price = Some(dec!(100));
        let checked = order.validated().unwrap();
        assert_eq!(checked.symbol, "BTCUSDT");
        assert_eq!(checked.price, None);
        assert_eq!(checked.time_in_force, None);
    }

    #[test]
    fn test_validated_limit_order() {
        let mut order = OrderRequest::limit("BTCUSDT", Side::Buy, dec!(1), dec!(30000));
        order.time_in_force = None;
        let checked = order.validated().unwrap();
        assert_eq!(checked.time_in_force, Some(TimeInForce::Gtc));

        order.price = None;
        assert!(matches!(
            order.validated(),
            Err(ExchangeError::Validation(msg)) if msg.contains("price")
        ));
    }

    #[test]
    fn test_validated_rejects_non_positive_quantity() {
        let order = OrderRequest::market("BTCUSDT", Side::Buy, dec!(0));
        assert!(matches!(
            order.validated(),
            Err(ExchangeError::Validation(_))
        ));
    }

    #[test]
    fn test_candle_serializes_numbers() {
        let candle = CandleInfo {
            open_time: "2023-11-14 22:13:20".to_string(),
            open: dec!(1.5),
            high: dec!(2),
            low: dec!(1),
            close: dec!(1.75),
            volume: dec!(10),
            close_time: "2023-11-14 23:13:19".to_string(),
            quote_asset_volume: dec!(15),
            number_of_trades: 3,
            taker_buy_base_asset_volume: dec!(4),
            taker_buy_quote_asset_volume: dec!(6),
            ignore: "0".to_string(),
        };
        let json = serde_json::to_value(&candle).unwrap();
        assert_eq!(json["open"], serde_json::json!(1.5));
        assert_eq!(json["number_of_trades"], serde_json::json!(3));
    }

    #[test]
    fn test_balances_and_prices_serialize_as_strings() {
        let balance = serde_json::to_value(AssetBalance::new("BTC", dec!(0.00012300))).unwrap();
        assert_eq!(balance["balance"], serde_json::json!("0.00012300"));

        let price = PriceInfo {
            symbol: "BTCUSDT".to_string(),
            price: dec!(37000.01000000),
        };
        let json = serde_json::to_value(&price).unwrap();
        assert_eq!(json["price"], serde_json::json!("37000.01000000"));
        let back: PriceInfo = serde_json::from_value(json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_order_outcome_shapes() {
        let json = serde_json::to_value(OrderOutcome::test_accepted()).unwrap();
        assert_eq!(json["message"], "Test order sent successfully");

        let ack = serde_json::json!({"orderId": 42, "status": "FILLED"});
        let json = serde_json::to_value(OrderOutcome::Placed(ack.clone())).unwrap();
        assert_eq!(json, ack);
    }
}
