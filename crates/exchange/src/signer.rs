//! Request signing for authenticated exchange endpoints.
//!
//! The signed payload is the query string built from the parameters in
//! insertion order, ending with `timestamp`. The signature is the lowercase
//! hex HMAC-SHA256 of that payload keyed with the API secret and is sent as
//! a trailing `signature` parameter.

use crate::credentials::Credentials;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use spotbridge_core::{ExchangeError, ExchangeResult};
use std::fmt;
use std::str::FromStr;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the public key identifier on every signed call.
pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

const TIMESTAMP_KEY: &str = "timestamp";
const RECV_WINDOW_KEY: &str = "recvWindow";
const SIGNATURE_KEY: &str = "signature";

/// HTTP verbs the exchange accepts for signed endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        }
    }

    /// Whether the signed parameters travel in the request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post)
    }
}

impl FromStr for Method {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "DELETE" => Ok(Method::Delete),
            _ => Err(ExchangeError::Validation(format!(
                "unsupported method: {}",
                s.trim()
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Params
// ---------------------------------------------------------------------------

/// Ordered request parameters with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing an existing value in place or appending a new pair.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Builder form of [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `k=v&k=v` in insertion order, values form-urlencoded.
    pub fn to_query(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

// ---------------------------------------------------------------------------
// Signed request
// ---------------------------------------------------------------------------

/// A request ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    /// Caller parameters plus `recvWindow`/`timestamp`, without the signature.
    pub params: Params,
    /// Epoch milliseconds.
    pub timestamp: u64,
    /// Exact bytes that were signed.
    pub payload: String,
    /// Lowercase hex HMAC-SHA256 of `payload`.
    pub signature: String,
}

impl SignedRequest {
    /// Query string or form body as sent on the wire.
    pub fn encoded(&self) -> String {
        if self.payload.is_empty() {
            format!("{SIGNATURE_KEY}={}", self.signature)
        } else {
            format!("{}&{SIGNATURE_KEY}={}", self.payload, self.signature)
        }
    }
}

// ---------------------------------------------------------------------------
// Signer
// ---------------------------------------------------------------------------

/// Stamps and signs requests with a fixed set of credentials.
#[derive(Debug, Clone)]
pub struct Signer {
    credentials: Credentials,
    recv_window_ms: Option<u64>,
}

impl Signer {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            recv_window_ms: None,
        }
    }

    pub fn with_recv_window(mut self, recv_window_ms: u64) -> Self {
        self.recv_window_ms = Some(recv_window_ms);
        self
    }

    pub fn api_key(&self) -> &str {
        self.credentials.api_key()
    }

    /// Sign `params` as of `timestamp` (epoch milliseconds).
    pub fn sign(
        &self,
        method: Method,
        path: &str,
        mut params: Params,
        timestamp: u64,
    ) -> ExchangeResult<SignedRequest> {
        if path.trim().is_empty() {
            return Err(ExchangeError::Validation(
                "request path is empty".to_string(),
            ));
        }
        if params.contains_key(SIGNATURE_KEY) {
            return Err(ExchangeError::Validation(format!(
                "`{SIGNATURE_KEY}` is reserved and cannot be passed as a parameter"
            )));
        }

        if let Some(window) = self.recv_window_ms {
            params.insert(RECV_WINDOW_KEY, window);
        }
        params.insert(TIMESTAMP_KEY, timestamp);

        let payload = params.to_query();
        let signature = hex::encode(self.mac(&payload).finalize().into_bytes());

        Ok(SignedRequest {
            method,
            path: path.to_string(),
            params,
            timestamp,
            payload,
            signature,
        })
    }

    /// Sign with the current wall-clock time.
    pub fn sign_now(
        &self,
        method: Method,
        path: &str,
        params: Params,
    ) -> ExchangeResult<SignedRequest> {
        self.sign(method, path, params, now_millis())
    }

    /// Recompute the signature from the request's parameters and compare in
    /// constant time.
    pub fn verify(&self, request: &SignedRequest) -> bool {
        let payload = request.params.to_query();
        if payload != request.payload {
            return false;
        }
        let Ok(expected) = hex::decode(&request.signature) else {
            return false;
        };
        self.mac(&payload).verify_slice(&expected).is_ok()
    }

    fn mac(&self, message: &str) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret())
            .expect("HMAC can take key of any size");
        mac.update(message.as_bytes());
        mac
    }
}

/// Current time in epoch milliseconds.
pub fn now_millis() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}
