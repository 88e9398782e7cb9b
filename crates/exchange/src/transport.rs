use crate::signer::{Method, Params, SignedRequest, API_KEY_HEADER};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use spotbridge_core::{ExchangeError, ExchangeResult};
use tracing::debug;

/// Error body the exchange sends with 4xx/5xx answers.
#[derive(Deserialize, Debug)]
struct ErrorData {
    code: i64,
    msg: String,
}

/// Status, headers and body of a 2xx answer, left for the caller to interpret.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn json<T: DeserializeOwned>(&self) -> ExchangeResult<T> {
        serde_json::from_str(&self.body).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}

/// One HTTP call per request: no retries, no caching, reqwest's default timeouts.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    base_url: String,
}

impl Transport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a signed request. GET/DELETE carry the signed string in the query,
    /// POST carries it as a form body.
    pub async fn send(&self, request: &SignedRequest, api_key: &str) -> ExchangeResult<RawResponse> {
        let url = self.url(&request.path);
        let encoded = request.encoded();
        let builder = match request.method {
            Method::Get => self.client.get(format!("{url}?{encoded}")),
            Method::Delete => self.client.delete(format!("{url}?{encoded}")),
            Method::Post => self
                .client
                .post(url)
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded),
        };

        debug!(method = %request.method, path = %request.path, "Sending signed request");
        self.execute(builder.header(API_KEY_HEADER, api_key)).await
    }

    /// Unauthenticated GET against a public endpoint.
    pub async fn get_public(&self, path: &str, params: &Params) -> ExchangeResult<RawResponse> {
        let url = self.url(path);
        let url = if params.is_empty() {
            url
        } else {
            format!("{url}?{}", params.to_query())
        };

        debug!(path = %path, "Sending public request");
        self.execute(self.client.get(url)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn execute(&self, builder: RequestBuilder) -> ExchangeResult<RawResponse> {
        let response = builder
            .send()
            .await
            .map_err(|e| ExchangeError::Transport(e.to_string()))?;
        parse_response(response).await
    }
}

async fn parse_response(response: Response) -> ExchangeResult<RawResponse> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response
        .text()
        .await
        .map_err(|e| ExchangeError::Transport(e.to_string()))?;

    if (200..300).contains(&status) {
        return Ok(RawResponse {
            status,
            headers,
            body,
        });
    }

    let message = match serde_json::from_str::<ErrorData>(&body) {
        Ok(error) => format!("code {}: {}", error.code, error.msg),
        Err(_) => body,
    };
    Err(ExchangeError::Status { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let transport = Transport::new("https://testnet.binance.vision/api/");
        assert_eq!(transport.base_url(), "https://testnet.binance.vision/api");
        assert_eq!(
            transport.url("/v3/account"),
            "https://testnet.binance.vision/api/v3/account"
        );
    }

    #[test]
    fn test_raw_response_decode_error() {
        let raw = RawResponse {
            status: 200,
            headers: HeaderMap::new(),
            body: "not json".to_string(),
        };
        let result: ExchangeResult<serde_json::Value> = raw.json();
        assert!(matches!(result, Err(ExchangeError::Decode(_))));
    }
}
