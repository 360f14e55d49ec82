//! Paymaster HTTP client and the error shape shared by every collaborator call.

use alloy::{
    primitives::Address,
    transports::{RpcError, TransportErrorKind},
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

/// Failure of a call to a remote collaborator.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
}

/// The parts of a failed response that negative tests assert on.
pub trait ErrorResponse {
    /// HTTP status, when the failure carried one.
    fn status(&self) -> Option<u16>;

    /// Human-readable reason, taken from the response body where possible.
    fn message(&self) -> String;
}

/// Extracts the reason from an error body: the `error` field, then
/// `message`, then the raw body.
pub fn body_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_owned();
    };
    ["error", "message"]
        .into_iter()
        .find_map(|key| match value.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Object(inner) => inner
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_owned),
            _ => None,
        })
        .unwrap_or_else(|| body.to_owned())
}

impl ErrorResponse for RpcError<TransportErrorKind> {
    fn status(&self) -> Option<u16> {
        match self {
            RpcError::Transport(TransportErrorKind::HttpError(err)) => Some(err.status),
            _ => None,
        }
    }

    fn message(&self) -> String {
        match self {
            RpcError::ErrorResp(payload) => payload.message.to_string(),
            RpcError::Transport(TransportErrorKind::HttpError(err)) => body_message(&err.body),
            other => other.to_string(),
        }
    }
}

impl ErrorResponse for ClientError {
    fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Http(err) => err.status().map(|status| status.as_u16()),
            Self::Rpc(err) => err.status(),
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Api { body, .. } => body_message(body),
            Self::Http(err) => err.to_string(),
            Self::Rpc(err) => err.message(),
        }
    }
}

impl ErrorResponse for eyre::Report {
    fn status(&self) -> Option<u16> {
        self.downcast_ref::<ClientError>()
            .and_then(ErrorResponse::status)
    }

    fn message(&self) -> String {
        match self.downcast_ref::<ClientError>() {
            Some(err) => err.message(),
            None => self.to_string(),
        }
    }
}

/// JSON-over-HTTP paymaster API. Every call carries the api key and chain id
/// as query parameters.
#[derive(Debug, Clone)]
pub struct PaymasterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    chain_id: String,
}

impl PaymasterClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, chain_id: u64) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
            chain_id: chain_id.to_string(),
        }
    }

    /// Same service, different chain id. Accepts malformed ids for negative cases.
    pub fn with_chain_id(&self, chain_id: impl ToString) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_api_key(&self, api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..self.clone()
        }
    }

    #[tracing::instrument(skip(self, body), fields(chain_id = %self.chain_id))]
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value, ClientError> {
        let url = format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        debug!(%url, "paymaster request");

        let resp = self
            .http
            .post(url)
            .query(&[("apiKey", &self.api_key), ("chainId", &self.chain_id)])
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        if text.is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text)))
    }

    pub async fn whitelist(&self, addresses: &[Address]) -> Result<Value, ClientError> {
        self.post("whitelist", &json!({ "params": [addresses] })).await
    }

    pub async fn remove_whitelist(&self, addresses: &[Address]) -> Result<Value, ClientError> {
        self.post("removeWhitelist", &json!({ "params": [addresses] }))
            .await
    }

    /// Deposits `amount` (in ether units) into the paymaster balance.
    pub async fn deposit(&self, amount: &str) -> Result<Value, ClientError> {
        self.post("deposit", &json!({ "params": [amount] })).await
    }

    pub async fn add_stake(&self, amount: &str) -> Result<Value, ClientError> {
        self.post("addStake", &json!({ "params": [amount] })).await
    }

    pub async fn add_policy(&self, policy: &Value) -> Result<Value, ClientError> {
        self.post("addPolicy", policy).await
    }
}
