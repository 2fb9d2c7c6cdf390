use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error::AppError;

/// What a gateway call is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Recipe(String),
    Search(String),
    Upload,
}

/// The network side of the store. Implementations return the decoded JSON
/// body, or fail with `Network`/`NotFound` for non-success responses and
/// `Timeout` when the deadline wins.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(
        &self,
        target: &Target,
        payload: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, AppError>;
}

#[async_trait]
impl<T: Gateway + ?Sized> Gateway for std::sync::Arc<T> {
    async fn call(
        &self,
        target: &Target,
        payload: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, AppError> {
        (**self).call(target, payload, cancel).await
    }
}

/// Run `work` against a deadline and the caller's cancellation token.
/// Whichever settles first decides the outcome; the losing `work` future is
/// dropped, which aborts whatever request it had in flight.
pub async fn race_deadline<F>(
    work: F,
    deadline: Duration,
    cancel: &CancellationToken,
) -> Result<Value, AppError>
where
    F: Future<Output = Result<Value, AppError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        res = work => res,
        _ = tokio::time::sleep(deadline) => {
            tracing::warn!("request abandoned after {deadline:?}");
            Err(AppError::Timeout(deadline))
        }
    }
}

/// Turn an HTTP status and raw body into the decoded body or the matching
/// error. Error bodies carry a `message` field.
pub fn decode_response(status: StatusCode, body: &str) -> Result<Value, AppError> {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    if status.is_success() {
        return parsed.ok_or_else(|| AppError::Decode("response body is not JSON".to_string()));
    }
    let message = parsed
        .as_ref()
        .and_then(|v| v.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    if status == StatusCode::NOT_FOUND {
        Err(AppError::NotFound { message })
    } else {
        Err(AppError::Network {
            message,
            status: status.as_u16(),
        })
    }
}

/// Gateway backed by the recipe HTTP API.
pub struct HttpGateway {
    client: Client,
    base_url: String,
    key: Option<String>,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("recipe-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    /// Full URL for a target, including the API key when configured.
    pub fn url_for(&self, target: &Target) -> anyhow::Result<reqwest::Url> {
        let raw = match target {
            Target::Recipe(id) => format!("{}{}", self.base_url, id),
            Target::Search(_) | Target::Upload => self.base_url.clone(),
        };
        let mut url = reqwest::Url::parse(&raw)?;
        {
            let mut query = url.query_pairs_mut();
            if let Target::Search(q) = target {
                query.append_pair("search", q);
            }
            if let Some(key) = &self.key {
                query.append_pair("key", key);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    async fn send(&self, url: reqwest::Url, payload: Option<&Value>) -> Result<Value, AppError> {
        let request = match payload {
            Some(body) => self.client.post(url).json(body),
            None => self.client.get(url),
        };
        let response = request
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        decode_response(status, &body)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn call(
        &self,
        target: &Target,
        payload: Option<&Value>,
        cancel: &CancellationToken,
    ) -> Result<Value, AppError> {
        let url = self
            .url_for(target)
            .map_err(|e| AppError::Transport(format!("bad url: {e}")))?;
        tracing::debug!(%url, upload = payload.is_some(), "gateway call");
        race_deadline(self.send(url, payload), self.timeout, cancel).await
    }
}
