//! `AnalysisClient` trait and the reqwest-backed `ApiClient`.
//!
//! One dispatch window maps to exactly one request — no retry, no backoff,
//! no timeout beyond the transport's own defaults.  A second window may be
//! submitted while the first is still in flight; ordering is resolved by the
//! session's generation tag, not here.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ApiConfig;

use super::verdict::FactCheckVerdict;

// ---------------------------------------------------------------------------
// AnalysisError
// ---------------------------------------------------------------------------

/// Errors that can occur while submitting a window for analysis.
///
/// Every variant is terminal for its single dispatch only; the session
/// carries on with the next window regardless.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// HTTP transport or connection failure.
    #[error("analysis request failed: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("analysis service responded with status {0}")]
    Status(u16),

    /// The response body could not be parsed as a verdict.
    #[error("failed to parse analysis response: {0}")]
    Parse(String),

    /// The service returned a 2xx with no body at all.
    #[error("no response received from analysis service")]
    EmptyResponse,
}

impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Transport(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// AnalysisClient trait
// ---------------------------------------------------------------------------

/// Async seam for the fact-check service.
///
/// Implementors must be `Send + Sync` so the session can hold an
/// `Arc<dyn AnalysisClient>` and submit from spawned tasks.
#[async_trait]
pub trait AnalysisClient: Send + Sync {
    /// Submit one base64-encoded PCM window and resolve its verdict.
    async fn submit(&self, audio_b64: &str) -> Result<FactCheckVerdict, AnalysisError>;
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// HTTP implementation of [`AnalysisClient`].
///
/// All connection details (`endpoint`, `api_key`) come exclusively from the
/// [`ApiConfig`] passed to [`ApiClient::from_config`]; nothing is hardcoded.
pub struct ApiClient {
    client: reqwest::Client,
    config: ApiConfig,
}

impl ApiClient {
    /// Build an `ApiClient` from application config.
    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config: config.clone(),
        }
    }
}

#[async_trait]
impl AnalysisClient for ApiClient {
    /// POST `{ "audio": <b64>, "format": "base64" }` to the configured
    /// endpoint.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty, so local
    /// unauthenticated servers work out of the box.
    async fn submit(&self, audio_b64: &str) -> Result<FactCheckVerdict, AnalysisError> {
        let body = serde_json::json!({
            "audio": audio_b64,
            "format": "base64",
        });

        let mut req = self.client.post(&self.config.endpoint).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AnalysisError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }

        serde_json::from_slice(&bytes).map_err(|e| AnalysisError::Parse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// MockAnalysisClient  (test double)
// ---------------------------------------------------------------------------

/// Test double that resolves a canned outcome, optionally after a delay.
///
/// The delay lets tests exercise the in-flight/stale-response paths without
/// a real server.
#[cfg(test)]
pub struct MockAnalysisClient {
    outcome: Result<FactCheckVerdict, String>,
    delay_ms: u64,
}

#[cfg(test)]
impl MockAnalysisClient {
    /// Always succeed with `verdict`.
    pub fn ok(verdict: FactCheckVerdict) -> Self {
        Self {
            outcome: Ok(verdict),
            delay_ms: 0,
        }
    }

    /// Always fail with a transport error carrying `message`.
    pub fn err(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
            delay_ms: 0,
        }
    }

    /// Delay each response by `ms` milliseconds.
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }
}

#[cfg(test)]
#[async_trait]
impl AnalysisClient for MockAnalysisClient {
    async fn submit(&self, _audio_b64: &str) -> Result<FactCheckVerdict, AnalysisError> {
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        self.outcome
            .clone()
            .map_err(AnalysisError::Transport)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
