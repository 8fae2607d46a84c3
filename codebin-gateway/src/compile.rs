//! Pass-through client for the external Dart compile service.
//!
//! The gateway holds no compile state: each request is forwarded as
//! `{"source": <code>}` and the upstream `result` field is handed back.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Errors from the upstream compile call.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CompileError {
    /// The request could not be sent or the response could not be read.
    #[error("compile transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("compile service returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream answered 2xx without a `result` field.
    #[error("compile service response has no result")]
    MissingResult,
}

/// Something that turns Dart source into compiled output.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `source` and return the upstream `result` payload.
    ///
    /// # Errors
    /// Returns [`CompileError`] if the upstream is unreachable, rejects the
    /// request, or returns no result.
    async fn compile(&self, source: &str) -> Result<serde_json::Value, CompileError>;
}

#[derive(Debug, Serialize)]
struct CompileRequest<'a> {
    source: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompileResponse {
    result: Option<serde_json::Value>,
}

/// [`Compiler`] backed by a DartPad-compatible HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompiler {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompiler {
    /// Create a client posting to `endpoint`, giving up after `timeout`.
    ///
    /// # Errors
    /// Returns [`CompileError::Transport`] if the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CompileError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint: endpoint.into() })
    }
}

#[async_trait]
impl Compiler for HttpCompiler {
    async fn compile(&self, source: &str) -> Result<serde_json::Value, CompileError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&CompileRequest { source })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompileError::Upstream { status: status.as_u16(), body });
        }

        let parsed: CompileResponse = resp.json().await?;
        let result = parsed.result.ok_or(CompileError::MissingResult)?;
        tracing::debug!(endpoint = %self.endpoint, source_len = source.len(), "compile succeeded");
        Ok(result)
    }
}
