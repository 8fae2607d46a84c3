//! Error types for the gateway crate.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use codebin_store::{LifecycleError, StoreError};
use serde_json::json;

use crate::compile::CompileError;

/// Errors that can occur during gateway request handling.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// The request is missing a parameter or carries an invalid one.
    #[error("{0}")]
    InvalidRequest(String),

    /// No snippet is stored under the requested id.
    #[error("Code not found")]
    NotFound,

    /// The snippet existed but outlived the retention window.
    #[error("Code has expired and has been deleted")]
    Expired,

    /// The snippet store failed. The detail is logged, never sent.
    #[error("Internal server error")]
    Store(#[from] StoreError),

    /// The upstream compiler failed or answered with garbage.
    #[error("Failed to compile Dart code")]
    Compile(#[from] CompileError),

    /// Any other server-side failure. The detail is logged, never sent.
    #[error("Internal server error")]
    Internal(String),
}

impl From<LifecycleError> for GatewayError {
    fn from(err: LifecycleError) -> Self {
        match err {
            LifecycleError::InvalidArgument(msg) => GatewayError::InvalidRequest(msg),
            LifecycleError::Store(e) => GatewayError::Store(e),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl GatewayError {
    /// HTTP status this error maps to.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Expired => StatusCode::GONE,
            GatewayError::Store(_)
            | GatewayError::Compile(_)
            | GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            match &self {
                GatewayError::Compile(source) => {
                    tracing::error!(error = %source, "compile request failed");
                }
                GatewayError::Store(source) => {
                    tracing::error!(error = %source, "snippet store failed");
                }
                GatewayError::Internal(detail) => {
                    tracing::error!(error = %detail, "request failed");
                }
                other => tracing::error!(error = %other, "request failed"),
            }
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn gateway_error_status_codes_map_correctly() {
        assert_eq!(GatewayError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(GatewayError::Expired.into_response().status(), StatusCode::GONE);

        let bad_req = GatewayError::InvalidRequest("missing field".to_owned());
        assert_eq!(bad_req.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn gateway_error_store_variant_returns_500() {
        let gw_err = GatewayError::Store(StoreError::Unavailable("down".to_owned()));
        assert_eq!(
            gw_err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "Store errors must map to 500"
        );
    }

    #[test]
    fn gateway_error_from_lifecycle_error() {
        let invalid: GatewayError = LifecycleError::InvalidArgument("empty id".to_owned()).into();
        assert!(matches!(invalid, GatewayError::InvalidRequest(_)));

        let store: GatewayError =
            LifecycleError::Store(StoreError::Unavailable("down".to_owned())).into();
        assert!(matches!(store, GatewayError::Store(_)));
    }

    #[test]
    fn gateway_error_compile_hides_upstream_detail() {
        let err = GatewayError::Compile(CompileError::MissingResult);
        assert_eq!(err.to_string(), "Failed to compile Dart code");
    }

    #[tokio::test]
    async fn gateway_error_store_body_hides_paths() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = GatewayError::Store(StoreError::Io {
            path: "/srv/codebin/data/codes/abc.json".into(),
            source: io,
        });
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = match axum::body::to_bytes(resp.into_body(), 4096).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        let body: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => panic!("body is not JSON: {e}"),
        };
        assert_eq!(body["error"], "Internal server error");
        assert!(!String::from_utf8_lossy(&bytes).contains("/srv/codebin"));
    }

    #[test]
    fn gateway_error_display_includes_message() {
        let err = GatewayError::InvalidRequest("Missing 'uid' query parameter".to_owned());
        assert!(err.to_string().contains("Missing 'uid'"), "Display must include the message");
    }
}
