//! Axum route handlers for the codebin gateway API.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    Json, Router,
};
use codebin_store::{LoadOutcome, SnippetLifecycle, SnippetStore};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{compile::Compiler, error::GatewayError, page::render_snippet_page};

// ── Shared state ─────────────────────────────────────────────────────────────

/// Lifecycle manager over whichever store backend the process selected.
pub type Lifecycle = SnippetLifecycle<Arc<dyn SnippetStore>>;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<Lifecycle>,
    pub compiler: Arc<dyn Compiler>,
}

impl AppState {
    #[must_use]
    pub fn new(lifecycle: Arc<Lifecycle>, compiler: Arc<dyn Compiler>) -> Self {
        Self { lifecycle, compiler }
    }
}

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct SaveBody {
    pub uid: Option<String>,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoadParams {
    pub uid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompileBody {
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CompileResult {
    pub result: serde_json::Value,
}

/// Treat absent and empty string the same way.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// ── Router ────────────────────────────────────────────────────────────────────

/// Build the application router with the given state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/save", post(save_code))
        .route("/load", get(load_code))
        .route("/dart", post(compile_dart))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// `GET /health` — liveness probe that also checks the store.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.lifecycle.store().health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))),
        Err(e) => {
            tracing::warn!(error = %e, "store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable", "error": e.to_string()})),
            )
        }
    }
}

/// `POST /save` — store `code` under `uid`, replacing any previous snippet.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if `uid` or `code` is missing or
/// empty, and [`GatewayError::Store`] if the write fails.
pub async fn save_code(
    State(state): State<AppState>,
    body: Result<Json<SaveBody>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let (Some(uid), Some(code)) = (present(body.uid), present(body.code)) else {
        return Err(GatewayError::InvalidRequest("Missing 'uid' or 'code' parameter".to_owned()));
    };
    state.lifecycle.save(&uid, Some(&code)).await?;
    Ok(Json(SaveResponse { message: "Code saved successfully" }))
}

/// `GET /load?uid=` — render the snippet stored under `uid`.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if `uid` is missing,
/// [`GatewayError::NotFound`] if nothing is stored, [`GatewayError::Expired`]
/// if the snippet aged out (it is deleted), and [`GatewayError::Store`] on
/// store failure.
pub async fn load_code(
    State(state): State<AppState>,
    Query(params): Query<LoadParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let Some(uid) = present(params.uid) else {
        return Err(GatewayError::InvalidRequest("Missing 'uid' query parameter".to_owned()));
    };
    match state.lifecycle.load(&uid).await? {
        LoadOutcome::Found(snippet) => Ok(Html(render_snippet_page(&snippet.content))),
        LoadOutcome::NotFound => Err(GatewayError::NotFound),
        LoadOutcome::Expired => Err(GatewayError::Expired),
    }
}

/// `POST /dart` — forward `code` to the compile service.
///
/// # Errors
/// Returns [`GatewayError::InvalidRequest`] if `code` is missing or empty, and
/// [`GatewayError::Compile`] if the upstream call fails.
pub async fn compile_dart(
    State(state): State<AppState>,
    body: Result<Json<CompileBody>, JsonRejection>,
) -> Result<impl IntoResponse, GatewayError> {
    let Json(body) = body.map_err(|e| GatewayError::InvalidRequest(e.body_text()))?;
    let Some(code) = present(body.code) else {
        return Err(GatewayError::InvalidRequest("Missing 'code' parameter".to_owned()));
    };
    let result = state.compiler.compile(&code).await?;
    Ok(Json(CompileResult { result }))
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"})))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use codebin_core::{ManualClock, Ttl};
    use codebin_store::MemoryStore;
    use tower::ServiceExt;

    use crate::compile::CompileError;

    const T0: i64 = 1_700_000_000_000;

    struct EchoCompiler;

    #[async_trait]
    impl Compiler for EchoCompiler {
        async fn compile(&self, source: &str) -> Result<serde_json::Value, CompileError> {
            if source.contains("syntax error") {
                return Err(CompileError::Upstream { status: 400, body: "nope".to_owned() });
            }
            Ok(serde_json::Value::String(format!("compiled:{source}")))
        }
    }

    fn test_state(clock: &Arc<ManualClock>) -> AppState {
        let store: Arc<dyn SnippetStore> = Arc::new(MemoryStore::new());
        let lifecycle = SnippetLifecycle::new(store).with_clock(clock.clone());
        AppState::new(Arc::new(lifecycle), Arc::new(EchoCompiler))
    }

    fn json_request(uri: &str, body: &serde_json::Value) -> Request<Body> {
        match Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    fn get_request(uri: &str) -> Request<Body> {
        match Request::builder().uri(uri).body(Body::empty()) {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        }
    }

    async fn send(state: &AppState, req: Request<Body>) -> (StatusCode, String) {
        let resp = match create_router(state.clone()).oneshot(req).await {
            Ok(r) => r,
            Err(e) => panic!("handler error: {e}"),
        };
        let status = resp.status();
        let bytes = match axum::body::to_bytes(resp.into_body(), 64 * 1024).await {
            Ok(b) => b,
            Err(e) => panic!("failed to read body: {e}"),
        };
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    fn parse(body: &str) -> serde_json::Value {
        match serde_json::from_str(body) {
            Ok(v) => v,
            Err(e) => panic!("invalid JSON {body:?}: {e}"),
        }
    }

    #[tokio::test]
    async fn health_response_format_returns_ok_with_status_field() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(&state, get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["status"], "ok");
    }

    #[tokio::test]
    async fn save_then_load_renders_escaped_code() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(
            &state,
            json_request("/save", &json!({"uid": "abc", "code": "print(1 < 2);"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["message"], "Code saved successfully");

        let (status, body) = send(&state, get_request("/load?uid=abc")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<pre>print(1 &lt; 2);</pre>"), "unexpected page: {body}");
    }

    #[tokio::test]
    async fn save_missing_fields_is_bad_request() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        for payload in [json!({"code": "x"}), json!({"uid": "abc"}), json!({"uid": "", "code": "x"})] {
            let (status, body) = send(&state, json_request("/save", &payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {payload}");
            assert_eq!(parse(&body)["error"], "Missing 'uid' or 'code' parameter");
        }
    }

    #[tokio::test]
    async fn save_malformed_json_is_bad_request() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let req = match Request::builder()
            .method("POST")
            .uri("/save")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
        {
            Ok(r) => r,
            Err(e) => panic!("failed to build request: {e}"),
        };
        let (status, body) = send(&state, req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(parse(&body)["error"].is_string());
    }

    #[tokio::test]
    async fn load_missing_uid_is_bad_request() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(&state, get_request("/load")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body)["error"], "Missing 'uid' query parameter");
    }

    #[tokio::test]
    async fn load_unknown_uid_is_404() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(&state, get_request("/load?uid=ghost")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body)["error"], "Code not found");
    }

    #[tokio::test]
    async fn load_expired_is_410_then_404() {
        let clock = Arc::new(ManualClock::new(T0));
        let state = test_state(&clock);
        let (status, _) =
            send(&state, json_request("/save", &json!({"uid": "abc", "code": "x"}))).await;
        assert_eq!(status, StatusCode::OK);

        clock.advance(Ttl::DEFAULT.as_millis() + 1);
        let (status, body) = send(&state, get_request("/load?uid=abc")).await;
        assert_eq!(status, StatusCode::GONE);
        assert_eq!(parse(&body)["error"], "Code has expired and has been deleted");

        let (status, _) = send(&state, get_request("/load?uid=abc")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn dart_forwards_code_and_wraps_result() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) =
            send(&state, json_request("/dart", &json!({"code": "void main() {}"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse(&body)["result"], "compiled:void main() {}");
    }

    #[tokio::test]
    async fn dart_missing_code_is_bad_request() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(&state, json_request("/dart", &json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(parse(&body)["error"], "Missing 'code' parameter");
    }

    #[tokio::test]
    async fn dart_upstream_failure_is_500() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) =
            send(&state, json_request("/dart", &json!({"code": "syntax error"}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(parse(&body)["error"], "Failed to compile Dart code");
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let state = test_state(&Arc::new(ManualClock::new(T0)));
        let (status, body) = send(&state, get_request("/nope")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(parse(&body)["error"], "Not Found");
    }

    #[test]
    fn save_body_fields_are_optional() {
        let body: SaveBody = match serde_json::from_str("{}") {
            Ok(b) => b,
            Err(e) => panic!("invalid JSON: {e}"),
        };
        assert!(body.uid.is_none() && body.code.is_none());
    }
}
