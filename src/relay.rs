//! Same-origin relay in front of the chat backend.
//!
//! `POST /api/chat` forwards the request body untouched to
//! `<BACKEND_URL>/chat` and streams the backend's response back with its
//! status and content type. The browser never learns the backend address or
//! token. With `RELAY_STATIC_DIR` set, every other path is served from that
//! directory so a web build of the UI talks to its own origin.

use crate::config::RelayConfig;
use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tracing::{debug, info, warn};

pub const CHAT_ROUTE: &str = "/api/chat";

const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("backend unreachable: {0}")]
    Backend(#[from] reqwest::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_GATEWAY, self.to_string()).into_response()
    }
}

/// Shared, read-only state: configuration plus one pooled HTTP client.
#[derive(Clone)]
pub struct RelayState {
    config: Arc<RelayConfig>,
    http: reqwest::Client,
}

impl RelayState {
    pub fn new(config: RelayConfig) -> Self {
        Self::with_client(config, reqwest::Client::new())
    }

    pub fn with_client(config: RelayConfig, http: reqwest::Client) -> Self {
        Self {
            config: Arc::new(config),
            http,
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

pub fn router(state: RelayState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    let static_dir = state.config.static_dir.clone();
    let mut router = Router::new()
        .route(CHAT_ROUTE, post(forward_chat))
        .with_state(state);
    if let Some(dir) = static_dir {
        let index = ServeFile::new(dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(dir).fallback(index));
    }
    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}

/// Run the relay on `listener` until Ctrl-C.
pub async fn serve(listener: TcpListener, state: RelayState) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, ctrl_c()).await
}

pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: RelayState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for ctrl-c; relying on process termination");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

async fn forward_chat(State(state): State<RelayState>, body: Body) -> Result<Response, RelayError> {
    let url = state.config.chat_url();

    // Streamed through as it arrives; no size limit, no buffering.
    let mut req = state
        .http
        .post(&url)
        .header(reqwest::header::CONTENT_TYPE, DEFAULT_CONTENT_TYPE)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()));
    if let Some(token) = &state.config.backend_token {
        req = req.bearer_auth(token);
    }

    let res = req.send().await.map_err(|err| {
        warn!(%url, error = %err, "backend request failed");
        RelayError::from(err)
    })?;

    let status = StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    debug!(%url, %status, "forwarding backend response");

    let mut response = Response::new(Body::from_stream(res.bytes_stream()));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, content_type);
    Ok(response)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring unusable CORS origin");
                None
            }
        })
        .collect();
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::POST])
            .allow_headers([header::CONTENT_TYPE]),
    )
}
