//! HTTP gateway: Telegram webhook, manual digest trigger, health probe.
//!
//! ## Endpoints
//!
//! - `POST /telegram`: Telegram `Update` webhook
//! - `GET|POST /trigger`: send today's digest now
//! - `GET /health`: liveness probe

use crate::app::App;
use crate::config::GatewayConfig;
use crate::error::DayplanError;
use crate::transport::telegram::Update;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

const TELEGRAM_SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
struct GatewayState {
    app: App,
    webhook_secret: Option<String>,
    trigger_token: Option<String>,
}

/// Build the axum router for `app`.
pub fn routes(app: App, config: &GatewayConfig) -> Router {
    let state = GatewayState {
        app,
        webhook_secret: config.webhook_secret.clone(),
        trigger_token: config.trigger_token.clone(),
    };

    Router::new()
        .route("/health", get(gateway_health))
        .route("/telegram", post(telegram_webhook))
        .route("/trigger", get(trigger_digest).post(trigger_digest))
        .with_state(state)
}

/// Running gateway server.
pub struct Gateway {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Gateway {
    /// Bind to `{config.host}:{config.port}` (port `0` picks a free port)
    /// and serve in a background task.
    pub async fn start(app: App, config: &GatewayConfig) -> crate::Result<Self> {
        let bind_addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| DayplanError::Gateway(format!("cannot bind {bind_addr}: {e}")))?;
        let addr = listener.local_addr()?;

        let router = routes(app, config);
        info!("gateway listening on http://{addr}");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("gateway error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait until the server task ends.
    pub async fn join(&mut self) {
        let _ = (&mut self.handle).await;
    }

    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn gateway_health(State(state): State<GatewayState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "storage": state.app.store.backend(),
    }))
}

fn secret_is_valid(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    headers
        .get(TELEGRAM_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|candidate| candidate == expected)
}

fn bearer_is_valid(headers: &HeaderMap, expected: &Option<String>) -> bool {
    let Some(expected_token) = expected else {
        return true;
    };
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let candidate = header_value
        .strip_prefix("Bearer ")
        .unwrap_or_default()
        .trim();
    !expected_token.is_empty() && candidate == expected_token
}

async fn telegram_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    if !secret_is_valid(&headers, &state.webhook_secret) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "unauthorized"})),
        );
    }

    let update = Update::from_value(body);
    let outcome = state.app.bot.handle_update(&update).await;
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "ok": true,
            "outcome": outcome.as_str(),
        })),
    )
}

async fn trigger_digest(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !bearer_is_valid(&headers, &state.trigger_token) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({"ok": false, "error": "unauthorized"})),
        );
    }

    match state.app.digest.send_now(chrono::Utc::now()).await {
        Ok(list) => (
            StatusCode::OK,
            Json(serde_json::json!({"ok": true, "list": list.as_str()})),
        ),
        Err(e) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({"ok": false, "error": e.to_string()})),
        ),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn bearer_validation_requires_exact_token_match() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            "Bearer abc123".parse().expect("header parse"),
        );

        assert!(bearer_is_valid(&headers, &Some("abc123".to_owned())));
        assert!(!bearer_is_valid(&headers, &Some("wrong".to_owned())));
        assert!(bearer_is_valid(&HeaderMap::new(), &None));
        assert!(!bearer_is_valid(&HeaderMap::new(), &Some("abc123".to_owned())));
    }

    #[test]
    fn secret_header_must_match_when_configured() {
        let mut headers = HeaderMap::new();
        headers.insert(TELEGRAM_SECRET_HEADER, "s3cret".parse().expect("header parse"));

        assert!(secret_is_valid(&headers, &Some("s3cret".to_owned())));
        assert!(!secret_is_valid(&headers, &Some("other".to_owned())));
        assert!(!secret_is_valid(&HeaderMap::new(), &Some("s3cret".to_owned())));
        assert!(secret_is_valid(&HeaderMap::new(), &None));
    }
}
