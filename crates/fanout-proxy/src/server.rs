//! Axum HTTP server: router, listener, graceful shutdown.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::ProxyConfig;
use crate::headers::{self, HeaderAllowlist};
use crate::policy::{CannedBody, ResponsePolicy};
use crate::proxy::fanout::FanoutDispatcher;
use crate::proxy::reconcile;

/// Largest inbound body the forwarder will buffer.
const BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Shared application state. Immutable for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: FanoutDispatcher,
    pub policy: ResponsePolicy,
    pub allowlist: Option<HeaderAllowlist>,
}

/// Build and run the HTTP server.
pub async fn run(config: &ProxyConfig, state: AppState) -> anyhow::Result<()> {
    let listen_addr = format!("0.0.0.0:{}", config.port);
    let app = router(config, state)?;

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(address = %listen_addr, "fanout-proxy listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("fanout-proxy shut down gracefully");
    Ok(())
}

/// Assemble the router: one catch-all route accepting any method and any
/// path, optionally wrapped in a CORS layer when CORS_ORIGIN is set.
fn router(config: &ProxyConfig, state: AppState) -> anyhow::Result<Router> {
    let mut app = Router::new()
        .fallback(handle_any)
        .with_state(Arc::new(state));

    if let Some(origin) = &config.cors_origin {
        let cors = CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }
    Ok(app)
}

/// Catch-all handler: any method, any path.
///
/// Filters headers, fans the request out to every target, waits for all
/// attempts to settle, then reconciles exactly one response under the
/// active policy.
async fn handle_any(State(state): State<Arc<AppState>>, request: Request) -> Response {
    let request_id = Uuid::new_v4().to_string();
    let start = Instant::now();

    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let span = fanout_tracing::request_span!(&request_id, &method, &path_and_query);

    let inbound_headers = request.headers().clone();
    let body = match axum::body::to_bytes(request.into_body(), BODY_LIMIT).await {
        Ok(b) => b,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read request body");
            return (StatusCode::BAD_REQUEST, "failed to read request body").into_response();
        }
    };

    async {
        let outbound_headers =
            headers::filter_headers(&inbound_headers, state.allowlist.as_ref());

        let attempts = state
            .dispatcher
            .dispatch(method, &path_and_query, outbound_headers, body, &request_id)
            .await;

        let response = match reconcile::reconcile(&attempts, &state.policy) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Reconciliation failed after dispatch");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    axum::Json(CannedBody::internal_error()),
                )
                    .into_response()
            }
        };

        let latency = start.elapsed().as_millis() as u64;
        tracing::Span::current().record("status", response.status().as_u16());
        tracing::Span::current().record("latency_ms", latency);
        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = latency,
            attempts = attempts.len(),
            "Request reconciled"
        );
        response
    }
    .instrument(span)
    .await
}

/// Wait for SIGINT (Ctrl+C) for graceful shutdown.
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install CTRL+C signal handler");
    tracing::info!("Shutdown signal received, draining connections...");
}
