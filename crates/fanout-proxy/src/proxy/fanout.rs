//! Concurrent fan-out dispatch.
//!
//! One outbound request per target, all in flight at once. Attempts are
//! independent: a transport failure on one target never cancels, blocks, or
//! fails a sibling, and dispatch returns only after every attempt settled.

use std::time::Instant;

use axum::http::{HeaderMap, Method, StatusCode};
use bytes::Bytes;
use tokio::task::JoinSet;
use tracing::Instrument;

use crate::targets::TargetOrigin;

/// Result of one outbound exchange.
#[derive(Debug, Clone)]
pub enum ForwardOutcome {
    /// The transport exchange completed; the status may be any code.
    Success {
        status: StatusCode,
        headers: HeaderMap,
        body: Bytes,
    },
    /// Transport-level failure (connect, DNS, protocol). Carries no status.
    Failed,
}

/// One settled per-target attempt.
#[derive(Debug, Clone)]
pub struct ForwardAttempt {
    pub target: TargetOrigin,
    pub outcome: ForwardOutcome,
}

/// Collapse any run of leading slashes to one, or prepend a slash if missing.
///
/// Only the leading run is touched; interior slash runs are forwarded as
/// received.
pub fn normalize_path(path: &str) -> String {
    if !path.starts_with('/') {
        return format!("/{path}");
    }
    format!("/{}", path.trim_start_matches('/'))
}

/// Replicates one inbound request across every configured target.
///
/// Built once at startup; the target list is resolved ahead of time and
/// shared read-only across requests.
#[derive(Clone)]
pub struct FanoutDispatcher {
    client: reqwest::Client,
    targets: Vec<TargetOrigin>,
}

impl FanoutDispatcher {
    pub fn new(client: reqwest::Client, targets: Vec<TargetOrigin>) -> Self {
        Self { client, targets }
    }

    /// Issue one outbound request per target and wait for all to settle.
    ///
    /// GET requests never carry a body, whatever the inbound request held.
    /// The returned vector is in target-list order regardless of completion
    /// order, so the reconciler's scan is deterministic.
    pub async fn dispatch(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
        request_id: &str,
    ) -> Vec<ForwardAttempt> {
        let path = normalize_path(path_and_query);
        let body = if method == Method::GET {
            None
        } else {
            Some(body)
        };

        let mut join_set = JoinSet::new();
        for (index, target) in self.targets.iter().enumerate() {
            let client = self.client.clone();
            let target = target.clone();
            let url = format!("{target}{path}");
            let method = method.clone();
            let headers = headers.clone();
            let body = body.clone();
            let request_id = request_id.to_string();

            join_set.spawn(async move {
                let span = fanout_tracing::forward_span!(&request_id, &target);
                let outcome = send_one(&client, method, &url, headers, body)
                    .instrument(span)
                    .await;
                (index, ForwardAttempt { target, outcome })
            });
        }

        let mut slots: Vec<Option<ForwardAttempt>> =
            (0..self.targets.len()).map(|_| None).collect();
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, attempt)) => slots[index] = Some(attempt),
                Err(e) => {
                    tracing::error!(error = %e, "Forward task panicked");
                }
            }
        }

        // A panicked task left its slot empty; settle it as a failure.
        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.unwrap_or_else(|| ForwardAttempt {
                    target: self.targets[index].clone(),
                    outcome: ForwardOutcome::Failed,
                })
            })
            .collect()
    }
}

/// Perform one outbound exchange, absorbing transport errors into the outcome.
async fn send_one(
    client: &reqwest::Client,
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<Bytes>,
) -> ForwardOutcome {
    let start = Instant::now();

    let mut req_builder = client.request(method, url).headers(headers);
    if let Some(body) = body {
        req_builder = req_builder.body(body);
    }

    match req_builder.send().await {
        Ok(resp) => {
            let status = resp.status();
            let headers = resp.headers().clone();
            tracing::Span::current().record("status", status.as_u16());
            match resp.bytes().await {
                Ok(body) => {
                    let latency = start.elapsed().as_millis() as u64;
                    tracing::Span::current().record("latency_ms", latency);
                    tracing::debug!(
                        status = status.as_u16(),
                        latency_ms = latency,
                        "Forward attempt complete"
                    );
                    ForwardOutcome::Success {
                        status,
                        headers,
                        body,
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read forward response body");
                    ForwardOutcome::Failed
                }
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                latency_ms = start.elapsed().as_millis() as u64,
                "Forward attempt failed"
            );
            ForwardOutcome::Failed
        }
    }
}
