//! Policy-driven response reconciliation.
//!
//! Consumes the settled per-target attempts and produces exactly one
//! outbound response. The scan order is target-list order, never completion
//! order, so selection is deterministic for a fixed outcome pattern.

use axum::body::Body;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use super::fanout::{ForwardAttempt, ForwardOutcome};
use crate::policy::{CannedBody, ResponsePolicy};

/// Pick exactly one response from the settled attempts under the active
/// policy.
///
/// Canned policies ignore the attempts entirely; the dispatcher still
/// awaited them, since the fan-out's side effects on targets must happen
/// either way. AwaitForward selects a forwarded result, falling back to the
/// canned 200/OK body when every attempt failed.
pub fn reconcile(
    attempts: &[ForwardAttempt],
    policy: &ResponsePolicy,
) -> Result<Response, axum::http::Error> {
    match policy {
        ResponsePolicy::Canned { status, body } => Ok(canned_response(*status, body)),
        ResponsePolicy::AwaitForward { prioritize_success } => {
            match select_outcome(attempts, *prioritize_success) {
                Some(ForwardOutcome::Success {
                    status,
                    headers,
                    body,
                }) => forwarded_response(*status, headers, body.clone()),
                _ => Ok(canned_response(StatusCode::OK, &CannedBody::ok())),
            }
        }
    }
}

/// Scan the settled attempts in target-list order.
///
/// Failed attempts are skipped. With `prioritize_success`, the first 200
/// wins outright. Otherwise the first non-200 wins immediately, and the
/// last-seen 200 is the result when no non-200 ever appears.
fn select_outcome(attempts: &[ForwardAttempt], prioritize_success: bool) -> Option<&ForwardOutcome> {
    if prioritize_success {
        let first_ok = attempts.iter().find_map(|attempt| match &attempt.outcome {
            outcome @ ForwardOutcome::Success { status, .. } if *status == StatusCode::OK => {
                Some(outcome)
            }
            _ => None,
        });
        if first_ok.is_some() {
            return first_ok;
        }
    }

    let mut last_ok: Option<&ForwardOutcome> = None;
    for attempt in attempts {
        match &attempt.outcome {
            ForwardOutcome::Failed => continue,
            outcome @ ForwardOutcome::Success { status, .. } => {
                if *status != StatusCode::OK {
                    return Some(outcome);
                }
                last_ok = Some(outcome);
            }
        }
    }
    last_ok
}

/// Render a canned `{code, message}` JSON response.
fn canned_response(status: StatusCode, body: &CannedBody) -> Response {
    (status, axum::Json(body.clone())).into_response()
}

/// Copy a selected forward result onto the outbound response.
///
/// Status is copied verbatim. An empty body yields a bodyless response with
/// the status only; otherwise the body is copied and `content-type` is the
/// only header carried over.
fn forwarded_response(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<Response, axum::http::Error> {
    let mut builder = Response::builder().status(status);
    if body.is_empty() {
        return builder.body(Body::empty());
    }
    if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(Body::from(body))
}
