//! Span builder helpers for fanout-proxy instrumentation.

/// Create a tracing span for the top-level inbound request.
///
/// `status` and `latency_ms` are recorded by the handler once the
/// reconciled response is known.
#[macro_export]
macro_rules! request_span {
    ($request_id:expr, $method:expr, $path:expr) => {
        tracing::info_span!(
            "proxy_request",
            request_id = %$request_id,
            method = %$method,
            path = %$path,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}

/// Create a tracing span for a single per-target forward attempt.
#[macro_export]
macro_rules! forward_span {
    ($request_id:expr, $target:expr) => {
        tracing::info_span!(
            "forward_attempt",
            request_id = %$request_id,
            target = %$target,
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    };
}
