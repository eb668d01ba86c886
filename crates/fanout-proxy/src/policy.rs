//! Response selection policy.

use axum::http::StatusCode;
use serde::Serialize;

/// Canned `{code, message}` response body.
///
/// This is the only body shape the forwarder ever authors itself; everything
/// else is copied verbatim from a target response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CannedBody {
    pub code: String,
    pub message: String,
}

impl CannedBody {
    fn new(status: StatusCode, message: &str) -> Self {
        Self {
            code: status.as_u16().to_string(),
            message: message.to_string(),
        }
    }

    /// The default 200/OK body, also the fallback when every forward failed.
    pub fn ok() -> Self {
        Self::new(StatusCode::OK, "OK")
    }

    /// Generic body for reconciliation faults.
    pub fn internal_error() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error")
    }
}

/// How the reconciler chooses the single outbound response.
///
/// Resolved once at startup from the RESPONSE setting and shared read-only
/// across all requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePolicy {
    /// Always answer with this canned status and body. Forward outcomes are
    /// still awaited, then ignored.
    Canned { status: StatusCode, body: CannedBody },

    /// Answer with a forwarded result selected by scanning the settled
    /// attempts; canned 200/OK when every attempt failed.
    AwaitForward { prioritize_success: bool },
}

impl ResponsePolicy {
    /// Map the RESPONSE setting to a policy.
    ///
    /// Unrecognized values (including empty/unset) fall through to the
    /// canned 200/OK default.
    pub fn resolve(response: &str, prioritize_success: bool) -> Self {
        match response {
            "400" => Self::canned(StatusCode::BAD_REQUEST, "Bad Request"),
            "404" => Self::canned(StatusCode::NOT_FOUND, "Not Found"),
            "500" => Self::canned(StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
            "503" => Self::canned(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"),
            "await-fwd" => Self::AwaitForward { prioritize_success },
            _ => Self::Canned {
                status: StatusCode::OK,
                body: CannedBody::ok(),
            },
        }
    }

    fn canned(status: StatusCode, message: &str) -> Self {
        Self::Canned {
            status,
            body: CannedBody::new(status, message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_code_mapping() {
        for (setting, status, message) in [
            ("400", StatusCode::BAD_REQUEST, "Bad Request"),
            ("404", StatusCode::NOT_FOUND, "Not Found"),
            ("500", StatusCode::INTERNAL_SERVER_ERROR, "Internal Error"),
            ("503", StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable"),
        ] {
            let policy = ResponsePolicy::resolve(setting, false);
            match policy {
                ResponsePolicy::Canned { status: s, body } => {
                    assert_eq!(s, status);
                    assert_eq!(body.code, setting);
                    assert_eq!(body.message, message);
                }
                _ => panic!("expected canned policy for {setting}"),
            }
        }
    }

    #[test]
    fn test_unrecognized_falls_through_to_ok() {
        for setting in ["", "201", "teapot", "AWAIT-FWD"] {
            let policy = ResponsePolicy::resolve(setting, false);
            assert_eq!(
                policy,
                ResponsePolicy::Canned {
                    status: StatusCode::OK,
                    body: CannedBody::ok(),
                }
            );
        }
    }

    #[test]
    fn test_await_fwd_token() {
        assert_eq!(
            ResponsePolicy::resolve("await-fwd", true),
            ResponsePolicy::AwaitForward {
                prioritize_success: true
            }
        );
        assert_eq!(
            ResponsePolicy::resolve("await-fwd", false),
            ResponsePolicy::AwaitForward {
                prioritize_success: false
            }
        );
    }

    #[test]
    fn test_canned_body_shape() {
        let body = CannedBody::ok();
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"code":"200","message":"OK"}"#);
    }
}
