//! Startup error taxonomy.

use thiserror::Error;

/// Fatal configuration conditions, detected before the listener starts.
///
/// A forwarder with zero targets cannot fulfill its contract, so both
/// variants abort startup. The two are distinct so the operator can tell
/// "nothing configured" from "everything configured was garbage".
#[derive(Debug, Error)]
pub enum StartupError {
    /// TARGET_HOSTS was missing or empty.
    #[error("TARGET_HOSTS is not set; at least one target origin is required")]
    MissingTargetHosts,

    /// TARGET_HOSTS was set but no entry parsed to a valid origin.
    #[error("TARGET_HOSTS contains no valid origin: {raw:?}")]
    NoValidOrigins { raw: String },
}
