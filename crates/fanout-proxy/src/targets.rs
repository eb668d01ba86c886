//! Target origin resolution.

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::error::StartupError;

/// A forwarding destination: scheme + host + port, no path or query.
///
/// Stored in serialized form (e.g. `https://api.example.com:8443`); default
/// ports are omitted by the `url` crate's origin serialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetOrigin(String);

impl TargetOrigin {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a comma-separated URL list into a deduplicated, ordered origin list.
///
/// Entries that fail to parse are skipped with a warning. Duplicate origins
/// (same scheme+host+port, regardless of path) collapse to the first-seen
/// entry, preserving order. An empty result is fatal.
pub fn resolve_targets(raw: Option<&str>) -> Result<Vec<TargetOrigin>, StartupError> {
    let raw = match raw {
        Some(s) if !s.trim().is_empty() => s,
        _ => return Err(StartupError::MissingTargetHosts),
    };

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        match parse_origin(entry) {
            Some(origin) => {
                if seen.insert(origin.clone()) {
                    targets.push(TargetOrigin(origin));
                }
            }
            None => {
                tracing::warn!(entry = %entry, "Skipping unparsable target URL");
            }
        }
    }

    if targets.is_empty() {
        return Err(StartupError::NoValidOrigins {
            raw: raw.to_string(),
        });
    }
    Ok(targets)
}

/// Extract `scheme://host[:port]` from a URL string.
///
/// Returns None for strings that don't parse as absolute URLs and for
/// URLs with an opaque origin (`data:`, `file:`, ...); neither can be a
/// forwarding destination.
fn parse_origin(entry: &str) -> Option<String> {
    let url = Url::parse(entry).ok()?;
    match url.origin() {
        origin @ url::Origin::Tuple(..) => Some(origin.ascii_serialization()),
        url::Origin::Opaque(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let targets =
            resolve_targets(Some("https://a,https://a/path,https://b")).unwrap();
        let origins: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
        assert_eq!(origins, vec!["https://a", "https://b"]);
    }

    #[test]
    fn test_port_is_part_of_origin() {
        let targets =
            resolve_targets(Some("http://a:8080,http://a:9090,http://a:8080/x")).unwrap();
        let origins: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
        assert_eq!(origins, vec!["http://a:8080", "http://a:9090"]);
    }

    #[test]
    fn test_missing_is_fatal() {
        assert!(matches!(
            resolve_targets(None),
            Err(StartupError::MissingTargetHosts)
        ));
        assert!(matches!(
            resolve_targets(Some("   ")),
            Err(StartupError::MissingTargetHosts)
        ));
    }

    #[test]
    fn test_all_invalid_is_fatal() {
        assert!(matches!(
            resolve_targets(Some("not a url,also-not-a-url")),
            Err(StartupError::NoValidOrigins { .. })
        ));
    }

    #[test]
    fn test_invalid_entries_are_skipped_not_fatal() {
        let targets = resolve_targets(Some("garbage,https://ok.example")).unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].as_str(), "https://ok.example");
    }

    #[test]
    fn test_path_and_query_are_stripped() {
        let targets = resolve_targets(Some("https://h.example/deep/path?q=1")).unwrap();
        assert_eq!(targets[0].as_str(), "https://h.example");
    }
}
