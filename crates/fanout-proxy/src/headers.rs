//! Outbound header filtering.

use std::collections::HashSet;

use axum::http::{HeaderMap, HeaderName};

/// Reverse-proxy artifacts that must never reach a target, allowlist or not.
const STRIPPED_HEADERS: &[&str] = &["host", "x-scheme", "x-forwarded-for", "x-forwarded-proto"];

/// Inbound header carrying the caller's address, as set by the fronting proxy.
const REAL_IP_HEADER: &str = "x-real-ip";

/// Header restated with the caller's address on outbound requests.
const FORWARDED_FOR_HEADER: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Explicit set of header names permitted to be forwarded.
///
/// Absence means "forward everything except the stripped set".
#[derive(Debug, Clone)]
pub struct HeaderAllowlist(HashSet<String>);

impl HeaderAllowlist {
    /// Parse a comma-separated name list. `None` or a blank value means no
    /// allowlist is configured.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let names: HashSet<String> = raw?
            .split(',')
            .map(|n| n.trim().to_ascii_lowercase())
            .filter(|n| !n.is_empty())
            .collect();
        if names.is_empty() {
            None
        } else {
            Some(Self(names))
        }
    }

    fn contains(&self, name: &HeaderName) -> bool {
        // HeaderName is already lowercase, so a set lookup is case-insensitive.
        self.0.contains(name.as_str())
    }
}

/// Derive the outbound header set from the inbound one.
///
/// The reverse-proxy artifacts in [`STRIPPED_HEADERS`] are always removed.
/// With an allowlist, only listed names survive. Without one, every remaining
/// header is forwarded and the caller's address (taken from `x-real-ip`, if
/// present) is restated as `x-forwarded-for`.
pub fn filter_headers(inbound: &HeaderMap, allowlist: Option<&HeaderAllowlist>) -> HeaderMap {
    let mut outbound = HeaderMap::new();
    for (name, value) in inbound.iter() {
        if STRIPPED_HEADERS.contains(&name.as_str()) {
            continue;
        }
        if let Some(list) = allowlist {
            if !list.contains(name) {
                continue;
            }
        }
        outbound.append(name.clone(), value.clone());
    }

    if allowlist.is_none() {
        if let Some(real_ip) = inbound.get(REAL_IP_HEADER) {
            outbound.insert(FORWARDED_FOR_HEADER, real_ip.clone());
        }
    }

    outbound
}
