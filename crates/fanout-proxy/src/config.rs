//! Configuration types and loading logic.

use fanout_tracing::TracingConfig;
use figment::providers::Env;
use figment::Figment;
use serde::Deserialize;

/// Environment variables the forwarder reads.
const ENV_KEYS: &[&str] = &[
    "PORT",
    "CORS_ORIGIN",
    "TARGET_HOSTS",
    "RESPONSE",
    "RETURNS_SUCCESS_FIRST",
    "FORWARDED_HEADER",
    "LOG_LEVEL",
    "LOG_JSON",
];

/// Process-wide configuration, read once at startup and immutable thereafter.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// If set, enables cross-origin handling for this origin on every route.
    #[serde(default)]
    pub cors_origin: Option<String>,

    /// Comma-separated list of target URLs to fan out to.
    #[serde(default)]
    pub target_hosts: Option<String>,

    /// Response selection mode: "400", "404", "500", "503", "await-fwd",
    /// or anything else for the implicit 200 default.
    #[serde(default)]
    pub response: String,

    /// Under "await-fwd", prefer the first 200 over the first non-200.
    #[serde(default)]
    pub returns_success_first: bool,

    /// Comma-separated allowlist of header names to forward.
    #[serde(default)]
    pub forwarded_header: Option<String>,

    /// Log level filter (e.g. "info", "fanout_proxy=debug,info").
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit JSON log lines.
    #[serde(default)]
    pub log_json: bool,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ProxyConfig {
    /// Load configuration from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let config: ProxyConfig = Figment::new()
            .merge(Env::raw().only(ENV_KEYS))
            .extract()?;
        Ok(config)
    }

    /// Subscriber configuration for [`fanout_tracing::init_tracing`].
    pub fn tracing(&self) -> TracingConfig {
        TracingConfig {
            log_level: self.log_level.clone(),
            json: self.log_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = ProxyConfig::load().unwrap();
            assert_eq!(config.port, 3000);
            assert_eq!(config.cors_origin, None);
            assert_eq!(config.target_hosts, None);
            assert_eq!(config.response, "");
            assert!(!config.returns_success_first);
            assert_eq!(config.forwarded_header, None);
            assert_eq!(config.log_level, "info");
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("PORT", "8080");
            jail.set_env("TARGET_HOSTS", "https://a,https://b");
            jail.set_env("RESPONSE", "await-fwd");
            jail.set_env("RETURNS_SUCCESS_FIRST", "true");
            jail.set_env("FORWARDED_HEADER", "x-api-key,authorization");
            jail.set_env("CORS_ORIGIN", "https://ui.example");

            let config = ProxyConfig::load().unwrap();
            assert_eq!(config.port, 8080);
            assert_eq!(config.target_hosts.as_deref(), Some("https://a,https://b"));
            assert_eq!(config.response, "await-fwd");
            assert!(config.returns_success_first);
            assert_eq!(
                config.forwarded_header.as_deref(),
                Some("x-api-key,authorization")
            );
            assert_eq!(config.cors_origin.as_deref(), Some("https://ui.example"));
            Ok(())
        });
    }
}
