//! fanout-proxy: replicates each inbound HTTP request to a configured set of
//! target origins and reconciles their outcomes into a single response.

mod config;
mod error;
mod headers;
mod policy;
mod proxy;
mod server;
mod targets;

use config::ProxyConfig;
use headers::HeaderAllowlist;
use policy::ResponsePolicy;
use proxy::fanout::FanoutDispatcher;
use server::AppState;

fn main() -> anyhow::Result<()> {
    // Load configuration from the environment
    let config = ProxyConfig::load()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        fanout_tracing::init_tracing(&config.tracing());

        tracing::info!(
            port = config.port,
            target_hosts = ?config.target_hosts,
            response = %config.response,
            returns_success_first = config.returns_success_first,
            forwarded_header = ?config.forwarded_header,
            cors_origin = ?config.cors_origin,
            "Starting fanout-proxy"
        );

        run(config).await
    })
}

async fn run(config: ProxyConfig) -> anyhow::Result<()> {
    // Zero forwarding targets is fatal: refuse to start serving
    let targets = targets::resolve_targets(config.target_hosts.as_deref())?;
    tracing::info!(targets = ?targets, "Resolved forward targets");

    // No explicit timeout on the outbound client: each attempt runs to the
    // transport's own natural completion.
    let client = reqwest::Client::builder().build()?;

    let state = AppState {
        dispatcher: FanoutDispatcher::new(client, targets),
        policy: ResponsePolicy::resolve(&config.response, config.returns_success_first),
        allowlist: HeaderAllowlist::parse(config.forwarded_header.as_deref()),
    };

    server::run(&config, state).await
}
