use anyhow::Context;
use clap::Parser; // for cli
use lead_gateway::config::Args;
use lead_gateway::client_ip::ForwardedTrust;
use lead_gateway::rate_limit::{RateLimiter, sweeper};
use lead_gateway::server::build_router;
use lead_gateway::state::AppState;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("lead_gateway=info".parse()?))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let policies = args.rate_limit_policies()?;
    let forwarded_trust = args.forwarded_trust()?;

    if forwarded_trust == ForwardedTrust::Any {
        tracing::warn!(
            "no trusted proxies configured, clients can choose their own rate limit identity \
             through x-forwarded-for"
        );
    }

    let limiter = RateLimiter::in_memory().with_sweep_threshold(args.sweep_threshold);

    // spawn the background sweep
    if args.sweep_interval_secs > 0 {
        let sweep_limiter = limiter.clone();
        let sweep_interval = Duration::from_secs(args.sweep_interval_secs);
        tokio::spawn(async move {
            sweeper(sweep_limiter, sweep_interval).await;
        });
    }

    let state = Arc::new(AppState::new(limiter, policies, forwarded_trust));
    let app = build_router(state);

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "lead gateway listening");
    tracing::info!(
        contact = ?policies.contact,
        newsletter = ?policies.newsletter,
        valuation = ?policies.valuation,
        api = ?policies.api,
        "rate limit policies"
    );

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;
    Ok(())
}
