use tokio::time::{Duration, interval};

use super::RateLimiter;

// Background sweep - drops expired windows off the request path
pub async fn sweeper(limiter: RateLimiter, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(interval = ?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        if let Err(e) = limiter.sweep().await {
            tracing::warn!(error = %e, "rate limit sweep failed");
        }
    }
}
