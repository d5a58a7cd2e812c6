mod contact;
mod health;
mod metrics;
mod newsletter;
mod valuation;

pub use contact::contact_handler;
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use newsletter::newsletter_handler;
pub use valuation::valuation_handler;

use axum::extract::rejection::JsonRejection;

use crate::error::{ApiError, ApiResult, INTERNAL_MSG};
use crate::metrics::RATE_LIMIT_DECISIONS;
use crate::rate_limit::RateLimitPolicy;
use crate::state::AppState;

// Apply `policy` to `client` under its own key space. A failing store admits
// the request rather than locking every visitor out.
pub(crate) async fn enforce(
    state: &AppState,
    scope: &str,
    client: &str,
    policy: &RateLimitPolicy,
) -> ApiResult<()> {
    let key = format!("{scope}:{client}");

    let checked = state.limiter.check(&key, policy).await;
    if let Ok(decision) = &checked {
        let outcome = if decision.is_limited { "limited" } else { "admitted" };
        RATE_LIMIT_DECISIONS.with_label_values(&[scope, outcome]).inc();
    }

    match checked {
        Ok(decision) if decision.is_limited => {
            tracing::info!(scope, client, reset_time = decision.reset_time, "request rate limited");
            Err(ApiError::RateLimited {
                reset_time: decision.reset_time,
            })
        }
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::warn!(scope, error = %e, "rate limiter unavailable, admitting request");
            Ok(())
        }
    }
}

pub(crate) fn bad_body(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "unreadable request body");
    ApiError::InvalidRequest(INTERNAL_MSG.to_string())
}
