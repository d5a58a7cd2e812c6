use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::handlers::{
    contact_handler, health_handler, metrics_handler, newsletter_handler, valuation_handler,
};
use crate::middleware::throttle_api;
use crate::state::AppState;

// Public routes plus the throttled /api intake routes
pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/contact", post(contact_handler))
        .route("/newsletter", post(newsletter_handler))
        .route("/valuation", post(valuation_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), throttle_api));

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .nest("/api", api)
        .with_state(state)
}
