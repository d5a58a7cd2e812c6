use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use crate::client_ip::client_identifier;
use crate::error::ApiResult;
use crate::handlers::enforce;
use crate::metrics::REQUEST_LATENCY;
use crate::state::AppState;

/// Rate limit identifier of the caller, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Identify the caller, apply the generic `api` policy, then hand over
pub async fn throttle_api(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> ApiResult<Response> {
    let start_time = Instant::now();

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client = client_identifier(req.headers(), peer, &state.forwarded_trust);

    enforce(&state, "api", &client, &state.policies.api).await?;

    req.extensions_mut().insert(ClientId(client));
    let response = next.run(req).await;

    REQUEST_LATENCY.observe(start_time.elapsed().as_secs_f64());
    Ok(response)
}
