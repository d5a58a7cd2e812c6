use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{bad_body, enforce};
use crate::error::ApiResult;
use crate::metrics::{LEADS_ACCEPTED, REQUEST_TOTAL};
use crate::middleware::ClientId;
use crate::models::{LeadResponse, NewsletterRequest, text};
use crate::redact::email_digest;
use crate::state::AppState;

const ACCEPTED_MSG: &str = "Inscription réussie ! Vous recevrez bientôt nos actualités.";

pub async fn newsletter_handler(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientId>,
    payload: Result<Json<NewsletterRequest>, JsonRejection>,
) -> ApiResult<Json<LeadResponse>> {
    REQUEST_TOTAL.with_label_values(&["newsletter"]).inc();

    enforce(&state, "newsletter", client.as_str(), &state.policies.newsletter).await?;

    let Json(req) = payload.map_err(bad_body)?;
    req.validate()?;

    tracing::info!(
        client = client.as_str(),
        email = %email_digest(text(&req.email).unwrap_or_default()),
        "newsletter subscription"
    );
    LEADS_ACCEPTED.with_label_values(&["newsletter"]).inc();

    Ok(Json(LeadResponse::ok(ACCEPTED_MSG)))
}
