use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{bad_body, enforce};
use crate::error::ApiResult;
use crate::metrics::{LEADS_ACCEPTED, REQUEST_TOTAL};
use crate::middleware::ClientId;
use crate::models::{ContactRequest, LeadResponse, text};
use crate::redact::email_digest;
use crate::state::AppState;

const ACCEPTED_MSG: &str =
    "Votre message a bien été envoyé. Nous vous recontacterons rapidement.";

pub async fn contact_handler(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientId>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> ApiResult<Json<LeadResponse>> {
    REQUEST_TOTAL.with_label_values(&["contact"]).inc();

    // throttle before touching the body
    enforce(&state, "contact", client.as_str(), &state.policies.contact).await?;

    let Json(req) = payload.map_err(bad_body)?;
    req.validate()?;

    tracing::info!(
        client = client.as_str(),
        email = %email_digest(text(&req.email).unwrap_or_default()),
        company = text(&req.company).unwrap_or("-"),
        message_len = text(&req.message).map_or(0, str::len),
        "contact form submission"
    );
    LEADS_ACCEPTED.with_label_values(&["contact"]).inc();

    Ok(Json(LeadResponse::ok(ACCEPTED_MSG)))
}
