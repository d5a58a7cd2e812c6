use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use std::sync::Arc;

use super::{bad_body, enforce};
use crate::error::ApiResult;
use crate::metrics::{LEADS_ACCEPTED, REQUEST_TOTAL};
use crate::middleware::ClientId;
use crate::models::{LeadResponse, ValuationRequest, text};
use crate::redact::email_digest;
use crate::state::AppState;

const ACCEPTED_MSG: &str = "Votre demande a bien été prise en compte. \
     Vous recevrez votre analyse détaillée sous 24h.";

pub async fn valuation_handler(
    State(state): State<Arc<AppState>>,
    Extension(client): Extension<ClientId>,
    payload: Result<Json<ValuationRequest>, JsonRejection>,
) -> ApiResult<Json<LeadResponse>> {
    REQUEST_TOTAL.with_label_values(&["valuation"]).inc();

    enforce(&state, "valuation", client.as_str(), &state.policies.valuation).await?;

    let Json(req) = payload.map_err(bad_body)?;
    req.validate()?;

    tracing::info!(
        client = client.as_str(),
        email = %email_digest(text(&req.email).unwrap_or_default()),
        company = text(&req.company).unwrap_or("-"),
        sector = ?req.sector,
        revenue = ?req.revenue,
        ebitda = ?req.ebitda,
        "valuation lead captured"
    );
    LEADS_ACCEPTED.with_label_values(&["valuation"]).inc();

    Ok(Json(LeadResponse::ok(ACCEPTED_MSG)))
}
