use axum::{
    Json,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const TOO_MANY_REQUESTS_MSG: &str =
    "Trop de requêtes. Veuillez réessayer dans quelques instants.";
pub const MISSING_FIELDS_MSG: &str = "Tous les champs requis doivent être remplis";
pub const MISSING_EMAIL_MSG: &str = "L'email est requis";
pub const INVALID_EMAIL_MSG: &str = "Format d'email invalide";
pub const INTERNAL_MSG: &str = "Une erreur s'est produite. Veuillez réessayer.";

pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";
pub const RESET_HEADER: &str = "x-ratelimit-reset";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rate limit exceeded until {reset_time}")]
    RateLimited { reset_time: i64 },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::RateLimited { reset_time } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": TOO_MANY_REQUESTS_MSG })),
                )
                    .into_response();
                let headers = response.headers_mut();
                headers.insert(REMAINING_HEADER, HeaderValue::from_static("0"));
                headers.insert(RESET_HEADER, HeaderValue::from(reset_time));
                response
            }
            ApiError::InvalidRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": msg }))).into_response()
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": INTERNAL_MSG })),
                )
                    .into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
