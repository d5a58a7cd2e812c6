use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, INVALID_EMAIL_MSG, MISSING_EMAIL_MSG, MISSING_FIELDS_MSG};

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
}

// Contact form body - fields stay loose JSON, validation decides what counts as filled
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub first_name: Option<Value>,
    pub last_name: Option<Value>,
    pub email: Option<Value>,
    pub company: Option<Value>,
    pub message: Option<Value>,
}

// Newsletter signup body
#[derive(Deserialize, Debug, Default)]
pub struct NewsletterRequest {
    pub email: Option<Value>,
}

// Valuation lead body - figures come from the calculator as numbers or strings
#[derive(Deserialize, Debug, Default)]
pub struct ValuationRequest {
    pub revenue: Option<Value>,
    pub ebitda: Option<Value>,
    pub sector: Option<Value>,
    pub email: Option<Value>,
    pub company: Option<Value>,
    pub result: Option<Value>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct LeadResponse {
    pub success: bool,
    pub message: String,
}

impl LeadResponse {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
        }
    }
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// string content of a field, if it is a string
pub fn text(field: &Option<Value>) -> Option<&str> {
    field.as_ref().and_then(Value::as_str)
}

// null, false, 0 and "" count as missing
fn truthy(field: &Option<Value>) -> bool {
    match field {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

// a filled email that is not a string can never match the pattern
fn check_email(email: &Option<Value>) -> Result<(), ApiError> {
    if text(email).is_some_and(is_valid_email) {
        Ok(())
    } else {
        Err(ApiError::InvalidRequest(INVALID_EMAIL_MSG.to_string()))
    }
}

fn missing_fields() -> ApiError {
    ApiError::InvalidRequest(MISSING_FIELDS_MSG.to_string())
}

impl ContactRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [&self.first_name, &self.last_name, &self.email, &self.message];
        if !required.into_iter().all(truthy) {
            return Err(missing_fields());
        }
        check_email(&self.email)
    }
}

impl NewsletterRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if !truthy(&self.email) {
            return Err(ApiError::InvalidRequest(MISSING_EMAIL_MSG.to_string()));
        }
        check_email(&self.email)
    }
}

impl ValuationRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [&self.revenue, &self.ebitda, &self.sector, &self.email, &self.result];
        if !required.into_iter().all(truthy) {
            return Err(missing_fields());
        }
        check_email(&self.email)
    }
}
