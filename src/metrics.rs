use lazy_static::lazy_static;
use prometheus::{
    Histogram, IntCounter, IntCounterVec, IntGauge, register_histogram, register_int_counter,
    register_int_counter_vec, register_int_gauge,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lead_gateway_requests_total",
        "Total number of intake requests by endpoint",
        &["endpoint"]
    )
    .unwrap();
    pub static ref LEADS_ACCEPTED: IntCounterVec = register_int_counter_vec!(
        "lead_gateway_leads_accepted_total",
        "Submissions that passed validation",
        &["endpoint"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_DECISIONS: IntCounterVec = register_int_counter_vec!(
        "lead_gateway_rate_limit_decisions_total",
        "Rate limiter decisions by policy and outcome",
        &["policy", "outcome"]
    )
    .unwrap();
    pub static ref RATE_LIMIT_STORE_SIZE: IntGauge = register_int_gauge!(
        "lead_gateway_rate_limit_entries",
        "Current number of identifiers tracked by the rate limiter"
    )
    .unwrap();
    pub static ref RATE_LIMIT_SWEPT: IntCounter = register_int_counter!(
        "lead_gateway_rate_limit_swept_total",
        "Expired rate limit windows removed by sweeps"
    )
    .unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "lead_gateway_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
}
