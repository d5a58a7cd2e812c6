use crate::client_ip::ForwardedTrust;
use crate::rate_limit::{Policies, RateLimiter};

// app's shared state

pub struct AppState {
    pub limiter: RateLimiter,
    pub policies: Policies,
    pub forwarded_trust: ForwardedTrust, // who may set x-forwarded-for
}

impl AppState {
    pub fn new(limiter: RateLimiter, policies: Policies, forwarded_trust: ForwardedTrust) -> Self {
        Self {
            limiter,
            policies,
            forwarded_trust,
        }
    }
}
