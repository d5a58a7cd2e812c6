use thiserror::Error;

const ONE_MINUTE_MS: u64 = 60 * 1000;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy '{0}' must allow at least one request per window")]
    ZeroMaxRequests(String),

    #[error("policy '{0}' must have a window longer than 0 ms")]
    ZeroWindow(String),

    #[error("unknown rate limit policy: {0}")]
    UnknownPolicy(String),

    #[error("malformed policy override '{0}', expected name=max/window_ms")]
    Malformed(String),
}

/// How many requests one identifier may make per fixed window.
///
/// Both values are guaranteed non-zero; construct through [`RateLimitPolicy::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: u32,
    window_ms: u64,
}

impl RateLimitPolicy {
    pub const DEFAULT: RateLimitPolicy = RateLimitPolicy::fixed(10, ONE_MINUTE_MS);
    pub const CONTACT: RateLimitPolicy = RateLimitPolicy::fixed(5, ONE_MINUTE_MS);
    pub const NEWSLETTER: RateLimitPolicy = RateLimitPolicy::fixed(3, ONE_MINUTE_MS);
    pub const VALUATION: RateLimitPolicy = RateLimitPolicy::DEFAULT;
    pub const API: RateLimitPolicy = RateLimitPolicy::fixed(100, ONE_MINUTE_MS);

    // only for the constants above, values are checked by hand
    const fn fixed(max_requests: u32, window_ms: u64) -> Self {
        Self {
            max_requests,
            window_ms,
        }
    }

    pub fn new(max_requests: u32, window_ms: u64) -> Result<Self, PolicyError> {
        Self::named("custom", max_requests, window_ms)
    }

    fn named(name: &str, max_requests: u32, window_ms: u64) -> Result<Self, PolicyError> {
        if max_requests == 0 {
            return Err(PolicyError::ZeroMaxRequests(name.to_string()));
        }
        if window_ms == 0 {
            return Err(PolicyError::ZeroWindow(name.to_string()));
        }
        Ok(Self {
            max_requests,
            window_ms,
        })
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policies {
    pub contact: RateLimitPolicy,
    pub newsletter: RateLimitPolicy,
    pub valuation: RateLimitPolicy,
    pub api: RateLimitPolicy,
}

impl Default for Policies {
    fn default() -> Self {
        Self {
            contact: RateLimitPolicy::CONTACT,
            newsletter: RateLimitPolicy::NEWSLETTER,
            valuation: RateLimitPolicy::VALUATION,
            api: RateLimitPolicy::API,
        }
    }
}

impl Policies {
    // Apply one "name=max/window_ms" override, e.g. "contact=10/30000"
    pub fn apply_override(&mut self, spec: &str) -> Result<(), PolicyError> {
        let malformed = || PolicyError::Malformed(spec.to_string());

        let (name, limits) = spec.split_once('=').ok_or_else(malformed)?;
        let (max, window) = limits.split_once('/').ok_or_else(malformed)?;
        let name = name.trim();
        let max: u32 = max.trim().parse().map_err(|_| malformed())?;
        let window: u64 = window.trim().parse().map_err(|_| malformed())?;

        let policy = RateLimitPolicy::named(name, max, window)?;
        let slot = match name {
            "contact" => &mut self.contact,
            "newsletter" => &mut self.newsletter,
            "valuation" => &mut self.valuation,
            "api" => &mut self.api,
            other => return Err(PolicyError::UnknownPolicy(other.to_string())),
        };
        *slot = policy;
        Ok(())
    }
}
