use clap::Parser;
use thiserror::Error;

use crate::client_ip::ForwardedTrust;
use crate::rate_limit::{DEFAULT_SWEEP_THRESHOLD, Policies, PolicyError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("invalid trusted proxy address in '{0}'")]
    InvalidProxy(String),
}

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "lead-gateway")]
#[command(about = "Rate-limited intake endpoints for contact, newsletter and valuation leads")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "LEAD_GATEWAY_PORT", default_value_t = 8080)]
    pub port: u16,

    // Address to bind
    #[arg(long, env = "LEAD_GATEWAY_HOST", default_value = "0.0.0.0")]
    pub host: String,

    // Policy override, repeatable: --policy contact=5/60000
    #[arg(long = "policy", value_name = "NAME=MAX/WINDOW_MS")]
    pub policies: Vec<String>,

    // Store size that triggers an inline sweep
    #[arg(long, env = "LEAD_GATEWAY_SWEEP_THRESHOLD", default_value_t = DEFAULT_SWEEP_THRESHOLD)]
    pub sweep_threshold: usize,

    // Background sweep interval in seconds, 0 disables it
    #[arg(long, env = "LEAD_GATEWAY_SWEEP_INTERVAL", default_value_t = 60)]
    pub sweep_interval_secs: u64,

    // Comma-separated reverse proxies allowed to set x-forwarded-for / x-real-ip.
    // Empty trusts every peer.
    #[arg(long, env = "LEAD_GATEWAY_TRUSTED_PROXIES", default_value = "")]
    pub trusted_proxies: String,
}

impl Args {
    pub fn rate_limit_policies(&self) -> Result<Policies, ConfigError> {
        let mut policies = Policies::default();
        for spec in &self.policies {
            policies.apply_override(spec)?;
        }
        Ok(policies)
    }

    pub fn forwarded_trust(&self) -> Result<ForwardedTrust, ConfigError> {
        ForwardedTrust::parse(&self.trusted_proxies)
            .map_err(|_| ConfigError::InvalidProxy(self.trusted_proxies.clone()))
    }
}
