//! Configuration for the alias controller.

use std::time::Duration;

use alias_reconcile::DEFAULT_RECONCILE_INTERVAL;
use anyhow::{Context, Result};

/// Alias controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the Lambda API (or a signing proxy in front of it).
    pub lambda_endpoint: String,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,

    /// Interval between passes in watch mode.
    pub reconcile_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lambda_endpoint = lookup("ALIAS_LAMBDA_ENDPOINT")
            .unwrap_or_else(|| "http://127.0.0.1:4566".to_string());

        let log_level = lookup("ALIAS_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let request_timeout = match lookup("ALIAS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid ALIAS_REQUEST_TIMEOUT_SECS: {raw}"))?,
            ),
            None => Duration::from_secs(30),
        };

        let reconcile_interval = match lookup("ALIAS_RECONCILE_INTERVAL_SECS") {
            Some(raw) => Duration::from_secs(
                raw.parse()
                    .with_context(|| format!("invalid ALIAS_RECONCILE_INTERVAL_SECS: {raw}"))?,
            ),
            None => DEFAULT_RECONCILE_INTERVAL,
        };

        if reconcile_interval.is_zero() {
            anyhow::bail!("ALIAS_RECONCILE_INTERVAL_SECS must be greater than zero");
        }

        Ok(Self {
            lambda_endpoint,
            log_level,
            request_timeout,
            reconcile_interval,
        })
    }
}
