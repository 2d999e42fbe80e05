//! Configuration loader
//!
//! Reads settings from environment variables, falling back to defaults for
//! anything unset. A `.env` file in the working directory is honored.
//!
//! ## Environment Variables
//! - `LINEFORGE_RETRY_MAX_RETRIES`: Retries after the initial attempt
//! - `LINEFORGE_RETRY_BASE_DELAY_MS`: Delay before the first retry
//! - `LINEFORGE_RETRY_MAX_DELAY_MS`: Upper bound on any backoff delay
//! - `LINEFORGE_RETRY_BACKOFF_FACTOR`: Multiplier applied per attempt
//! - `LINEFORGE_RETRY_JITTER`: Whether to perturb delays (true/false)
//! - `LINEFORGE_BREAKER_FAILURE_THRESHOLD`: Failures before opening
//! - `LINEFORGE_BREAKER_RECOVERY_TIMEOUT_MS`: Cooldown before probing
//! - `LINEFORGE_BREAKER_HALF_OPEN_SUCCESSES`: Probe successes to close
//! - `LINEFORGE_UPSTREAM_ATTEMPT_TIMEOUT_MS`: Budget per remote attempt
//! - `LINEFORGE_UPSTREAM_SIMULATED_LATENCY_MS`: Simulator latency

use std::fmt;
use std::str::FromStr;

use lineforge_common::resilience::ConfigError;
use tracing::debug;

use super::{BreakerSettings, RetrySettings, Settings, UpstreamSettings};

/// Load settings from the environment, using defaults for unset variables.
///
/// # Errors
/// Returns `ConfigError::Invalid` when a variable is set but cannot be
/// parsed as the expected type.
pub fn load() -> Result<Settings, ConfigError> {
    // A missing .env file is not an error
    dotenvy::dotenv().ok();
    let settings = from_env()?;
    debug!(?settings, "configuration loaded");
    Ok(settings)
}

fn from_env() -> Result<Settings, ConfigError> {
    let retry_defaults = RetrySettings::default();
    let breaker_defaults = BreakerSettings::default();
    let upstream_defaults = UpstreamSettings::default();

    Ok(Settings {
        retry: RetrySettings {
            max_retries: env_parse("LINEFORGE_RETRY_MAX_RETRIES", retry_defaults.max_retries)?,
            base_delay_ms: env_parse(
                "LINEFORGE_RETRY_BASE_DELAY_MS",
                retry_defaults.base_delay_ms,
            )?,
            max_delay_ms: env_parse("LINEFORGE_RETRY_MAX_DELAY_MS", retry_defaults.max_delay_ms)?,
            backoff_factor: env_parse(
                "LINEFORGE_RETRY_BACKOFF_FACTOR",
                retry_defaults.backoff_factor,
            )?,
            jitter: env_parse("LINEFORGE_RETRY_JITTER", retry_defaults.jitter)?,
        },
        breaker: BreakerSettings {
            failure_threshold: env_parse(
                "LINEFORGE_BREAKER_FAILURE_THRESHOLD",
                breaker_defaults.failure_threshold,
            )?,
            recovery_timeout_ms: env_parse(
                "LINEFORGE_BREAKER_RECOVERY_TIMEOUT_MS",
                breaker_defaults.recovery_timeout_ms,
            )?,
            required_half_open_successes: env_parse(
                "LINEFORGE_BREAKER_HALF_OPEN_SUCCESSES",
                breaker_defaults.required_half_open_successes,
            )?,
        },
        upstream: UpstreamSettings {
            attempt_timeout_ms: env_parse(
                "LINEFORGE_UPSTREAM_ATTEMPT_TIMEOUT_MS",
                upstream_defaults.attempt_timeout_ms,
            )?,
            simulated_latency_ms: env_parse(
                "LINEFORGE_UPSTREAM_SIMULATED_LATENCY_MS",
                upstream_defaults.simulated_latency_ms,
            )?,
        },
    })
}

/// Parse an environment variable, returning the default when unset.
fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            message: format!("invalid value for {key}: {e}"),
        }),
        Err(_) => Ok(default),
    }
}
