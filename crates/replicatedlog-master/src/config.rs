//! Master process configuration.
//!
//! Mirrors `original_source/master/master.py`'s module-level environment
//! reads (`RETRY_BASE_DELAY`, `RETRY_MAX_DELAY`, `MASTER_WAIT_TIMEOUT`)
//! but parses them once into a typed, validated struct instead of reading
//! `os.getenv` ad hoc at call sites, and layers a `clap` CLI over it the
//! way `axum-resilient-kv-store` layers `clap` over its binary.

use std::time::Duration;

use clap::Parser;
use replicatedlog_core::ConfigError;

/// Command-line / environment configuration for the master process.
#[derive(Debug, Clone, Parser)]
#[command(name = "master", about = "Replicated log master")]
pub struct MasterConfig {
    /// Port to bind the HTTP server on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Base URL of a secondary replica. Repeat for multiple secondaries.
    #[arg(long = "secondary", env = "SECONDARIES", value_delimiter = ',')]
    pub secondaries: Vec<String>,

    /// Initial per-secondary retry delay, in seconds.
    #[arg(long, env = "RETRY_BASE_DELAY", default_value_t = 0.5)]
    pub retry_base_delay_secs: f64,

    /// Maximum per-secondary retry delay, in seconds.
    #[arg(long, env = "RETRY_MAX_DELAY", default_value_t = 5.0)]
    pub retry_max_delay_secs: f64,

    /// Maximum time the master waits for the requested ack count before
    /// responding 202. `0` means wait indefinitely.
    #[arg(long, env = "MASTER_WAIT_TIMEOUT", default_value_t = 0.0)]
    pub master_wait_timeout_secs: f64,
}

impl MasterConfig {
    /// Validates the parsed configuration, converting seconds fields into
    /// [`Duration`]s.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if self.secondaries.is_empty() {
            return Err(ConfigError::NoSecondaries);
        }
        if self.retry_base_delay_secs <= 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "RETRY_BASE_DELAY",
                value: self.retry_base_delay_secs.to_string(),
                reason: "must be positive".into(),
            });
        }
        if self.retry_max_delay_secs < self.retry_base_delay_secs {
            return Err(ConfigError::InvalidValue {
                name: "RETRY_MAX_DELAY",
                value: self.retry_max_delay_secs.to_string(),
                reason: "must be >= RETRY_BASE_DELAY".into(),
            });
        }
        if self.master_wait_timeout_secs < 0.0 {
            return Err(ConfigError::InvalidValue {
                name: "MASTER_WAIT_TIMEOUT",
                value: self.master_wait_timeout_secs.to_string(),
                reason: "must be >= 0".into(),
            });
        }

        Ok(ValidatedConfig {
            port: self.port,
            secondaries: self.secondaries.clone(),
            retry_base_delay: Duration::from_secs_f64(self.retry_base_delay_secs),
            retry_max_delay: Duration::from_secs_f64(self.retry_max_delay_secs),
            master_wait_timeout: if self.master_wait_timeout_secs == 0.0 {
                None
            } else {
                Some(Duration::from_secs_f64(self.master_wait_timeout_secs))
            },
        })
    }
}

/// Configuration after validation, with seconds converted to [`Duration`]
/// and invariants checked.
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub port: u16,
    pub secondaries: Vec<String>,
    pub retry_base_delay: Duration,
    pub retry_max_delay: Duration,
    /// `None` means wait indefinitely for the requested ack count.
    pub master_wait_timeout: Option<Duration>,
}
