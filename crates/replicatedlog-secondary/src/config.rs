//! Secondary process configuration.
//!
//! Mirrors `original_source/secondary/secondary.py`'s `REPLICA_DELAY`,
//! `MASTER_URL`, and `SECONDARY_URL` environment reads, plus
//! `ERROR_RATE` from spec.md §6's configuration table (the fault
//! injection hook the original doesn't have, added by the
//! specification — spec.md §9 "Fault-injection hooks").

use std::time::Duration;

use clap::Parser;
use replicatedlog_core::ConfigError;

#[derive(Debug, Clone, Parser)]
#[command(name = "secondary", about = "Replicated log secondary")]
pub struct SecondaryConfig {
    /// Port to bind the HTTP server on.
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Seconds to sleep after receiving a `/replicate` call, before
    /// touching state. Used to exercise eventual-consistency tests.
    #[arg(long, env = "REPLICA_DELAY", default_value_t = 0)]
    pub replica_delay_secs: u64,

    /// Probability (0..1) of returning HTTP 500 from `/replicate` after
    /// the message has already been applied locally.
    #[arg(long, env = "ERROR_RATE", default_value_t = 0.0)]
    pub error_rate: f64,

    /// Base URL of the master, used for the startup catch-up request.
    #[arg(long, env = "MASTER_URL")]
    pub master_url: Option<String>,

    /// This secondary's own base URL, as the master knows it. Required
    /// for the startup catch-up request to identify which worker queue
    /// to replay.
    #[arg(long, env = "SECONDARY_URL")]
    pub secondary_url: Option<String>,
}

impl SecondaryConfig {
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ConfigError::InvalidValue {
                name: "ERROR_RATE",
                value: self.error_rate.to_string(),
                reason: "must be between 0 and 1".into(),
            });
        }

        Ok(ValidatedConfig {
            port: self.port,
            replica_delay: Duration::from_secs(self.replica_delay_secs),
            error_rate: self.error_rate,
            master_url: self.master_url.clone(),
            secondary_url: self.secondary_url.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub port: u16,
    pub replica_delay: Duration,
    pub error_rate: f64,
    pub master_url: Option<String>,
    pub secondary_url: Option<String>,
}
