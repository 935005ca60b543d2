//! Worker health tracking, reported over `GET /health`.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Coarse health state for one secondary's replication worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Suspected,
    Unhealthy,
}

/// A point-in-time copy of a worker's health, safe to hand out without
/// holding the worker's internal lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: HealthState,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success_ts: Option<f64>,
}

impl Default for HealthSnapshot {
    fn default() -> Self {
        Self {
            status: HealthState::Healthy,
            consecutive_failures: 0,
            last_error: None,
            last_success_ts: None,
        }
    }
}

impl HealthSnapshot {
    /// Applies a successful delivery: resets the failure streak and
    /// records the current time.
    pub fn record_success(&mut self) {
        self.status = HealthState::Healthy;
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_success_ts = Some(unix_time_secs());
    }

    /// Applies a failed delivery attempt, advancing the health state
    /// machine: `>= 3` consecutive failures is unhealthy, otherwise
    /// suspected.
    pub fn record_failure(&mut self, error: impl Into<String>) {
        self.consecutive_failures += 1;
        self.last_error = Some(error.into());
        self.status = if self.consecutive_failures >= 3 {
            HealthState::Unhealthy
        } else {
            HealthState::Suspected
        };
    }
}

fn unix_time_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
