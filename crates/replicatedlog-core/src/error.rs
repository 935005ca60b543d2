//! Shared error and configuration-parsing types for both processes.

use std::fmt;

/// Errors parsing process configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value {value:?}: {reason}")]
    InvalidValue {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("no secondary URLs configured; pass at least one --secondary")]
    NoSecondaries,
}

/// A field missing or malformed in a request body.
///
/// Returned by both the master and the secondary's axum extractors on a
/// bad `POST` body; not part of the core replication invariants, just an
/// HTTP-layer detail (spec.md §7 leaves this to the implementer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadRequest(pub String);

impl fmt::Display for BadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for BadRequest {}

impl BadRequest {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
