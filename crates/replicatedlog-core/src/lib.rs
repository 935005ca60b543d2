//! Core infrastructure shared by the replicated-log master and secondary.
//!
//! This crate provides the pieces both processes need and neither owns
//! alone:
//! - the wire [`Message`] type and write-concern parsing
//! - [`AckFuture`], a one-shot multi-waiter completion signal
//! - jittered exponential backoff for the replication retry loop
//! - worker health tracking
//! - shared configuration-parsing errors

pub mod ack;
pub mod backoff;
pub mod error;
pub mod health;
pub mod message;

pub use ack::AckFuture;
pub use backoff::ReplicationBackoff;
pub use error::{BadRequest, ConfigError};
pub use health::{HealthSnapshot, HealthState};
pub use message::{Message, WriteConcern};
