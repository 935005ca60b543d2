//! The wire record replicated from the master to every secondary.

use serde::{Deserialize, Serialize};

/// A single append-only log record.
///
/// `id` is assigned by the master, is unique, and increases by exactly 1
/// starting at 1. `text` is opaque application payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub text: String,
}

/// The client-requested write concern from `POST /message`.
///
/// `None` means "wait for every configured replica" (`w == N`). Present as
/// its own type, rather than a bare `Option<u32>`, so the clamping rule in
/// [`WriteConcern::effective`] has one home instead of being reimplemented
/// at every call site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteConcern(pub Option<u32>);

impl WriteConcern {
    /// Resolves the requested `w` against the total replica count `n`
    /// (master + secondaries), clamping into `[1, n]`.
    ///
    /// Returns the effective `w` and whether the request was out of range
    /// (the caller logs a warning in that case; the value is never
    /// rejected).
    pub fn effective(self, n: u32) -> (u32, bool) {
        match self.0 {
            None => (n, false),
            Some(requested) => {
                let clamped = requested.clamp(1, n);
                (clamped, requested > n)
            }
        }
    }
}
