//! The secondary's gap-free, in-order delivery log.
//!
//! `original_source/secondary/secondary.py` has no reorder buffer: it
//! appends an arriving message unconditionally (after a dedup check)
//! and re-sorts the whole list. spec.md §4.6 specifies the stronger
//! design implemented here — a `pending` map holds not-yet-deliverable
//! messages until their predecessors arrive, so `delivered` is always a
//! gap-free prefix `[1..next_expected_id-1]` with no trailing sort pass
//! needed.

use std::collections::BTreeMap;
use std::sync::Mutex;

use replicatedlog_core::Message;

/// What happened to an arriving message, for logging at the call site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Delivered in order; `delivered` advanced (possibly draining some
    /// of `pending` too).
    Delivered,
    /// Already in `delivered`; state unchanged.
    DuplicateDelivered,
    /// Already buffered in `pending` with identical content; the
    /// buffered copy was refreshed (a no-op for identical content, but
    /// tolerates a retried call with the same id).
    DuplicatePending,
    /// `id < next_expected_id` but not in `delivered` — should not occur
    /// if invariants hold; logged and ignored.
    Stale,
    /// `id > next_expected_id`; buffered in `pending` awaiting its
    /// predecessors.
    Buffered,
}

struct Inner {
    delivered: Vec<Message>,
    pending: BTreeMap<u64, Message>,
    next_expected_id: u64,
}

/// In-order buffered log with dedup and reorder buffer.
pub struct SecondaryLog {
    inner: Mutex<Inner>,
}

impl SecondaryLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                delivered: Vec::new(),
                pending: BTreeMap::new(),
                next_expected_id: 1,
            }),
        }
    }

    /// Applies an arriving `/replicate` call, dispatching on `msg.id` vs.
    /// `next_expected_id` per spec.md §4.6 step 2.
    pub fn apply(&self, msg: Message) -> ApplyOutcome {
        let mut inner = self.inner.lock().expect("secondary log mutex poisoned");

        if inner.delivered.iter().any(|m| m.id == msg.id) {
            return ApplyOutcome::DuplicateDelivered;
        }
        if inner.pending.contains_key(&msg.id) {
            inner.pending.insert(msg.id, msg);
            return ApplyOutcome::DuplicatePending;
        }
        if msg.id < inner.next_expected_id {
            return ApplyOutcome::Stale;
        }
        if msg.id > inner.next_expected_id {
            inner.pending.insert(msg.id, msg);
            return ApplyOutcome::Buffered;
        }

        // msg.id == next_expected_id
        inner.delivered.push(msg);
        inner.next_expected_id += 1;
        while let Some(next) = inner.pending.remove(&inner.next_expected_id) {
            inner.delivered.push(next);
            inner.next_expected_id += 1;
        }
        ApplyOutcome::Delivered
    }

    /// Returns a consistent, id-sorted copy of `delivered`. `pending` is
    /// deliberately not exposed (spec.md §4.7).
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner.lock().expect("secondary log mutex poisoned").delivered.clone()
    }
}

impl Default for SecondaryLog {
    fn default() -> Self {
        Self::new()
    }
}
