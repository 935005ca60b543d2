//! The master's local append-only log.

use std::sync::Mutex;

use replicatedlog_core::Message;

struct Inner {
    next_id: u64,
    messages: Vec<Message>,
}

/// Appends-with-id-assignment local log.
///
/// Id allocation and append happen under the same lock, so the sequence
/// is always a dense prefix `[1..next_id-1]` (I2) without needing a
/// reordering pass later (spec.md §4.1 rationale).
pub struct MasterLog {
    inner: Mutex<Inner>,
}

impl MasterLog {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                messages: Vec::new(),
            }),
        }
    }

    /// Allocates the next id and appends `text` as a new message.
    pub fn append(&self, text: String) -> Message {
        let mut inner = self.inner.lock().expect("master log mutex poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        let msg = Message { id, text };
        inner.messages.push(msg.clone());
        msg
    }

    /// Returns a consistent, id-sorted copy of the log.
    ///
    /// Append always assigns ids densely and in order, so the stored
    /// vector is already sorted; no re-sort is needed here (unlike
    /// `original_source/master/master.py`, which re-sorts on every
    /// append and every read).
    pub fn snapshot(&self) -> Vec<Message> {
        self.inner.lock().expect("master log mutex poisoned").messages.clone()
    }
}

impl Default for MasterLog {
    fn default() -> Self {
        Self::new()
    }
}
