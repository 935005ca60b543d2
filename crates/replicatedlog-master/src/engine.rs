//! `ReplicationEngine`: the single owned value the HTTP layer adapts.
//!
//! Per spec.md §9 "Global-state replacement": the master is packaged as
//! one value owning the log, the secondary workers, and configuration,
//! with the axum router as a thin adapter over it — no process-wide
//! mutable singletons.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use replicatedlog_core::{HealthSnapshot, Message, WriteConcern};
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::ValidatedConfig;
use crate::log::MasterLog;
use crate::worker::SecondaryWorker;

/// Outcome of `POST /message`, already decided by ack count vs. `w`.
pub struct WriteOutcome {
    pub message: Message,
    pub acks: u32,
    pub met_write_concern: bool,
}

pub struct ReplicationEngine {
    log: MasterLog,
    workers: Vec<Arc<SecondaryWorker>>,
    master_wait_timeout: Option<Duration>,
}

impl ReplicationEngine {
    pub fn new(config: &ValidatedConfig) -> Self {
        let workers = config
            .secondaries
            .iter()
            .map(|url| SecondaryWorker::spawn(url.clone(), config.retry_base_delay, config.retry_max_delay))
            .collect();

        Self {
            log: MasterLog::new(),
            workers,
            master_wait_timeout: config.master_wait_timeout,
        }
    }

    /// Total replica count: master plus every configured secondary.
    pub fn total_replicas(&self) -> u32 {
        self.workers.len() as u32 + 1
    }

    /// `POST /message`: append locally, fan out to every secondary, and
    /// wait for the effective write concern (spec.md §4.3).
    pub async fn write(&self, text: String, requested_w: WriteConcern) -> WriteOutcome {
        let message = self.log.append(text);

        let n = self.total_replicas();
        let (w, out_of_range) = requested_w.effective(n);
        if out_of_range {
            warn!(requested = ?requested_w.0, n, "write concern exceeds replica count, clamping");
        }

        // Capacity >= producers so workers never block sending an ack
        // after the handler has stopped reading (spec.md §9).
        let (tx, mut rx) = mpsc::channel(self.workers.len().max(1));
        for worker in &self.workers {
            worker.enqueue(message.clone(), Some(tx.clone()));
        }
        drop(tx);

        let mut acks: u32 = 1; // the master itself counts as one ack
        if w > 1 {
            let needed = w - 1;
            let mut collected = 0u32;

            let collect = async {
                while collected < needed {
                    match rx.recv().await {
                        Some(_ack) => collected += 1,
                        None => break, // all workers' senders dropped
                    }
                }
            };

            match self.master_wait_timeout {
                Some(timeout) => {
                    let _ = tokio::time::timeout(timeout, collect).await;
                }
                None => collect.await,
            }
            acks += collected;
        }

        WriteOutcome {
            message,
            acks,
            met_write_concern: acks >= w,
        }
    }

    /// `GET /messages`: a consistent, id-sorted snapshot of the master log.
    pub fn snapshot(&self) -> Vec<Message> {
        self.log.snapshot()
    }

    /// `POST /pending`: replay the full log onto the named secondary's
    /// queue with no ack-sink. Duplicates are tolerated by that
    /// secondary's dedup.
    pub fn request_pending(&self, url: &str) -> bool {
        let Some(worker) = self.workers.iter().find(|w| w.url() == url) else {
            return false;
        };
        for message in self.log.snapshot() {
            worker.enqueue(message, None);
        }
        true
    }

    /// `GET /health`: current health of every secondary, keyed by URL.
    pub fn health(&self) -> HashMap<String, HealthSnapshot> {
        self.workers
            .iter()
            .map(|w| (w.url().to_string(), w.status()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secondaries: Vec<&str>) -> ValidatedConfig {
        ValidatedConfig {
            port: 0,
            secondaries: secondaries.into_iter().map(String::from).collect(),
            retry_base_delay: Duration::from_millis(5),
            retry_max_delay: Duration::from_millis(20),
            master_wait_timeout: Some(Duration::from_millis(50)),
        }
    }

    #[tokio::test]
    async fn total_replicas_is_secondaries_plus_master() {
        let engine = ReplicationEngine::new(&config(vec!["http://s1", "http://s2"]));
        assert_eq!(engine.total_replicas(), 3);
    }

    #[tokio::test]
    async fn unreachable_secondaries_time_out_at_202() {
        let engine = ReplicationEngine::new(&config(vec!["http://127.0.0.1:1"]));
        let outcome = engine
            .write("hello".into(), WriteConcern(Some(2)))
            .await;
        assert_eq!(outcome.acks, 1);
        assert!(!outcome.met_write_concern);
    }

    #[tokio::test]
    async fn w_one_returns_immediately_without_waiting_on_secondaries() {
        let engine = ReplicationEngine::new(&config(vec!["http://127.0.0.1:1"]));
        let outcome = tokio::time::timeout(
            Duration::from_millis(10),
            engine.write("hello".into(), WriteConcern(Some(1))),
        )
        .await
        .expect("w=1 must not wait on secondaries");
        assert_eq!(outcome.acks, 1);
        assert!(outcome.met_write_concern);
    }

    #[test]
    fn health_has_an_entry_per_secondary() {
        let engine = ReplicationEngine::new(&config(vec!["http://s1", "http://s2"]));
        let health = engine.health();
        assert_eq!(health.len(), 2);
        assert!(health.contains_key("http://s1"));
        assert!(health.contains_key("http://s2"));
    }

    #[test]
    fn request_pending_reports_unknown_url() {
        let engine = ReplicationEngine::new(&config(vec!["http://s1"]));
        assert!(!engine.request_pending("http://unknown"));
        assert!(engine.request_pending("http://s1"));
    }
}
