//! Per-secondary replication queue, retry loop, and health tracking.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use replicatedlog_core::{AckFuture, HealthSnapshot, Message, ReplicationBackoff};
use tokio::sync::{mpsc, Notify};
use tracing::{info, warn};

/// Sink workers push a successful [`AckFuture`] onto; the owning request
/// handler drains it until `w - 1` acks arrive or its wait times out.
pub type AckSink = mpsc::Sender<AckFuture>;

#[derive(Clone)]
struct QueueItem {
    message: Message,
    ack: AckFuture,
    ack_sink: Option<AckSink>,
}

/// One dedicated, strictly-serial replication queue for a single
/// secondary URL.
///
/// The queue is processed by a single background task (the async
/// analogue of the "one dedicated executor thread" in spec.md §5): the
/// head item is retried with jittered exponential backoff until it
/// succeeds, and is only popped on success, so delivery order to this
/// secondary always matches enqueue order (spec.md §4.2).
pub struct SecondaryWorker {
    url: String,
    client: reqwest::Client,
    queue: Mutex<VecDeque<QueueItem>>,
    notify: Notify,
    health: Mutex<HealthSnapshot>,
    base_delay: Duration,
    max_delay: Duration,
}

impl SecondaryWorker {
    /// Creates a worker and spawns its retry loop. The returned `Arc` is
    /// the only handle; dropping it stops the worker once the spawned
    /// task notices (workers are otherwise process-lifetime, per
    /// spec.md §4.2 "Lifetime").
    pub fn spawn(url: String, base_delay: Duration, max_delay: Duration) -> Arc<Self> {
        let worker = Arc::new(Self {
            url,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("failed to build replication http client"),
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            health: Mutex::new(HealthSnapshot::default()),
            base_delay,
            max_delay,
        });

        let loop_worker = Arc::clone(&worker);
        tokio::spawn(async move { loop_worker.run().await });

        worker
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Appends `message` to this worker's FIFO and returns a future that
    /// resolves once this secondary has ACKed it. Non-blocking.
    pub fn enqueue(&self, message: Message, ack_sink: Option<AckSink>) -> AckFuture {
        let ack = AckFuture::new();
        let item = QueueItem {
            message,
            ack: ack.clone(),
            ack_sink,
        };
        self.queue.lock().expect("worker queue mutex poisoned").push_back(item);
        self.notify.notify_one();
        ack
    }

    /// Returns a point-in-time copy of this worker's health.
    pub fn status(&self) -> HealthSnapshot {
        self.health.lock().expect("worker health mutex poisoned").clone()
    }

    async fn run(self: Arc<Self>) {
        let mut backoff = ReplicationBackoff::new(self.base_delay, self.max_delay);

        loop {
            let notified = self.notify.notified();
            let item = {
                let queue = self.queue.lock().expect("worker queue mutex poisoned");
                queue.front().cloned()
            };

            let Some(item) = item else {
                notified.await;
                continue;
            };

            match self.deliver(&item.message).await {
                Ok(()) => {
                    info!(secondary = %self.url, id = item.message.id, "replicated");
                    item.ack.set_success();
                    if let Some(sink) = &item.ack_sink {
                        let _ = sink.send(item.ack.clone()).await;
                    }
                    self.queue.lock().expect("worker queue mutex poisoned").pop_front();
                    self.health.lock().expect("worker health mutex poisoned").record_success();
                    backoff.reset();
                }
                Err(error) => {
                    warn!(secondary = %self.url, id = item.message.id, %error, "replication failed, retrying");
                    self.health
                        .lock()
                        .expect("worker health mutex poisoned")
                        .record_failure(error.to_string());
                    let delay = backoff.next_delay();
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn deliver(&self, message: &Message) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(format!("{}/replicate", self.url))
            .json(message)
            .send()
            .await
            .map_err(|e| DeliveryError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(DeliveryError(format!("HTTP {status}: {body}")))
        }
    }
}

#[derive(Debug, Clone)]
struct DeliveryError(String);

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for DeliveryError {}
