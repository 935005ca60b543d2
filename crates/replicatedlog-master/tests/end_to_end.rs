//! End-to-end scenarios against real secondary HTTP servers (spec.md §8).
//!
//! Unlike `src/worker.rs`'s unit tests (which mock the secondary HTTP
//! endpoint with `wiremock`), these tests run actual
//! `replicatedlog-secondary` axum apps bound to loopback ports, so the
//! whole wire contract (dedup, reorder buffer, fault injection) is
//! exercised, not just the master side.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use replicatedlog_master::config::ValidatedConfig;
use replicatedlog_master::{api, ReplicationEngine};
use replicatedlog_secondary::api::AppState;
use replicatedlog_secondary::SecondaryLog;
use tokio::net::TcpListener;

/// Starts a secondary app on an ephemeral loopback port and returns its
/// base URL. The server runs for the lifetime of the test process.
async fn spawn_secondary(replica_delay: Duration, error_rate: f64) -> String {
    let state = AppState {
        log: Arc::new(SecondaryLog::new()),
        replica_delay,
        error_rate,
    };
    let app = replicatedlog_secondary::api::router(state);

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{addr}")
}

fn engine_config(secondaries: Vec<String>) -> ValidatedConfig {
    ValidatedConfig {
        port: 0,
        secondaries,
        retry_base_delay: Duration::from_millis(20),
        retry_max_delay: Duration::from_millis(100),
        master_wait_timeout: Some(Duration::from_secs(3)),
    }
}

async fn get_messages(url: &str) -> Vec<replicatedlog_core::Message> {
    reqwest::get(format!("{url}/messages"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn s1_full_quorum_happy_path() {
    let s1 = spawn_secondary(Duration::ZERO, 0.0).await;
    let s2 = spawn_secondary(Duration::ZERO, 0.0).await;

    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![s1.clone(), s2.clone()])));
    let outcome = engine.write("A".into(), replicatedlog_core::WriteConcern(Some(3))).await;

    assert_eq!(outcome.acks, 3);
    assert!(outcome.met_write_concern);
    assert_eq!(outcome.message.id, 1);

    assert_eq!(engine.snapshot(), vec![replicatedlog_core::Message { id: 1, text: "A".into() }]);
    assert_eq!(get_messages(&s1).await, vec![replicatedlog_core::Message { id: 1, text: "A".into() }]);
    assert_eq!(get_messages(&s2).await, vec![replicatedlog_core::Message { id: 1, text: "A".into() }]);
}

#[tokio::test]
async fn s2_relaxed_concern_still_reaches_all_secondaries_eventually() {
    let s1 = spawn_secondary(Duration::ZERO, 0.0).await;
    let s2 = spawn_secondary(Duration::ZERO, 0.0).await;
    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![s1.clone(), s2.clone()])));

    let outcome = engine.write("B".into(), replicatedlog_core::WriteConcern(Some(1))).await;
    assert_eq!(outcome.acks, 1);
    assert!(outcome.met_write_concern);

    // Grace period for background replication to the secondaries.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(get_messages(&s1).await.len(), 1);
    assert_eq!(get_messages(&s2).await.len(), 1);
}

#[tokio::test]
async fn s3_one_replica_down_then_catch_up_via_pending() {
    let s1 = spawn_secondary(Duration::ZERO, 0.0).await;
    let down_url = "http://127.0.0.1:1".to_string(); // nothing listens here

    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![
        s1.clone(),
        down_url.clone(),
    ])));

    let outcome = engine.write("C".into(), replicatedlog_core::WriteConcern(Some(2))).await;
    assert_eq!(outcome.acks, 2); // master + s1, the down replica doesn't block w=2

    let health = engine.health();
    let down_health = &health[&down_url];
    assert_ne!(down_health.status, replicatedlog_core::HealthState::Healthy);

    // Bring up a "restarted" replica at a fresh port standing in for the
    // previously-down one, and have it ask for pending the way
    // PendingSync would on startup.
    let restarted = spawn_secondary(Duration::ZERO, 0.0).await;
    let restarted_engine = Arc::new(ReplicationEngine::new(&engine_config(vec![restarted.clone()])));
    restarted_engine
        .write("prewarm".into(), replicatedlog_core::WriteConcern(Some(1)))
        .await;

    assert!(restarted_engine.request_pending(&restarted));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!get_messages(&restarted).await.is_empty());
}

#[tokio::test]
async fn s4_replica_delay_hides_messages_until_applied_in_order() {
    let delayed = spawn_secondary(Duration::from_millis(300), 0.0).await;
    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![delayed.clone()])));

    // Fire-and-forget: don't wait on the delayed secondary's ack.
    let _ = engine.write("X".into(), replicatedlog_core::WriteConcern(Some(1))).await;
    let _ = engine.write("Y".into(), replicatedlog_core::WriteConcern(Some(1))).await;

    // Immediately after, the delayed secondary should not show either yet.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(get_messages(&delayed).await.is_empty());

    // Once both delays have elapsed, both ids show up, in order.
    tokio::time::sleep(Duration::from_millis(700)).await;
    let ids: Vec<u64> = get_messages(&delayed).await.iter().map(|m| m.id).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[tokio::test]
async fn s5_post_ack_failure_is_retried_and_stored_exactly_once() {
    let failing = spawn_secondary(Duration::ZERO, 1.0).await;
    let healthy = spawn_secondary(Duration::ZERO, 0.0).await;

    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![
        failing.clone(),
        healthy.clone(),
    ])));

    let outcome = engine.write("Z".into(), replicatedlog_core::WriteConcern(Some(2))).await;
    // The failing secondary never acks (every /replicate reply is 500),
    // so the client-visible ack must come from the healthy one.
    assert_eq!(outcome.acks, 2);

    let stored = get_messages(&failing).await;
    assert_eq!(stored, vec![replicatedlog_core::Message { id: 1, text: "Z".into() }]);
}

#[tokio::test]
async fn s6_write_concern_exceeding_n_behaves_like_full_quorum() {
    let s1 = spawn_secondary(Duration::ZERO, 0.0).await;
    let s2 = spawn_secondary(Duration::ZERO, 0.0).await;
    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![s1, s2])));

    let outcome = engine.write("Q".into(), replicatedlog_core::WriteConcern(Some(99))).await;
    assert_eq!(outcome.acks, 3);
    assert!(outcome.met_write_concern);
}

#[tokio::test]
async fn axum_router_serves_get_health_for_master_api() {
    let s1 = spawn_secondary(Duration::ZERO, 0.0).await;
    let engine = Arc::new(ReplicationEngine::new(&engine_config(vec![s1])));
    let _app = api::router(engine);
}
