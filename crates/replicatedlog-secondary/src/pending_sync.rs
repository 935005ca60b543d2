//! Secondary-initiated catch-up on startup (spec.md §4.8).
//!
//! Ported from `original_source/secondary/secondary.py`'s
//! `request_pending_from_master` / `schedule_pending_sync`: a background
//! task that POSTs `{url: SECONDARY_URL}` to `{MASTER_URL}/pending`,
//! retrying up to 5 times with a fixed 2s delay, logged and non-fatal on
//! exhaustion.

use std::time::Duration;

const MAX_RETRIES: u32 = 5;
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Spawns the catch-up task. Returns immediately; failures are only
/// logged, never propagated, matching spec.md §4.8 "Failure is logged
/// and not fatal".
pub fn spawn(master_url: Option<String>, secondary_url: Option<String>) {
    tokio::spawn(async move {
        run(master_url, secondary_url, reqwest::Client::new()).await;
    });
}

async fn run(master_url: Option<String>, secondary_url: Option<String>, client: reqwest::Client) {
    let Some(master_url) = master_url else {
        tracing::warn!("MASTER_URL not set, skipping pending sync");
        return;
    };
    let Some(secondary_url) = secondary_url else {
        tracing::warn!("SECONDARY_URL not set, skipping pending sync");
        return;
    };

    for attempt in 1..=MAX_RETRIES {
        tracing::info!(attempt, %master_url, %secondary_url, "requesting pending catch-up");

        let result = client
            .post(format!("{master_url}/pending"))
            .json(&serde_json::json!({ "url": secondary_url }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::info!("pending sync with master succeeded");
                return;
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), "unexpected response from master during pending sync");
            }
            Err(error) => {
                tracing::warn!(%error, "failed to reach master for pending sync");
            }
        }

        tokio::time::sleep(RETRY_DELAY).await;
    }

    tracing::error!("exhausted retries requesting pending from master");
}
