//! The secondary's HTTP surface: `/replicate` and `/messages`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use rand::Rng;
use serde::Serialize;

use replicatedlog_core::{BadRequest, Message};

use crate::log::{ApplyOutcome, SecondaryLog};

/// Shared state behind the secondary's routes.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<SecondaryLog>,
    pub replica_delay: std::time::Duration,
    pub error_rate: f64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/replicate", post(post_replicate))
        .route("/messages", get(get_messages))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct ReplicateResponse {
    status: &'static str,
    msg: Message,
}

async fn post_replicate(
    State(state): State<AppState>,
    body: Result<Json<Message>, JsonRejection>,
) -> impl IntoResponse {
    let Json(msg) = match body {
        Ok(json) => json,
        Err(_) => {
            let error = BadRequest::new("request body must be {id, text}");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": error.to_string() })),
            )
                .into_response();
        }
    };

    // Fault-injection hook: delay before touching state at all, so an
    // in-flight request is observably "not yet applied" for this long
    // (spec.md §4.6 step 1).
    if !state.replica_delay.is_zero() {
        tracing::info!(delay = ?state.replica_delay, "delaying before replicate");
        tokio::time::sleep(state.replica_delay).await;
    }

    let outcome = state.log.apply(msg.clone());
    match outcome {
        ApplyOutcome::Delivered => tracing::info!(id = msg.id, "delivered"),
        ApplyOutcome::DuplicateDelivered | ApplyOutcome::DuplicatePending => {
            tracing::info!(id = msg.id, "duplicate, ignored")
        }
        ApplyOutcome::Stale => tracing::warn!(id = msg.id, "stale arrival, ignored"),
        ApplyOutcome::Buffered => tracing::info!(id = msg.id, "buffered awaiting predecessors"),
    }

    // Fault injection happens *after* the state mutation: this models a
    // replica that accepted the write but whose ack was lost in transit
    // (spec.md §4.6 rationale). A retry from the master hits the
    // duplicate branch above and eventually returns 200.
    if state.error_rate > 0.0 && rand::rng().random::<f64>() < state.error_rate {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "status": "error", "msg": msg })),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(ReplicateResponse { status: "replicated", msg }),
    )
        .into_response()
}

async fn get_messages(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.log.snapshot())
}
