//! The master's HTTP surface: a thin axum adapter over [`ReplicationEngine`].

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

use replicatedlog_core::{BadRequest, Message, WriteConcern};

use crate::engine::ReplicationEngine;

/// Builds the master's router over a shared [`ReplicationEngine`].
pub fn router(engine: Arc<ReplicationEngine>) -> Router {
    Router::new()
        .route("/message", post(post_message))
        .route("/messages", get(get_messages))
        .route("/pending", post(post_pending))
        .route("/health", get(get_health))
        .with_state(engine)
}

#[derive(Debug, Deserialize)]
struct PostMessageRequest {
    text: Option<String>,
    w: Option<u32>,
}

#[derive(Debug, Serialize)]
struct PostMessageResponse {
    status: &'static str,
    acks: u32,
    msg: Message,
}

async fn post_message(
    State(engine): State<Arc<ReplicationEngine>>,
    body: Result<Json<PostMessageRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match body {
        Ok(json) => json,
        Err(_) => return bad_request("request body must be a JSON object"),
    };

    let Some(text) = request.text else {
        return bad_request("missing required field `text`");
    };

    let outcome = engine.write(text, WriteConcern(request.w)).await;
    let status = if outcome.met_write_concern {
        StatusCode::OK
    } else {
        StatusCode::ACCEPTED
    };

    (
        status,
        Json(PostMessageResponse {
            status: "ok",
            acks: outcome.acks,
            msg: outcome.message,
        }),
    )
        .into_response()
}

async fn get_messages(State(engine): State<Arc<ReplicationEngine>>) -> impl IntoResponse {
    Json(engine.snapshot())
}

#[derive(Debug, Deserialize)]
struct PendingRequest {
    url: Option<String>,
}

#[derive(Debug, Serialize)]
struct PendingResponse {
    status: &'static str,
}

async fn post_pending(
    State(engine): State<Arc<ReplicationEngine>>,
    body: Result<Json<PendingRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match body {
        Ok(json) => json,
        Err(_) => return bad_request("request body must be a JSON object"),
    };
    let Some(url) = request.url else {
        return bad_request("missing required field `url`");
    };

    engine.request_pending(&url);
    (StatusCode::OK, Json(PendingResponse { status: "resend queued" })).into_response()
}

async fn get_health(State(engine): State<Arc<ReplicationEngine>>) -> impl IntoResponse {
    Json(engine.health())
}

fn bad_request(message: &str) -> axum::response::Response {
    let error = BadRequest::new(message);
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": error.to_string() })),
    )
        .into_response()
}
