//! Replicated log secondary — deduplicates and delivers replicated
//! messages in strict sequence order, and catches up with the master on
//! startup.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use replicatedlog_secondary::api::{self, AppState};
use replicatedlog_secondary::{pending_sync, SecondaryConfig, SecondaryLog};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = SecondaryConfig::parse();
    let validated = match config.validate() {
        Ok(validated) => validated,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        port = validated.port,
        replica_delay = ?validated.replica_delay,
        error_rate = validated.error_rate,
        "starting secondary"
    );

    let state = AppState {
        log: Arc::new(SecondaryLog::new()),
        replica_delay: validated.replica_delay,
        error_rate: validated.error_rate,
    };
    let app = api::router(state).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], validated.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    // Started only once the listener is bound, per
    // `original_source/secondary/secondary.py`'s `launch_pending_sync`
    // doc comment ("ensure pending sync runs after the server starts
    // accepting requests").
    pending_sync::spawn(validated.master_url.clone(), validated.secondary_url.clone());

    tracing::info!(%addr, "listening");
    if let Err(error) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!(%error, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
