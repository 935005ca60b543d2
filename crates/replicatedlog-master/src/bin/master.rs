//! Replicated log master — accepts client writes, assigns ids, and
//! replicates to a configured set of secondaries.

use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use replicatedlog_master::{api, MasterConfig, ReplicationEngine};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = MasterConfig::parse();
    let validated = match config.validate() {
        Ok(validated) => validated,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(
        port = validated.port,
        secondaries = ?validated.secondaries,
        "starting master"
    );

    let engine = Arc::new(ReplicationEngine::new(&validated));
    let app = api::router(engine).layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], validated.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %addr, "failed to bind");
            return ExitCode::FAILURE;
        }
    };

    tracing::info!(%addr, "listening");
    if let Err(error) = axum::serve(listener, app.into_make_service()).await {
        tracing::error!(%error, "server error");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
