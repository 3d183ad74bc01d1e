#![forbid(unsafe_code)]

use curbmap_provider::{HttpPlaceSource, HttpPlaceSourceConfig};
use curbmap_server::{build_router, AppState, ServerConfig};
use rusqlite::Connection;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = ServerConfig::from_env();

    let conn = match Connection::open(&cfg.database_path) {
        Ok(conn) => conn,
        Err(e) => {
            error!(path = %cfg.database_path.display(), error = %e, "cannot open database");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = curbmap_store::init_schema(&conn) {
        error!(error = %e, "schema initialization failed");
        return ExitCode::FAILURE;
    }

    let provider = match HttpPlaceSource::new(HttpPlaceSourceConfig {
        base_url: cfg.provider_base_url.clone(),
        api_key: cfg.provider_api_key.clone(),
        region_keyword: cfg.region.token.clone(),
        timeout: cfg.provider_timeout,
    }) {
        Ok(provider) => provider,
        Err(e) => {
            error!(error = %e, "cannot build provider client");
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::new(conn, Arc::new(provider), &cfg);
    let app = build_router(state);

    let listener = match TcpListener::bind(&cfg.bind_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %cfg.bind_addr, error = %e, "cannot bind");
            return ExitCode::FAILURE;
        }
    };
    info!(addr = %cfg.bind_addr, "curbmap server listening");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server exited with error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
