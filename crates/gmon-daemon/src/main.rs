//! gmon-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads the layered
//! configuration and the engineered-links file, builds the shared state,
//! wires middleware, and starts the HTTP server.  All route handlers live in
//! `routes.rs`; all shared state types live in `state.rs`.
//!
//! Usage: `gmon-daemon [config.yaml ...]`. YAML paths are layered in order,
//! later files override earlier ones. No paths means operating defaults.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method};
use gmon_daemon::{routes, state};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env.local if present (dev convenience).
    // Silent if the file does not exist; production injects env vars directly.
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let config_paths: Vec<String> = std::env::args().skip(1).collect();
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let (cfg, loaded) = gmon_config::load_monitor_config(&path_refs)?;

    let configured = match &cfg.monitor.links_file {
        Some(path) => gmon_config::load_links_yaml(path)?,
        None => Vec::new(),
    };

    let shared = Arc::new(state::AppState::new(cfg, loaded.config_hash, configured));
    info!(
        monitor_id = %shared.monitor_id,
        config_hash = %shared.config_hash,
        configured_links = shared.configured.len(),
        "monitor state initialized"
    );

    state::spawn_heartbeat(shared.bus.clone(), Duration::from_secs(1));
    state::spawn_timeout_watch(Arc::clone(&shared), Duration::from_millis(500));

    let app = routes::build_router(Arc::clone(&shared))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_localhost_only());

    let addr: SocketAddr = match bind_addr_from_env() {
        Some(a) => a,
        None => shared
            .config
            .monitor
            .bind_addr
            .parse()
            .with_context(|| format!("invalid bind_addr: {}", shared.config.monitor.bind_addr))?,
    };
    info!("gmon-daemon listening on http://{}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .await
        .context("server crashed")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

fn bind_addr_from_env() -> Option<SocketAddr> {
    std::env::var("GMON_DAEMON_ADDR").ok()?.parse().ok()
}

/// CORS: allow only localhost origins.
fn cors_localhost_only() -> CorsLayer {
    let allowed_origins = [
        "http://localhost",
        "http://127.0.0.1",
        "http://localhost:3000",
        "http://127.0.0.1:3000",
        "http://localhost:5173",
        "http://127.0.0.1:5173",
    ];

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(tower_http::cors::Any)
}
