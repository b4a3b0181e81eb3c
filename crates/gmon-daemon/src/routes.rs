//! Axum router and all HTTP handlers for gmon-daemon.
//!
//! `build_router` is the single entry point; `main.rs` calls it and attaches
//! middleware layers.  All handlers are `pub(crate)` so the scenario tests in
//! `tests/` can compose the router directly.

use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use gmon_ingest::RawGooseRecord;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::{
    api_types::{HealthResponse, IngestAccepted, IngestRejected, StatusResponse},
    state::{uptime_secs, AppState, BusMsg},
};

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the complete application router wired to the given shared state.
///
/// Middleware layers (CORS, tracing) are **not** applied here; `main.rs`
/// attaches them after this call so tests can use the bare router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/health", get(health))
        .route("/v1/status", get(status_handler))
        .route("/v1/records", post(ingest_records))
        .route("/v1/report", get(report_handler))
        .route("/v1/stream", get(stream))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// GET /v1/health
// ---------------------------------------------------------------------------

pub(crate) async fn health(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: true,
            service: st.build.service,
            version: st.build.version,
        }),
    )
}

// ---------------------------------------------------------------------------
// GET /v1/status
// ---------------------------------------------------------------------------

pub(crate) async fn status_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let stream_count = st.streams.read().await.len();
    let records_ingested = st.window.read().await.total_ingested();

    (
        StatusCode::OK,
        Json(StatusResponse {
            monitor_id: st.monitor_id,
            uptime_secs: uptime_secs(),
            config_hash: st.config_hash.clone(),
            records_ingested,
            stream_count,
        }),
    )
}

// ---------------------------------------------------------------------------
// POST /v1/records
// ---------------------------------------------------------------------------

/// Ingest a decoded record batch.
///
/// The batch is all-or-nothing: one structural hard fault (missing goCbRef,
/// missing or unparsable timestamp) rejects every record with a 400 and the
/// fault string. Malformed optional fields were already defaulted upstream
/// by the lenient normalizer and never reject.
pub(crate) async fn ingest_records(
    State(st): State<Arc<AppState>>,
    Json(batch): Json<Vec<RawGooseRecord>>,
) -> Response {
    let records = match gmon_ingest::normalize_batch(&batch) {
        Ok(recs) => recs,
        Err(e) => {
            warn!(error = %e, "record batch rejected");
            return (
                StatusCode::BAD_REQUEST,
                Json(IngestRejected {
                    error: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let accepted = records.len();
    let stream_count = {
        let mut table = st.streams.write().await;
        for rec in &records {
            table.apply(rec);
        }
        table.len()
    };
    {
        let mut win = st.window.write().await;
        for rec in records {
            win.push(rec);
        }
    }

    info!(accepted, stream_count, "record batch ingested");
    let _ = st.bus.send(BusMsg::LogLine {
        level: "INFO".to_string(),
        msg: format!("ingested {accepted} records ({stream_count} streams)"),
    });

    (
        StatusCode::OK,
        Json(IngestAccepted {
            accepted,
            stream_count,
        }),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// GET /v1/report
// ---------------------------------------------------------------------------

/// Build the full link report at `Utc::now()`.
///
/// Both locks are held only long enough to copy state out; detection and
/// reconciliation run on the copies.
pub(crate) async fn report_handler(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    let now = Utc::now();

    let (statuses, active) = {
        let table = st.streams.read().await;
        (table.statuses(now), table.active_links(now))
    };
    let records = { st.window.read().await.snapshot() };

    let anomalies = gmon_anomaly::detect(&st.config.detector, &records);
    let issues = gmon_reconcile::reconcile(&st.configured, &active, st.config.reconcile.match_mode);
    let report = gmon_report::build_link_report(now, &statuses, &st.configured, &issues, &anomalies);

    (StatusCode::OK, Json(report))
}

// ---------------------------------------------------------------------------
// GET /v1/stream  (SSE)
// ---------------------------------------------------------------------------

pub(crate) async fn stream(State(st): State<Arc<AppState>>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("no-cache"));
    headers.insert("Connection", HeaderValue::from_static("keep-alive"));

    let rx = st.bus.subscribe();
    let events = broadcast_to_sse(rx);

    (headers, Sse::new(events).keep_alive(KeepAlive::new())).into_response()
}

fn broadcast_to_sse(
    rx: broadcast::Receiver<BusMsg>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    BroadcastStream::new(rx).filter_map(|msg| async move {
        match msg {
            Ok(m) => {
                let event_name = match &m {
                    BusMsg::Heartbeat { .. } => "heartbeat",
                    BusMsg::Timeout { .. } => "timeout",
                    BusMsg::LogLine { .. } => "log",
                };
                let data = serde_json::to_string(&m).ok()?;
                Some(Ok(Event::default().event(event_name).data(data)))
            }
            Err(_) => None, // lagged / closed
        }
    })
}
