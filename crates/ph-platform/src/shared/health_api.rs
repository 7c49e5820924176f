//! Health endpoints
//!
//! `/health` reports the user store probe with timing, `/health/live`
//! answers as long as the process serves requests, and `/health/ready`
//! requires both finished startup and a reachable store.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use utoipa::ToSchema;

use crate::user::repository::UserStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    /// Store reachable but startup not finished
    Starting,
    Down,
}

impl HealthStatus {
    fn http_status(self) -> StatusCode {
        match self {
            HealthStatus::Down => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::OK,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreProbe {
    pub status: HealthStatus,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_store: Option<StoreProbe>,
}

impl HealthReport {
    fn bare(status: HealthStatus) -> Self {
        Self { status, checked_at: Utc::now(), version: None, user_store: None }
    }
}

#[derive(Clone)]
pub struct HealthState {
    store: Arc<dyn UserStore>,
    version: Option<String>,
    ready: Arc<AtomicBool>,
}

impl HealthState {
    pub fn new(store: Arc<dyn UserStore>, version: Option<String>) -> Self {
        Self {
            store,
            version,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Called once indexes and dev seeding are done.
    pub fn set_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    async fn probe_store(&self) -> StoreProbe {
        let started = Instant::now();
        let result = self.store.ping().await;
        let latency_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(()) => StoreProbe { status: HealthStatus::Up, latency_ms, error: None },
            Err(e) => StoreProbe {
                status: HealthStatus::Down,
                latency_ms,
                error: Some(e.to_string()),
            },
        }
    }
}

async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let probe = state.probe_store().await;
    let status = match (probe.status, state.is_ready()) {
        (HealthStatus::Up, false) => HealthStatus::Starting,
        (status, _) => status,
    };

    let report = HealthReport {
        status,
        checked_at: Utc::now(),
        version: state.version.clone(),
        user_store: Some(probe),
    };
    (status.http_status(), Json(report))
}

async fn live() -> Json<HealthReport> {
    Json(HealthReport::bare(HealthStatus::Up))
}

async fn ready(State(state): State<HealthState>) -> (StatusCode, Json<HealthReport>) {
    let status = if state.is_ready() {
        state.probe_store().await.status
    } else {
        HealthStatus::Down
    };
    (status.http_status(), Json(HealthReport::bare(status)))
}

pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/live", get(live))
        .route("/ready", get(ready))
        .with_state(state)
}
