//! Health/diagnostics handler.
//!
//! # Purpose
//! One endpoint an operator can open in a browser to see, at a glance, which
//! required configuration is present and whether the store answers. Always
//! 200: the body carries the diagnosis.
use crate::api::types::{HealthEnv, HealthResponse};
use crate::app::AppState;
use axum::extract::State;
use axum::Json;
use chrono::Utc;

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store.health_check().await {
        Ok(()) => "connected".to_string(),
        Err(err) => format!("error: {err}"),
    };
    Json(HealthResponse {
        ok: true,
        timestamp: Utc::now().to_rfc3339(),
        env: HealthEnv {
            database_url: set_or_missing(state.diagnostics.database_url),
            smtp_pass: set_or_missing(state.diagnostics.smtp_pass),
            cron_secret: set_or_missing(state.diagnostics.cron_secret),
            bucket_key: set_or_missing(state.diagnostics.bucket_key),
        },
        store,
        backend: state.store.backend_name().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

fn set_or_missing(present: bool) -> &'static str {
    if present {
        "set"
    } else {
        "missing"
    }
}
