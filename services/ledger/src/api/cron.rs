//! Presence alert sweep.
//!
//! # Purpose
//! An external scheduler hits this endpoint periodically; it is authenticated
//! with a shared bearer secret rather than a user session. The sweep reads
//! today's still-present visitors and mails the operator one summary. Nothing
//! is persisted, so the sweep is idempotent and safe to re-run.
use crate::api::error::{
    api_internal, api_internal_message, api_unauthorized, ApiError,
};
use crate::api::types::MessageResponse;
use crate::app::AppState;
use crate::day::DayWindow;
use crate::mail::templates;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

pub(crate) async fn presence_alert(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MessageResponse>, ApiError> {
    ensure_cron_authorized(&state, &headers)?;

    let now = Utc::now();
    let window = DayWindow::containing(now, state.display_tz);
    let still_present = state
        .store
        .still_present_in(&window)
        .await
        .map_err(|err| api_internal("lettura registro fallita", &err))?;

    if still_present.is_empty() {
        return Ok(Json(MessageResponse {
            success: true,
            message: "Nessun visitatore ancora presente.".to_string(),
        }));
    }

    // The summary email IS this operation; unlike the courtesy
    // confirmations, a failed send fails the sweep.
    let email = templates::presence_alert(&still_present, now, state.display_tz, &state.admin_email);
    if let Err(err) = state.mailer.send(email).await {
        return Err(api_internal_message(&format!("invio alert fallito: {err}")));
    }
    metrics::counter!("varco_alerts_sent_total").increment(1);

    Ok(Json(MessageResponse {
        success: true,
        message: format!(
            "Alert inviato: {} visitatori ancora presenti.",
            still_present.len()
        ),
    }))
}

fn ensure_cron_authorized(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| api_unauthorized("Unauthorized"))?;

    let expected = state
        .cron_secret
        .as_ref()
        .ok_or_else(|| api_internal_message("cron secret not configured"))?;
    let expected = format!("Bearer {expected}");

    if !constant_time_eq(value.as_bytes(), expected.as_bytes()) {
        return Err(api_unauthorized("Unauthorized"));
    }
    Ok(())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
