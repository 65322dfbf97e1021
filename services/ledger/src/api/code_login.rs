//! Re-entry by access code.
//!
//! # Purpose
//! A returning visitor enters (or scans) the code from a previous
//! confirmation; the handler synthesizes a fresh visit from the most recent
//! one carrying that code. Consent is carried over as accepted, since it was
//! captured on the first visit.
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::required;
use crate::api::types::{CodeLoginRequest, CodeLoginResponse};
use crate::app::AppState;
use crate::mail::{spawn_courtesy_send, templates};
use crate::model::NewVisit;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use varco_common::AccessCode;

pub(crate) async fn code_login(
    State(state): State<AppState>,
    Json(body): Json<CodeLoginRequest>,
) -> Result<(StatusCode, Json<CodeLoginResponse>), ApiError> {
    let Some(raw) = required(body.codice) else {
        return Err(api_validation_error("Codice non valido. Formato: ARTEN-XXXX"));
    };
    let codice = AccessCode::parse(&raw)
        .map_err(|_| api_validation_error("Codice non valido. Formato: ARTEN-XXXX"))?;

    let original = state
        .store
        .latest_visit_by_code(&codice)
        .await
        .map_err(|err| api_internal("ricerca codice fallita", &err))?;
    let Some(original) = original else {
        return Err(api_not_found(
            "Codice non trovato. Verificare il codice e riprovare.",
        ));
    };

    let now = Utc::now();
    let visitor = state
        .store
        .insert_visit(NewVisit::reentry_of(&original, now))
        .await
        .map_err(|err| api_internal("registrazione ingresso fallita", &err))?;
    metrics::counter!("varco_reentries_total").increment(1);

    spawn_courtesy_send(
        state.mailer.clone(),
        templates::entry_confirmation(&visitor, state.display_tz),
        "entry",
    );

    Ok((
        StatusCode::CREATED,
        Json(CodeLoginResponse {
            success: true,
            message: format!("Bentornato {}! Ingresso registrato.", original.nome),
            visitor,
        }),
    ))
}
