//! Visit lifecycle handlers: check-in, check-out, and the day listing.
//!
//! # Purpose
//! Implements the core of the register. Check-in validates, issues a code,
//! best-effort uploads the consent artifact, persists, then fires the
//! confirmation email without blocking the response. Check-out is a single
//! conditional transition arbitrated by the store.
use crate::api::error::{
    api_conflict, api_internal, api_not_found, api_validation_error, ApiError,
};
use crate::api::types::{
    CheckInRequest, CheckInResponse, CheckOutRequest, CheckOutResponse, VisitListResponse,
};
use crate::api::{clean_optional, required};
use crate::app::AppState;
use crate::codes::{self, CodeIssueError};
use crate::day::DayWindow;
use crate::mail::{spawn_courtesy_send, templates};
use crate::model::NewVisit;
use crate::signatures;
use crate::store::StoreError;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use varco_common::ids::VisitId;

pub(crate) async fn check_in(
    State(state): State<AppState>,
    Json(body): Json<CheckInRequest>,
) -> Result<(StatusCode, Json<CheckInResponse>), ApiError> {
    let (Some(nome), Some(ditta), Some(email)) = (
        required(body.nome),
        required(body.ditta),
        required(body.email),
    ) else {
        return Err(api_validation_error("Nome, Ditta e Email sono obbligatori"));
    };

    let codice = match codes::issue_code(state.store.as_ref()).await {
        Ok(codice) => codice,
        Err(CodeIssueError::Exhausted { .. }) => {
            return Err(api_conflict(
                "Impossibile assegnare un codice univoco, riprovare",
            ))
        }
        Err(CodeIssueError::Store(err)) => {
            return Err(api_internal("verifica codice fallita", &err))
        }
    };

    let now = Utc::now();
    let firma_url = signatures::store_artifacts(
        state.signatures.as_ref(),
        &codice,
        now,
        body.firma_pdf.as_deref(),
        body.firma.as_deref(),
    )
    .await;

    let visitor = state
        .store
        .insert_visit(NewVisit {
            nome,
            ditta,
            email,
            referente: clean_optional(body.referente),
            zona: clean_optional(body.zona),
            codice_univoco: codice,
            ora_entrata: now,
            firma_url,
            privacy_accettata: body.privacy_accettata.unwrap_or(false),
        })
        .await
        .map_err(|err| api_internal("registrazione ingresso fallita", &err))?;
    metrics::counter!("varco_checkins_total").increment(1);

    spawn_courtesy_send(
        state.mailer.clone(),
        templates::entry_confirmation(&visitor, state.display_tz),
        "entry",
    );

    let codice = visitor.codice_univoco.to_string();
    Ok((
        StatusCode::CREATED,
        Json(CheckInResponse {
            success: true,
            message: "Ingresso registrato".to_string(),
            codice,
            visitor,
        }),
    ))
}

pub(crate) async fn check_out(
    State(state): State<AppState>,
    Json(body): Json<CheckOutRequest>,
) -> Result<Json<CheckOutResponse>, ApiError> {
    let Some(raw_id) = required(body.id) else {
        return Err(api_validation_error("ID visitatore obbligatorio"));
    };
    let id: VisitId = raw_id
        .parse()
        .map_err(|_| api_validation_error("ID visitatore non valido"))?;

    let now = Utc::now();
    match state.store.close_visit(&id, now).await {
        Ok(visitor) => {
            metrics::counter!("varco_checkouts_total").increment(1);
            spawn_courtesy_send(
                state.mailer.clone(),
                templates::exit_confirmation(&visitor, now, state.display_tz),
                "exit",
            );
            Ok(Json(CheckOutResponse {
                success: true,
                message: "Uscita registrata".to_string(),
                visitor,
            }))
        }
        Err(StoreError::NotFound(_)) => {
            Err(api_not_found("Visitatore non trovato o già uscito"))
        }
        Err(err) => Err(api_internal("registrazione uscita fallita", &err)),
    }
}

pub(crate) async fn list_visits(
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<Json<VisitListResponse>, ApiError> {
    let window = match params.get("date") {
        Some(raw) => {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| api_validation_error("Data non valida. Formato: YYYY-MM-DD"))?;
            DayWindow::for_day(day, state.display_tz)
        }
        None => DayWindow::containing(Utc::now(), state.display_tz),
    };
    let visitors = state
        .store
        .visits_entered_in(&window)
        .await
        .map_err(|err| api_internal("lettura registro fallita", &err))?;
    Ok(Json(VisitListResponse {
        success: true,
        visitors,
    }))
}
