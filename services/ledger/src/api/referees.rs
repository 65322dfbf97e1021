//! Referee directory handlers.
use crate::api::error::{api_internal, api_not_found, api_validation_error, ApiError};
use crate::api::types::{
    MessageResponse, RefereeCreateRequest, RefereeCreateResponse, RefereeDeleteRequest,
    RefereeListResponse,
};
use crate::api::{clean_optional, required};
use crate::app::AppState;
use crate::model::NewReferee;
use crate::store::StoreError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use varco_common::ids::RefereeId;

pub(crate) async fn list_referees(
    State(state): State<AppState>,
) -> Result<Json<RefereeListResponse>, ApiError> {
    let referees = state
        .store
        .list_referees()
        .await
        .map_err(|err| api_internal("lettura referenti fallita", &err))?;
    Ok(Json(RefereeListResponse {
        success: true,
        referees,
    }))
}

pub(crate) async fn create_referee(
    State(state): State<AppState>,
    Json(body): Json<RefereeCreateRequest>,
) -> Result<(StatusCode, Json<RefereeCreateResponse>), ApiError> {
    let Some(nome) = required(body.nome) else {
        return Err(api_validation_error("Nome obbligatorio"));
    };
    let referee = state
        .store
        .create_referee(NewReferee {
            nome,
            email: clean_optional(body.email),
        })
        .await
        .map_err(|err| api_internal("creazione referente fallita", &err))?;
    Ok((
        StatusCode::CREATED,
        Json(RefereeCreateResponse {
            success: true,
            referee,
        }),
    ))
}

/// Soft-delete: the row stays so that visits keep resolving the name.
pub(crate) async fn delete_referee(
    State(state): State<AppState>,
    Json(body): Json<RefereeDeleteRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(raw_id) = required(body.id) else {
        return Err(api_validation_error("ID obbligatorio"));
    };
    let id: RefereeId = raw_id
        .parse()
        .map_err(|_| api_validation_error("ID non valido"))?;
    match state.store.deactivate_referee(&id).await {
        Ok(()) => Ok(Json(MessageResponse {
            success: true,
            message: "Referente rimosso".to_string(),
        })),
        Err(StoreError::NotFound(_)) => Err(api_not_found("Referente non trovato")),
        Err(err) => Err(api_internal("rimozione referente fallita", &err)),
    }
}
