// src/handlers/dispositions.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::{DispositionPayload, DispositionValidation},
        disposition::{DispositionOption, DispositionOutcome},
    },
    services::disposition_service,
};

// GET /api/dispositions/options
#[utoipa::path(
    get,
    path = "/api/dispositions/options",
    tag = "Disposições",
    responses(
        (status = 200, description = "Disposições disponíveis", body = Vec<DispositionOption>)
    )
)]
pub async fn list_options() -> Json<Vec<DispositionOption>> {
    Json(disposition_service::options())
}

// POST /api/dispositions/validate
#[utoipa::path(
    post,
    path = "/api/dispositions/validate",
    tag = "Disposições",
    request_body = DispositionPayload,
    responses(
        (status = 200, description = "Disposição pode ser aplicada", body = DispositionValidation),
        (status = 409, description = "Sem lead e sem ligação ativa"),
        (status = 422, description = "Campos obrigatórios ou notas faltando")
    )
)]
pub async fn validate_disposition(
    State(app_state): State<AppState>,
    Json(payload): Json<DispositionPayload>,
) -> Result<Json<DispositionValidation>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let lead = match payload.lead {
        Some(lead) => lead,
        None => app_state.call_service.current_call().await.ok_or(AppError::NoActiveCall)?,
    };
    let disposition = disposition_service::validate(&payload.disposition, &lead, &payload.notes)?;

    Ok(Json(DispositionValidation { valid: true, disposition: disposition.id().to_string() }))
}

// POST /api/dispositions
#[utoipa::path(
    post,
    path = "/api/dispositions",
    tag = "Disposições",
    request_body = DispositionPayload,
    responses(
        (status = 200, description = "Ligação encerrada: PDFs gerados, CRM atualizado", body = DispositionOutcome),
        (status = 409, description = "Sem lead e sem ligação ativa"),
        (status = 422, description = "Campos obrigatórios ou notas faltando"),
        (status = 502, description = "CRM devolveu erro")
    )
)]
pub async fn process_disposition(
    State(app_state): State<AppState>,
    Json(payload): Json<DispositionPayload>,
) -> Result<Json<DispositionOutcome>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = app_state
        .disposition_service
        .process(&payload.disposition, payload.lead, &payload.notes)
        .await?;
    Ok(Json(outcome))
}
