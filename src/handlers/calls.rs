// src/handlers/calls.rs

use std::path::PathBuf;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::{CleanupResult, FilePathPayload, RecentCallsQuery, RetentionPayload},
        call::{CallRecord, CallStatistics, LastSearch},
        lead::Lead,
    },
};

// =============================================================================
//  LIGAÇÃO ATUAL
// =============================================================================

// GET /api/calls/current
#[utoipa::path(
    get,
    path = "/api/calls/current",
    tag = "Ligações",
    responses(
        (status = 200, description = "Lead da ligação em andamento", body = Lead),
        (status = 409, description = "Nenhuma ligação ativa")
    )
)]
pub async fn get_current_call(State(app_state): State<AppState>) -> Result<Json<Lead>, AppError> {
    let lead = app_state.call_service.current_call().await.ok_or(AppError::NoActiveCall)?;
    Ok(Json(lead))
}

// PUT /api/calls/current
#[utoipa::path(
    put,
    path = "/api/calls/current",
    tag = "Ligações",
    request_body = Lead,
    responses(
        (status = 200, description = "Ligação atual gravada com os campos normalizados", body = Lead),
        (status = 400, description = "Campo inválido")
    )
)]
pub async fn set_current_call(
    State(app_state): State<AppState>,
    Json(lead): Json<Lead>,
) -> Result<Json<Lead>, AppError> {
    let saved = app_state.call_service.set_current_call(lead).await?;
    Ok(Json(saved))
}

// DELETE /api/calls/current
#[utoipa::path(
    delete,
    path = "/api/calls/current",
    tag = "Ligações",
    responses(
        (status = 200, description = "Ligação movida para o histórico", body = CallRecord),
        (status = 409, description = "Nenhuma ligação ativa")
    )
)]
pub async fn clear_current_call(State(app_state): State<AppState>) -> Result<Json<CallRecord>, AppError> {
    let record = app_state.call_service.clear_current_call().await?.ok_or(AppError::NoActiveCall)?;
    Ok(Json(record))
}

// GET /api/calls/last-search
#[utoipa::path(
    get,
    path = "/api/calls/last-search",
    tag = "Ligações",
    responses(
        (status = 200, description = "Última busca por telefone", body = LastSearch),
        (status = 404, description = "Nenhuma busca feita ainda")
    )
)]
pub async fn last_search(State(app_state): State<AppState>) -> Result<Json<LastSearch>, AppError> {
    let search = app_state
        .call_service
        .last_search()
        .await
        .ok_or_else(|| AppError::NotFound("Last search".to_string()))?;
    Ok(Json(search))
}

// =============================================================================
//  HISTÓRICO
// =============================================================================

// GET /api/calls/recent
#[utoipa::path(
    get,
    path = "/api/calls/recent",
    tag = "Ligações",
    params(RecentCallsQuery),
    responses(
        (status = 200, description = "Ligações recentes, mais nova primeiro", body = Vec<CallRecord>)
    )
)]
pub async fn recent_calls(
    State(app_state): State<AppState>,
    Query(query): Query<RecentCallsQuery>,
) -> Json<Vec<CallRecord>> {
    Json(app_state.call_service.recent_calls(query.limit).await)
}

// DELETE /api/calls/recent
#[utoipa::path(
    delete,
    path = "/api/calls/recent",
    tag = "Ligações",
    responses(
        (status = 204, description = "Histórico apagado")
    )
)]
pub async fn clear_recent_calls(State(app_state): State<AppState>) -> Result<StatusCode, AppError> {
    app_state.call_service.clear_recent_calls().await?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/calls/history/{phone}
#[utoipa::path(
    get,
    path = "/api/calls/history/{phone}",
    tag = "Ligações",
    params(
        ("phone" = String, Path, description = "Telefone; só os dígitos são comparados")
    ),
    responses(
        (status = 200, description = "Ligações recentes para o telefone", body = Vec<CallRecord>)
    )
)]
pub async fn call_history(
    State(app_state): State<AppState>,
    Path(phone): Path<String>,
) -> Json<Vec<CallRecord>> {
    Json(app_state.call_service.call_history(&phone).await)
}

// GET /api/calls/statistics
#[utoipa::path(
    get,
    path = "/api/calls/statistics",
    tag = "Ligações",
    responses(
        (status = 200, description = "Totais por disposição", body = CallStatistics)
    )
)]
pub async fn statistics(State(app_state): State<AppState>) -> Json<CallStatistics> {
    Json(app_state.call_service.statistics().await)
}

// POST /api/calls/cleanup
#[utoipa::path(
    post,
    path = "/api/calls/cleanup",
    tag = "Ligações",
    request_body = RetentionPayload,
    responses(
        (status = 200, description = "Ligações antigas removidas", body = CleanupResult)
    )
)]
pub async fn cleanup(
    State(app_state): State<AppState>,
    Json(payload): Json<RetentionPayload>,
) -> Result<Json<CleanupResult>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let removed = app_state.call_service.cleanup_old_data(payload.days).await?;
    Ok(Json(CleanupResult { removed }))
}

// =============================================================================
//  EXPORTAÇÃO DO ESTADO
// =============================================================================

// POST /api/calls/state/export
#[utoipa::path(
    post,
    path = "/api/calls/state/export",
    tag = "Ligações",
    request_body = FilePathPayload,
    responses(
        (status = 204, description = "Estado gravado no arquivo")
    )
)]
pub async fn export_state(
    State(app_state): State<AppState>,
    Json(payload): Json<FilePathPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.call_service.export_state(&PathBuf::from(payload.path)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/calls/state/import
#[utoipa::path(
    post,
    path = "/api/calls/state/import",
    tag = "Ligações",
    request_body = FilePathPayload,
    responses(
        (status = 204, description = "Estado substituído pelo do arquivo"),
        (status = 404, description = "Arquivo não encontrado")
    )
)]
pub async fn import_state(
    State(app_state): State<AppState>,
    Json(payload): Json<FilePathPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.call_service.import_state(&PathBuf::from(payload.path)).await?;
    Ok(StatusCode::NO_CONTENT)
}
