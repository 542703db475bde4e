// src/handlers/events.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::{ArchiveResult, EventsQuery, RetentionPayload},
        event::{ErrorSummary, Event, EventCounts},
    },
};

const DEFAULT_EVENT_LIMIT: usize = 100;

// GET /api/events
#[utoipa::path(
    get,
    path = "/api/events",
    tag = "Eventos",
    params(EventsQuery),
    responses(
        (status = 200, description = "Eventos mais recentes, do mais antigo para o mais novo", body = Vec<Event>)
    )
)]
pub async fn list_events(
    State(app_state): State<AppState>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<Event>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT);
    let events = app_state.events.recent_events(query.category, limit).await?;
    Ok(Json(events))
}

// GET /api/events/counts
#[utoipa::path(
    get,
    path = "/api/events/counts",
    tag = "Eventos",
    responses(
        (status = 200, description = "Eventos gravados desde que o processo subiu", body = EventCounts)
    )
)]
pub async fn event_counts(State(app_state): State<AppState>) -> Json<EventCounts> {
    Json(app_state.events.event_counts().await)
}

// GET /api/events/errors
#[utoipa::path(
    get,
    path = "/api/events/errors",
    tag = "Eventos",
    responses(
        (status = 200, description = "Resumo dos últimos erros", body = ErrorSummary)
    )
)]
pub async fn error_summary(State(app_state): State<AppState>) -> Result<Json<ErrorSummary>, AppError> {
    Ok(Json(app_state.events.error_summary().await?))
}

// POST /api/events/archive
#[utoipa::path(
    post,
    path = "/api/events/archive",
    tag = "Eventos",
    request_body = RetentionPayload,
    responses(
        (status = 200, description = "Arquivos compactados em logs/archive", body = ArchiveResult)
    )
)]
pub async fn archive_logs(
    State(app_state): State<AppState>,
    Json(payload): Json<RetentionPayload>,
) -> Result<Json<ArchiveResult>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let archived = app_state.events.archive_old_logs(payload.days).await?;
    Ok(Json(ArchiveResult {
        archived: archived.iter().map(|p| p.display().to_string()).collect(),
    }))
}

// DELETE /api/events
#[utoipa::path(
    delete,
    path = "/api/events",
    tag = "Eventos",
    responses(
        (status = 204, description = "Arquivos de evento esvaziados")
    )
)]
pub async fn clear_events(State(app_state): State<AppState>) -> Result<StatusCode, AppError> {
    app_state.events.clear_logs().await?;
    Ok(StatusCode::NO_CONTENT)
}
