// src/handlers/script.rs

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::script::{ObjectionGroup, ObjectionGroupSummary, ObjectionResponse, TranscriptPage, TranscriptView},
};

// --- ROTEIRO ---

// GET /api/script/pages
#[utoipa::path(
    get,
    path = "/api/script/pages",
    tag = "Roteiro",
    responses(
        (status = 200, description = "Todas as páginas do roteiro", body = Vec<TranscriptPage>)
    )
)]
pub async fn list_pages(State(app_state): State<AppState>) -> Json<Vec<TranscriptPage>> {
    Json(app_state.script_service.pages().to_vec())
}

// GET /api/script/pages/{index}
#[utoipa::path(
    get,
    path = "/api/script/pages/{index}",
    tag = "Roteiro",
    params(
        ("index" = usize, Path, description = "Posição da página, a partir de 0")
    ),
    responses(
        (status = 200, description = "Página pedida", body = TranscriptView),
        (status = 404, description = "Fora do roteiro")
    )
)]
pub async fn get_page(
    State(app_state): State<AppState>,
    Path(index): Path<usize>,
) -> Result<Json<TranscriptView>, AppError> {
    Ok(Json(app_state.script_service.page(index)?))
}

// GET /api/script/current
#[utoipa::path(
    get,
    path = "/api/script/current",
    tag = "Roteiro",
    responses(
        (status = 200, description = "Página onde o agente está", body = TranscriptView)
    )
)]
pub async fn current_page(State(app_state): State<AppState>) -> Json<TranscriptView> {
    Json(app_state.script_service.current().await)
}

// POST /api/script/next
#[utoipa::path(
    post,
    path = "/api/script/next",
    tag = "Roteiro",
    responses(
        (status = 200, description = "Avança uma página (para na última)", body = TranscriptView)
    )
)]
pub async fn next_page(State(app_state): State<AppState>) -> Result<Json<TranscriptView>, AppError> {
    Ok(Json(app_state.script_service.next().await?))
}

// POST /api/script/previous
#[utoipa::path(
    post,
    path = "/api/script/previous",
    tag = "Roteiro",
    responses(
        (status = 200, description = "Volta uma página (para na primeira)", body = TranscriptView)
    )
)]
pub async fn previous_page(State(app_state): State<AppState>) -> Result<Json<TranscriptView>, AppError> {
    Ok(Json(app_state.script_service.previous().await?))
}

// --- OBJEÇÕES ---

// GET /api/objections
#[utoipa::path(
    get,
    path = "/api/objections",
    tag = "Roteiro",
    responses(
        (status = 200, description = "Grupos de objeções", body = Vec<ObjectionGroupSummary>)
    )
)]
pub async fn list_objection_groups(State(app_state): State<AppState>) -> Json<Vec<ObjectionGroupSummary>> {
    Json(app_state.script_service.groups())
}

// GET /api/objections/{group}
#[utoipa::path(
    get,
    path = "/api/objections/{group}",
    tag = "Roteiro",
    params(
        ("group" = u8, Path, description = "1 = vendas, 2 = técnicas e confiança")
    ),
    responses(
        (status = 200, description = "Objeções do grupo", body = ObjectionGroup),
        (status = 404, description = "Grupo inexistente")
    )
)]
pub async fn get_objection_group(
    State(app_state): State<AppState>,
    Path(group): Path<u8>,
) -> Result<Json<ObjectionGroup>, AppError> {
    Ok(Json(app_state.script_service.objections(group)?.clone()))
}

// GET /api/objections/{group}/{id}
#[utoipa::path(
    get,
    path = "/api/objections/{group}/{id}",
    tag = "Roteiro",
    params(
        ("group" = u8, Path, description = "Grupo da objeção"),
        ("id" = String, Path, description = "Identificador da objeção")
    ),
    responses(
        (status = 200, description = "Resposta sugerida (texto padrão quando não existe)", body = ObjectionResponse)
    )
)]
pub async fn get_objection_response(
    State(app_state): State<AppState>,
    Path((group, id)): Path<(u8, String)>,
) -> Json<ObjectionResponse> {
    Json(app_state.script_service.objection_response(group, &id))
}
