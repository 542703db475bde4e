// src/handlers/leads.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{api::CreatedLead, lead::Lead},
};

// GET /api/leads/search/{phone}
#[utoipa::path(
    get,
    path = "/api/leads/search/{phone}",
    tag = "Leads",
    params(
        ("phone" = String, Path, description = "Telefone em qualquer formato americano")
    ),
    responses(
        (status = 200, description = "Lead encontrado; vira a ligação atual", body = Lead),
        (status = 400, description = "Telefone inválido"),
        (status = 401, description = "CRM sem credenciais"),
        (status = 404, description = "Nenhum lead com esse telefone")
    )
)]
pub async fn search_lead(
    State(app_state): State<AppState>,
    Path(phone): Path<String>,
) -> Result<Json<Lead>, AppError> {
    let lead = app_state.lead_service.search_by_phone(&phone).await?;
    Ok(Json(lead))
}

// POST /api/leads
#[utoipa::path(
    post,
    path = "/api/leads",
    tag = "Leads",
    request_body = Lead,
    responses(
        (status = 201, description = "Lead criado no CRM", body = CreatedLead),
        (status = 400, description = "Campo inválido")
    )
)]
pub async fn create_lead(
    State(app_state): State<AppState>,
    Json(lead): Json<Lead>,
) -> Result<(StatusCode, Json<CreatedLead>), AppError> {
    let lead_id = app_state.lead_service.create_lead(lead).await?;
    Ok((StatusCode::CREATED, Json(CreatedLead { lead_id })))
}

// PUT /api/leads/{id}
#[utoipa::path(
    put,
    path = "/api/leads/{id}",
    tag = "Leads",
    request_body = Lead,
    params(
        ("id" = String, Path, description = "ID do lead no CRM")
    ),
    responses(
        (status = 204, description = "Lead atualizado"),
        (status = 404, description = "Lead não existe no CRM")
    )
)]
pub async fn update_lead(
    State(app_state): State<AppState>,
    Path(lead_id): Path<String>,
    Json(lead): Json<Lead>,
) -> Result<StatusCode, AppError> {
    app_state.lead_service.update_lead(&lead_id, lead).await?;
    Ok(StatusCode::NO_CONTENT)
}
