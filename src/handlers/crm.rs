// src/handlers/crm.rs

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    db::CrmCredentials,
    models::api::CredentialsPayload,
};

// PUT /api/crm/credentials
// As credenciais só ficam se o CRM aceitar o login; senão voltam as anteriores
#[utoipa::path(
    put,
    path = "/api/crm/credentials",
    tag = "CRM",
    request_body = CredentialsPayload,
    responses(
        (status = 204, description = "Credenciais aceitas pelo CRM"),
        (status = 401, description = "Credenciais recusadas"),
        (status = 503, description = "CRM inacessível")
    )
)]
pub async fn set_credentials(
    State(app_state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let api_user = payload.api_user.clone();
    let previous = app_state
        .crm
        .set_credentials(CrmCredentials { api_user: payload.api_user, api_pass: payload.api_pass })
        .await;

    if let Err(e) = app_state.lead_service.validate_credentials().await {
        app_state.crm.restore_credentials(previous).await;
        tracing::warn!("🔒 Credenciais do CRM recusadas para '{}'", api_user);
        return Err(e);
    }

    app_state
        .events
        .log_security_event("credentials_updated", json!({ "api_user": api_user }))
        .await?;
    tracing::info!("🔑 Credenciais do CRM atualizadas");
    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/crm/credentials
#[utoipa::path(
    delete,
    path = "/api/crm/credentials",
    tag = "CRM",
    responses(
        (status = 204, description = "Credenciais removidas")
    )
)]
pub async fn clear_credentials(State(app_state): State<AppState>) -> Result<StatusCode, AppError> {
    app_state.crm.clear_credentials().await;
    app_state.events.log_security_event("credentials_cleared", json!({})).await?;
    Ok(StatusCode::NO_CONTENT)
}
