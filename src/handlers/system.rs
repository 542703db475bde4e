// src/handlers/system.rs

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use crate::{
    common::{error::AppError, validation::validate_field},
    config::AppState,
    models::api::{FieldValidationPayload, FieldValidationResult, HealthStatus, TestEmailPayload},
};

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sistema",
    responses(
        (status = 200, description = "Aplicação no ar", body = HealthStatus)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        crm_configured: app_state.crm.has_credentials().await,
        email_configured: app_state.config.smtp().is_configured(),
    })
}

// POST /api/validate
#[utoipa::path(
    post,
    path = "/api/validate",
    tag = "Sistema",
    request_body = FieldValidationPayload,
    responses(
        (status = 200, description = "Resultado da validação do campo", body = FieldValidationResult),
        (status = 404, description = "Campo sem validador")
    )
)]
pub async fn validate_value(
    Json(payload): Json<FieldValidationPayload>,
) -> Result<Json<FieldValidationResult>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let outcome = validate_field(&payload.field, &payload.value)
        .ok_or_else(|| AppError::NotFound(format!("Validator for '{}'", payload.field)))?;

    let result = match outcome {
        Ok(canonical) => FieldValidationResult {
            field: payload.field,
            valid: true,
            value: Some(canonical),
            error: None,
        },
        Err(key) => FieldValidationResult { field: payload.field, valid: false, value: None, error: Some(key) },
    };
    Ok(Json(result))
}

// POST /api/email/test
#[utoipa::path(
    post,
    path = "/api/email/test",
    tag = "Sistema",
    request_body = TestEmailPayload,
    responses(
        (status = 204, description = "E-mail de teste enviado"),
        (status = 400, description = "Destinatário inválido"),
        (status = 500, description = "SMTP sem credenciais ou indisponível")
    )
)]
pub async fn send_test_email(
    State(app_state): State<AppState>,
    Json(payload): Json<TestEmailPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.email_service.send_test_email(&payload.recipient).await?;
    Ok(StatusCode::NO_CONTENT)
}
