// src/middleware/credentials.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::{AppError, CrmErrorKind},
    config::AppState,
};

// Rotas de lead, ligação e disposição só rodam com credenciais do CRM configuradas
pub async fn crm_guard(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !app_state.crm.has_credentials().await {
        tracing::warn!("Requisição a {} sem credenciais do CRM", request.uri().path());
        return Err(AppError::Crm(CrmErrorKind::Unauthenticated));
    }

    Ok(next.run(request).await)
}
