// src/handlers/settings.rs

use std::{collections::BTreeMap, path::PathBuf};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        api::{FilePathPayload, SettingValuePayload},
        settings::Settings,
    },
};

// GET /api/settings
#[utoipa::path(
    get,
    path = "/api/settings",
    tag = "Configurações",
    responses(
        (status = 200, description = "Todas as preferências", body = Settings)
    )
)]
pub async fn get_settings(State(app_state): State<AppState>) -> Json<Settings> {
    Json(app_state.settings_service.get_all().await)
}

// GET /api/settings/issues
#[utoipa::path(
    get,
    path = "/api/settings/issues",
    tag = "Configurações",
    responses(
        (status = 200, description = "Problemas por categoria (vazio quando está tudo certo)", body = BTreeMap<String, Vec<String>>)
    )
)]
pub async fn get_issues(State(app_state): State<AppState>) -> Json<BTreeMap<String, Vec<String>>> {
    Json(app_state.settings_service.validate().await)
}

// GET /api/settings/{category}/{key}
#[utoipa::path(
    get,
    path = "/api/settings/{category}/{key}",
    tag = "Configurações",
    params(
        ("category" = String, Path, description = "Categoria, ex.: email"),
        ("key" = String, Path, description = "Chave dentro da categoria, ex.: smtp_port")
    ),
    responses(
        (status = 200, description = "Valor atual da chave"),
        (status = 404, description = "Chave desconhecida")
    )
)]
pub async fn get_setting(
    State(app_state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(app_state.settings_service.get(&category, &key).await?))
}

// PUT /api/settings/{category}/{key}
#[utoipa::path(
    put,
    path = "/api/settings/{category}/{key}",
    tag = "Configurações",
    request_body = SettingValuePayload,
    params(
        ("category" = String, Path, description = "Categoria"),
        ("key" = String, Path, description = "Chave dentro da categoria")
    ),
    responses(
        (status = 200, description = "Preferências depois da alteração", body = Settings),
        (status = 400, description = "Valor do tipo errado"),
        (status = 404, description = "Chave desconhecida")
    )
)]
pub async fn update_setting(
    State(app_state): State<AppState>,
    Path((category, key)): Path<(String, String)>,
    Json(payload): Json<SettingValuePayload>,
) -> Result<Json<Settings>, AppError> {
    let updated = app_state.settings_service.set(&category, &key, payload.value).await?;
    Ok(Json(updated))
}

// POST /api/settings/reset
#[utoipa::path(
    post,
    path = "/api/settings/reset",
    tag = "Configurações",
    responses(
        (status = 200, description = "Todas as preferências voltaram ao padrão", body = Settings)
    )
)]
pub async fn reset_all(State(app_state): State<AppState>) -> Result<Json<Settings>, AppError> {
    Ok(Json(app_state.settings_service.reset_all().await?))
}

// POST /api/settings/reset/{category}
#[utoipa::path(
    post,
    path = "/api/settings/reset/{category}",
    tag = "Configurações",
    params(
        ("category" = String, Path, description = "Categoria a restaurar")
    ),
    responses(
        (status = 200, description = "Categoria restaurada", body = Settings),
        (status = 404, description = "Categoria desconhecida")
    )
)]
pub async fn reset_category(
    State(app_state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Settings>, AppError> {
    Ok(Json(app_state.settings_service.reset_category(&category).await?))
}

// POST /api/settings/export
#[utoipa::path(
    post,
    path = "/api/settings/export",
    tag = "Configurações",
    request_body = FilePathPayload,
    responses(
        (status = 204, description = "Preferências gravadas no arquivo")
    )
)]
pub async fn export_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<FilePathPayload>,
) -> Result<StatusCode, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    app_state.settings_service.export_to(&PathBuf::from(payload.path)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/settings/import
#[utoipa::path(
    post,
    path = "/api/settings/import",
    tag = "Configurações",
    request_body = FilePathPayload,
    responses(
        (status = 200, description = "Preferências importadas", body = Settings),
        (status = 404, description = "Arquivo não encontrado")
    )
)]
pub async fn import_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<FilePathPayload>,
) -> Result<Json<Settings>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let settings = app_state.settings_service.import_from(&PathBuf::from(payload.path)).await?;
    Ok(Json(settings))
}
