// src/models/api.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::FieldErrorKey,
    models::{event::EventCategory, lead::Lead},
};

// =============================================================================
//  SISTEMA
// =============================================================================

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub crm_configured: bool,
    pub email_configured: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FieldValidationPayload {
    #[validate(length(min = 1, message = "Informe o campo a validar."))]
    pub field: String,
    pub value: String,
}

// `value` é a forma canônica quando válido; `error` é a chave estável quando não
#[derive(Debug, Serialize, ToSchema)]
pub struct FieldValidationResult {
    pub field: String,
    pub valid: bool,
    pub value: Option<String>,
    pub error: Option<FieldErrorKey>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TestEmailPayload {
    #[validate(length(min = 1, message = "Informe o destinatário."))]
    pub recipient: String,
}

// =============================================================================
//  CRM / LEADS
// =============================================================================

#[derive(Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsPayload {
    #[validate(length(min = 1, message = "O usuário da API é obrigatório."))]
    pub api_user: String,
    #[validate(length(min = 1, message = "A senha da API é obrigatória."))]
    pub api_pass: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedLead {
    pub lead_id: String,
}

// =============================================================================
//  LIGAÇÕES
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentCallsQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RetentionPayload {
    #[validate(range(min = 0, max = 3650, message = "Número de dias inválido."))]
    pub days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CleanupResult {
    pub removed: usize,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FilePathPayload {
    #[validate(length(min = 1, message = "Informe o caminho do arquivo."))]
    pub path: String,
}

// =============================================================================
//  DISPOSIÇÕES
// =============================================================================

// Sem `lead`, a disposição vale para a ligação atual
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DispositionPayload {
    #[validate(length(min = 1, message = "Informe a disposição."))]
    pub disposition: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub lead: Option<Lead>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DispositionValidation {
    pub valid: bool,
    pub disposition: String,
}

// =============================================================================
//  CONFIGURAÇÕES / EVENTOS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct SettingValuePayload {
    pub value: Value,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventsQuery {
    pub category: Option<EventCategory>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ArchiveResult {
    pub archived: Vec<String>,
}
