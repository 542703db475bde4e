// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use utoipa::ToSchema;

// Falhas possíveis de uma chamada à API do CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum CrmErrorKind {
    #[error("Authentication failed. Please check your API credentials.")]
    Unauthenticated,

    #[error("Lead not found.")]
    NotFound,

    #[error("The CRM server returned an error. Please try again later.")]
    ServerError,

    #[error("Could not connect to the CRM. Please check your connection.")]
    ConnectionFailed,

    #[error("Request timed out. Please try again.")]
    Timeout,
}

// Chaves estáveis de validação de campo (o front traduz, não nós)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKey {
    InvalidFormat,
    FutureDate,
    BusinessHours,
}

impl FieldErrorKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldErrorKey::InvalidFormat => "invalid_format",
            FieldErrorKey::FutureDate => "future_date",
            FieldErrorKey::BusinessHours => "business_hours",
        }
    }
}

impl std::fmt::Display for FieldErrorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Invalid value for {field}: {key}")]
    InvalidField { field: String, key: FieldErrorKey },

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Notes are required for this disposition")]
    NotesRequired,

    #[error("Invalid disposition type: {0}")]
    InvalidDisposition(String),

    #[error("No active call")]
    NoActiveCall,

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Crm(#[from] CrmErrorKind),

    #[error("Invalid recipient email address: {0}")]
    InvalidEmail(String),

    #[error("Email credentials are not configured")]
    EmailNotConfigured,

    #[error("Email error: {0}")]
    Email(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Unknown setting: {0}")]
    SettingNotFound(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<genpdf::error::Error> for AppError {
    fn from(e: genpdf::error::Error) -> Self {
        AppError::Pdf(e.to_string())
    }
}

impl From<lettre::error::Error> for AppError {
    fn from(e: lettre::error::Error) -> Self {
        AppError::Email(e.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for AppError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        AppError::Email(e.to_string())
    }
}

impl AppError {
    /// Categoria usada no log de eventos (api / validation / email / pdf / state / internal).
    pub fn category(&self) -> &'static str {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidField { .. }
            | AppError::MissingFields(_)
            | AppError::NotesRequired
            | AppError::InvalidDisposition(_) => "validation",
            AppError::Crm(_) => "api",
            AppError::InvalidEmail(_) | AppError::EmailNotConfigured | AppError::Email(_) => "email",
            AppError::FontNotFound(_) | AppError::Pdf(_) => "pdf",
            AppError::NoActiveCall
            | AppError::NotFound(_)
            | AppError::SettingNotFound(_)
            | AppError::IoError(_)
            | AppError::JsonError(_) => "state",
            AppError::InternalServerError(_) => "internal",
        }
    }

    /// Nome curto da variante, gravado como `error_type` no log de erros.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "ValidationError",
            AppError::InvalidField { .. } => "InvalidField",
            AppError::MissingFields(_) => "MissingFields",
            AppError::NotesRequired => "NotesRequired",
            AppError::InvalidDisposition(_) => "InvalidDisposition",
            AppError::NoActiveCall => "NoActiveCall",
            AppError::NotFound(_) => "NotFound",
            AppError::Crm(_) => "CrmError",
            AppError::InvalidEmail(_) => "InvalidEmail",
            AppError::EmailNotConfigured => "EmailNotConfigured",
            AppError::Email(_) => "EmailError",
            AppError::FontNotFound(_) => "FontNotFound",
            AppError::Pdf(_) => "PdfError",
            AppError::SettingNotFound(_) => "SettingNotFound",
            AppError::IoError(_) => "IoError",
            AppError::JsonError(_) => "JsonError",
            AppError::InternalServerError(_) => "InternalServerError",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InvalidField { .. }
            | AppError::InvalidDisposition(_)
            | AppError::InvalidEmail(_) => StatusCode::BAD_REQUEST,
            AppError::MissingFields(_) | AppError::NotesRequired => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::NoActiveCall => StatusCode::CONFLICT,
            AppError::NotFound(_) | AppError::SettingNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Crm(kind) => match kind {
                CrmErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
                CrmErrorKind::NotFound => StatusCode::NOT_FOUND,
                CrmErrorKind::ServerError => StatusCode::BAD_GATEWAY,
                CrmErrorKind::ConnectionFailed => StatusCode::SERVICE_UNAVAILABLE,
                CrmErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
            },
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            // Retorna todos os detalhes da validação do `validator`.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .map(|e| e.message.as_ref().map(|m| m.to_string()).unwrap_or_else(|| e.code.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                json!({
                    "error": "One or more fields are invalid.",
                    "details": details,
                })
            }
            AppError::InvalidField { field, key } => {
                let mut details = serde_json::Map::new();
                details.insert(field.clone(), json!([key.as_str()]));
                json!({
                    "error": self.to_string(),
                    "details": details,
                })
            }
            AppError::MissingFields(fields) => json!({
                "error": self.to_string(),
                "details": { "missing": fields },
            }),
            // Erros internos não vazam detalhes para o cliente.
            // O `tracing` loga a mensagem completa que o `thiserror` montou.
            e if status.is_server_error() && !matches!(e, AppError::Crm(_)) => {
                tracing::error!("🔥 Erro interno: {}", e);
                json!({ "error": "An unexpected error occurred." })
            }
            e => json!({ "error": e.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_message_names_every_field() {
        let err = AppError::MissingFields(vec!["city".into(), "zip".into()]);
        assert_eq!(err.to_string(), "Missing required fields: city, zip");
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn crm_errors_map_to_gateway_statuses() {
        assert_eq!(AppError::Crm(CrmErrorKind::Unauthenticated).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Crm(CrmErrorKind::NotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Crm(CrmErrorKind::ServerError).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Crm(CrmErrorKind::ConnectionFailed).status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(AppError::Crm(CrmErrorKind::Timeout).status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = AppError::Pdf("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn field_keys_are_stable() {
        assert_eq!(FieldErrorKey::InvalidFormat.to_string(), "invalid_format");
        assert_eq!(FieldErrorKey::FutureDate.as_str(), "future_date");
        assert_eq!(FieldErrorKey::BusinessHours.as_str(), "business_hours");
    }
}
