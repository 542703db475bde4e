// src/services/lead_service.rs

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;

use crate::{
    common::{
        error::{AppError, CrmErrorKind},
        validation::{digits_only, validate_date, validate_email, validate_phone, validate_time, validate_zip},
    },
    db::{EventRepository, LeadApi, StateRepository},
    models::{call::LastSearch, event::EventCategory, lead::Lead},
};

/// Deixa os campos preenchidos na forma canônica; campos vazios passam direto.
pub fn normalize_lead(lead: &mut Lead) -> Result<(), AppError> {
    fn check(
        field: &str,
        value: &mut String,
        validate: fn(&str) -> Result<String, crate::common::error::FieldErrorKey>,
    ) -> Result<(), AppError> {
        if value.trim().is_empty() {
            return Ok(());
        }
        *value = validate(value).map_err(|key| AppError::InvalidField { field: field.to_string(), key })?;
        Ok(())
    }

    check("phone", &mut lead.phone, validate_phone)?;
    check("cell", &mut lead.cell, validate_phone)?;
    check("email", &mut lead.email, validate_email)?;
    check("zip", &mut lead.zip, validate_zip)?;
    check("appointment_date", &mut lead.appointment_date, validate_date)?;
    check("appointment_time", &mut lead.appointment_time, validate_time)?;
    Ok(())
}

#[derive(Clone)]
pub struct LeadService {
    api: Arc<dyn LeadApi>,
    state: StateRepository,
    events: EventRepository,
}

impl LeadService {
    pub fn new(api: Arc<dyn LeadApi>, state: StateRepository, events: EventRepository) -> Self {
        Self { api, state, events }
    }

    /// Busca o lead pelo telefone e o torna a ligação atual.
    pub async fn search_by_phone(&self, phone: &str) -> Result<Lead, AppError> {
        let formatted = validate_phone(phone)
            .map_err(|key| AppError::InvalidField { field: "phone".into(), key })?;
        let digits = digits_only(&formatted);

        tracing::info!("🔎 Buscando lead pelo telefone {}", formatted);
        let result = self.api.search_lead(&digits).await;

        let found = result.is_ok();
        let lead = match result {
            Ok(mut lead) => {
                if lead.phone.trim().is_empty() {
                    lead.phone = formatted.clone();
                }
                Some(lead)
            }
            Err(CrmErrorKind::NotFound) => None,
            Err(kind) => {
                let err = AppError::Crm(kind);
                self.events.log_error(&err, json!({ "operation": "search_lead" })).await?;
                return Err(err);
            }
        };

        let current = lead.clone();
        self.state
            .update(|s| {
                s.last_search = Some(LastSearch { phone: formatted.clone(), found, timestamp: Utc::now() });
                if let Some(lead) = current {
                    s.current_call = Some(lead);
                }
            })
            .await?;

        self.events
            .log_event(EventCategory::User, "lead_search", json!({ "phone": formatted, "found": found }))
            .await?;

        lead.ok_or(AppError::Crm(CrmErrorKind::NotFound))
    }

    pub async fn create_lead(&self, mut lead: Lead) -> Result<String, AppError> {
        normalize_lead(&mut lead)?;
        let lead_id = self.api.create_lead(&lead).await?;

        tracing::info!("✅ Lead criado no CRM: {}", lead_id);
        self.events
            .log_event(EventCategory::User, "lead_created", json!({ "lead_id": lead_id }))
            .await?;
        Ok(lead_id)
    }

    pub async fn update_lead(&self, lead_id: &str, mut lead: Lead) -> Result<(), AppError> {
        normalize_lead(&mut lead)?;
        self.api.update_lead(lead_id, lead.to_crm_payload()).await?;

        self.events
            .log_event(EventCategory::User, "lead_updated", json!({ "lead_id": lead_id }))
            .await?;
        Ok(())
    }

    /// Testa as credenciais com uma busca por um telefone que não existe.
    /// "Não encontrado" também prova que o CRM aceitou o login.
    pub async fn validate_credentials(&self) -> Result<(), AppError> {
        let outcome = match self.api.search_lead("0000000000").await {
            Ok(_) | Err(CrmErrorKind::NotFound) => Ok(()),
            Err(kind) => Err(AppError::Crm(kind)),
        };

        let valid = outcome.is_ok();
        self.events
            .log_security_event("credentials_validated", json!({ "valid": valid }))
            .await?;
        outcome
    }
}
