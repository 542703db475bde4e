// src/test_support.rs
// Dublês usados pelos testes dos serviços e das rotas

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use lettre::Message;
use serde_json::{Map, Value};

use crate::{
    common::error::{AppError, CrmErrorKind},
    db::LeadApi,
    models::{
        disposition::{DispositionRecord, DispositionType},
        lead::Lead,
    },
    services::{document_service::DocumentRenderer, email_service::Mailer},
};

pub fn sample_lead() -> Lead {
    Lead {
        lead_id: Some("L-100".into()),
        first_name: "John".into(),
        last_name: "Smith".into(),
        address: "123 Main St".into(),
        city: "Dallas".into(),
        state: "TX".into(),
        zip: "75201".into(),
        phone: "(555) 123-4567".into(),
        email: "john@example.com".into(),
        stories: "2".into(),
        roof_age: "15".into(),
        roof_type: "Metal".into(),
        has_insurance: "Yes".into(),
        insurance_company: "State Farm".into(),
        is_homeowner: "Yes".into(),
        has_contractor: "No".into(),
        appointment_date: "12/01/2099".into(),
        appointment_time: "10:00 AM".into(),
        notes: "Hail damage on the north side".into(),
        ..Default::default()
    }
}

pub fn sample_record() -> DispositionRecord {
    DispositionRecord {
        disposition_type: DispositionType::AppointmentScheduled,
        confirmation_number: "CNF209912011000001234".into(),
        disposition_date: "2099-11-20".into(),
        disposition_time: "14:30:00".into(),
        customer_name: "John Smith".into(),
        address: "123 Main St, Dallas, TX, 75201".into(),
        phone: "(555) 123-4567".into(),
        email: "john@example.com".into(),
        stories: "2".into(),
        roof_age: "15".into(),
        roof_type: "Metal".into(),
        has_insurance: "Yes".into(),
        insurance_company: "State Farm".into(),
        is_homeowner: "Yes".into(),
        has_contractor: "No".into(),
        appointment_date: "12/01/2099".into(),
        appointment_time: "10:00 AM".into(),
        appointment_duration: Some("1 hour".into()),
        notes: "Hail damage on the north side".into(),
        lead_id: Some("L-100".into()),
    }
}

// --- CRM ---

#[derive(Default)]
pub struct FakeLeadApi {
    // dígitos do telefone -> lead
    pub leads: Mutex<HashMap<String, Lead>>,
    pub created: Mutex<Vec<Lead>>,
    pub updates: Mutex<Vec<(String, Map<String, Value>)>>,
    pub fail_with: Mutex<Option<CrmErrorKind>>,
}

impl FakeLeadApi {
    pub fn with_lead(phone_digits: &str, lead: Lead) -> Self {
        let api = Self::default();
        api.leads.lock().unwrap().insert(phone_digits.to_string(), lead);
        api
    }

    pub fn fail_with(&self, kind: CrmErrorKind) {
        *self.fail_with.lock().unwrap() = Some(kind);
    }

    pub fn updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.updates.lock().unwrap().clone()
    }

    fn check(&self) -> Result<(), CrmErrorKind> {
        match *self.fail_with.lock().unwrap() {
            Some(kind) => Err(kind),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LeadApi for FakeLeadApi {
    async fn search_lead(&self, phone: &str) -> Result<Lead, CrmErrorKind> {
        self.check()?;
        self.leads.lock().unwrap().get(phone).cloned().ok_or(CrmErrorKind::NotFound)
    }

    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmErrorKind> {
        self.check()?;
        let mut created = self.created.lock().unwrap();
        created.push(lead.clone());
        Ok(format!("NEW-{}", created.len()))
    }

    async fn update_lead(&self, lead_id: &str, patch: Map<String, Value>) -> Result<(), CrmErrorKind> {
        self.check()?;
        self.updates.lock().unwrap().push((lead_id.to_string(), patch));
        Ok(())
    }
}

// --- E-MAIL ---

#[derive(Default)]
pub struct FakeMailer {
    messages: Mutex<Vec<Message>>,
    fail_with: Mutex<Option<String>>,
}

impl FakeMailer {
    // Toda mensagem passa a falhar com `AppError::Email(reason)`
    pub fn fail_with(&self, reason: &str) {
        *self.fail_with.lock().unwrap() = Some(reason.to_string());
    }

    pub fn sent(&self) -> Vec<Message> {
        self.messages.lock().unwrap().clone()
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent()
            .iter()
            .flat_map(|m| m.envelope().to().iter().map(|a| a.to_string()).collect::<Vec<_>>())
            .collect()
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, message: Message) -> Result<(), AppError> {
        if let Some(reason) = self.fail_with.lock().unwrap().clone() {
            return Err(AppError::Email(reason));
        }
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

// --- PDF ---

// Grava arquivos pequenos no lugar do PDF real (não depende de fontes instaladas)
pub struct FakeRenderer {
    pub dir: PathBuf,
}

impl FakeRenderer {
    pub fn new(dir: PathBuf) -> Arc<Self> {
        Arc::new(Self { dir })
    }

    fn write(&self, prefix: &str, record: &DispositionRecord) -> Result<PathBuf, AppError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}_{}.pdf", prefix, record.confirmation_number));
        std::fs::write(&path, format!("%PDF-fake {}", record.customer_name))?;
        Ok(path)
    }
}

impl DocumentRenderer for FakeRenderer {
    fn render_call_report(&self, record: &DispositionRecord) -> Result<PathBuf, AppError> {
        self.write("call_report", record)
    }

    fn render_appointment_confirmation(&self, record: &DispositionRecord) -> Result<PathBuf, AppError> {
        self.write("appointment_confirmation", record)
    }
}
