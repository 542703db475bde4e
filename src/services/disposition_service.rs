// src/services/disposition_service.rs

use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Local};
use serde_json::{json, Map, Value};

use crate::{
    common::{
        error::AppError,
        formatting::{format_address, format_duration, format_phone, generate_confirmation_number},
    },
    db::{EventRepository, LeadApi, SettingsRepository},
    models::{
        disposition::{DispositionOption, DispositionOutcome, DispositionRecord, DispositionType},
        event::EventCategory,
        lead::Lead,
    },
    services::{call_service::CallService, document_service::DocumentRenderer, email_service::EmailService},
};

pub const APPOINTMENT_REQUIRED_FIELDS: [&str; 8] = [
    "customer_name",
    "address",
    "city",
    "state",
    "zip",
    "phone",
    "appointment_date",
    "appointment_time",
];

pub fn options() -> Vec<DispositionOption> {
    DispositionType::ALL.iter().map(DispositionType::option).collect()
}

/// Confere o tipo, as notas obrigatórias e, para agendamento, os campos exigidos.
pub fn validate(disposition: &str, lead: &Lead, notes: &str) -> Result<DispositionType, AppError> {
    let disposition: DispositionType = disposition.parse()?;

    if disposition.requires_notes() && notes.trim().is_empty() {
        return Err(AppError::NotesRequired);
    }

    if disposition == DispositionType::AppointmentScheduled {
        let missing = lead.missing_fields(&APPOINTMENT_REQUIRED_FIELDS);
        if !missing.is_empty() {
            return Err(AppError::MissingFields(missing));
        }
    }

    Ok(disposition)
}

/// Duração estimada da inspeção em minutos.
pub fn appointment_duration_minutes(lead: &Lead) -> u32 {
    let mut minutes = 30;

    let roof_type = lead.roof_type.to_lowercase();
    if roof_type.contains("metal") {
        minutes += 15;
    } else if roof_type.contains("tile") {
        minutes += 20;
    } else if roof_type.contains("slate") {
        minutes += 25;
    }

    let stories = lead.stories.to_lowercase();
    if stories.contains('2') {
        minutes += 15;
    } else if stories.contains('3') || stories.contains("three") {
        minutes += 30;
    }

    minutes
}

pub fn prepare_record(
    disposition: DispositionType,
    lead: &Lead,
    confirmation_number: &str,
    notes: &str,
    now: DateTime<Local>,
) -> DispositionRecord {
    let appointment_duration = (disposition == DispositionType::AppointmentScheduled)
        .then(|| format_duration(appointment_duration_minutes(lead)));

    DispositionRecord {
        disposition_type: disposition,
        confirmation_number: confirmation_number.to_string(),
        disposition_date: now.format("%Y-%m-%d").to_string(),
        disposition_time: now.format("%H:%M:%S").to_string(),
        customer_name: lead.customer_name(),
        address: format_address(&lead.address, &lead.city, &lead.state, &lead.zip),
        phone: format_phone(&lead.phone),
        email: lead.email.clone(),
        stories: lead.stories.clone(),
        roof_age: lead.roof_age.clone(),
        roof_type: lead.roof_type.clone(),
        has_insurance: lead.has_insurance.clone(),
        insurance_company: lead.insurance_company.clone(),
        is_homeowner: lead.is_homeowner.clone(),
        has_contractor: lead.has_contractor.clone(),
        appointment_date: lead.appointment_date.clone(),
        appointment_time: lead.appointment_time.clone(),
        appointment_duration,
        notes: notes.to_string(),
        lead_id: lead.lead_id.clone(),
    }
}

#[derive(Clone)]
pub struct DispositionService {
    api: Arc<dyn LeadApi>,
    renderer: Arc<dyn DocumentRenderer>,
    email: EmailService,
    calls: CallService,
    settings: SettingsRepository,
    events: EventRepository,
    internal_recipient: String,
}

impl DispositionService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        api: Arc<dyn LeadApi>,
        renderer: Arc<dyn DocumentRenderer>,
        email: EmailService,
        calls: CallService,
        settings: SettingsRepository,
        events: EventRepository,
        internal_recipient: &str,
    ) -> Self {
        Self {
            api,
            renderer,
            email,
            calls,
            settings,
            events,
            internal_recipient: internal_recipient.to_string(),
        }
    }

    // genpdf é síncrono: renderiza fora das threads do runtime
    async fn render<F>(&self, record: &DispositionRecord, render: F) -> Result<PathBuf, AppError>
    where
        F: FnOnce(&dyn DocumentRenderer, &DispositionRecord) -> Result<PathBuf, AppError> + Send + 'static,
    {
        let renderer = self.renderer.clone();
        let record = record.clone();
        tokio::task::spawn_blocking(move || render(renderer.as_ref(), &record))
            .await
            .map_err(|e| AppError::InternalServerError(e.into()))?
    }

    /// Processa o fim da ligação. Sem `lead`, usa a ligação atual.
    /// Um passo que falha interrompe o restante; os arquivos já gerados ficam onde estão.
    pub async fn process(
        &self,
        disposition: &str,
        lead: Option<Lead>,
        notes: &str,
    ) -> Result<DispositionOutcome, AppError> {
        let from_current = lead.is_none();
        let lead = match lead {
            Some(lead) => lead,
            None => self.calls.current_call().await.ok_or(AppError::NoActiveCall)?,
        };

        match self.run_pipeline(disposition, lead, notes, from_current).await {
            Ok(outcome) => {
                self.events
                    .log_event(
                        EventCategory::User,
                        "call_disposition",
                        json!({
                            "disposition": outcome.disposition.id(),
                            "confirmation_number": outcome.confirmation_number,
                            "lead_id": outcome.lead_id,
                        }),
                    )
                    .await?;
                Ok(outcome)
            }
            Err(e) => {
                tracing::error!("❌ Falha ao processar a disposição '{}': {}", disposition, e);
                self.events
                    .log_error(&e, json!({ "operation": "process_disposition", "disposition": disposition }))
                    .await?;
                Err(e)
            }
        }
    }

    async fn run_pipeline(
        &self,
        disposition: &str,
        mut lead: Lead,
        notes: &str,
        from_current: bool,
    ) -> Result<DispositionOutcome, AppError> {
        // 1. Validação
        let disposition = validate(disposition, &lead, notes)?;

        // 2. Número de confirmação
        let confirmation_number = generate_confirmation_number();
        tracing::info!("📋 Disposição {} ({})", disposition, confirmation_number);

        // 3. Registro
        let record = prepare_record(disposition, &lead, &confirmation_number, notes, Local::now());

        // 4. Relatório da ligação
        let report_path = self.render(&record, |r, rec| r.render_call_report(rec)).await?;

        // 5. Agendamento: carta de confirmação e e-mails
        let mut confirmation_path = None;
        let mut emails_sent = Vec::new();
        if disposition == DispositionType::AppointmentScheduled {
            let path = self.render(&record, |r, rec| r.render_appointment_confirmation(rec)).await?;

            if self.settings.get_settings().await.export.auto_email {
                if !record.email.trim().is_empty() {
                    self.email
                        .send_appointment_confirmation(&record.email, &record, Some(&path))
                        .await?;
                    emails_sent.push(record.email.clone());
                }
                self.email
                    .send_call_report(&self.internal_recipient, &record, Some(&report_path))
                    .await?;
                emails_sent.push(self.internal_recipient.clone());
            } else {
                tracing::info!("Envio automático de e-mails desligado; nenhum e-mail enviado");
            }
            confirmation_path = Some(path);
        }

        // 6. CRM (cria o lead antes quando a ligação não veio de uma busca)
        let lead_id = match lead.lead_id.clone().filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => {
                let id = self.api.create_lead(&lead).await?;
                tracing::info!("Lead criado no CRM durante a disposição: {}", id);
                id
            }
        };

        let mut patch = Map::new();
        patch.insert("disposition".into(), Value::String(disposition.id().to_string()));
        patch.insert("notes".into(), Value::String(notes.to_string()));
        patch.insert("confirmationNumber".into(), Value::String(confirmation_number.clone()));
        self.api.update_lead(&lead_id, patch).await?;

        // 7. Histórico
        lead.lead_id = Some(lead_id.clone());
        lead.notes = notes.to_string();
        self.calls.finish_call(lead, disposition, &confirmation_number, from_current).await?;

        tracing::info!("✅ Disposição concluída: {} (lead {})", confirmation_number, lead_id);
        Ok(DispositionOutcome {
            confirmation_number,
            disposition,
            report_path,
            confirmation_path,
            emails_sent,
            lead_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::StateRepository,
        test_support::{sample_lead, FakeLeadApi, FakeMailer, FakeRenderer},
    };
    use chrono::TimeZone;
    use regex::Regex;
    use std::path::Path;

    struct Harness {
        service: DispositionService,
        api: Arc<FakeLeadApi>,
        mailer: Arc<FakeMailer>,
        calls: CallService,
        settings: SettingsRepository,
        events: EventRepository,
    }

    fn harness(dir: &Path) -> Harness {
        let api = Arc::new(FakeLeadApi::default());
        let mailer = Arc::new(FakeMailer::default());
        let state = StateRepository::load(&dir.join("data")).unwrap();
        let settings = SettingsRepository::load(&dir.join("data")).unwrap();
        let events = EventRepository::new(&dir.join("logs")).unwrap();
        let calls = CallService::new(state, settings.clone(), events.clone());
        let email = EmailService::new(mailer.clone(), Some("agent@storm911.com".into()), "Storm911");

        let service = DispositionService::new(
            api.clone(),
            FakeRenderer::new(dir.join("EXPORTS")),
            email,
            calls.clone(),
            settings.clone(),
            events.clone(),
            "appointments@storm911.com",
        );
        Harness { service, api, mailer, calls, settings, events }
    }

    #[test]
    fn options_list_every_disposition() {
        let options = options();
        assert_eq!(options.len(), 9);
        let with_confirmation: Vec<_> =
            options.iter().filter(|o| o.requires_confirmation).map(|o| o.id).collect();
        assert_eq!(with_confirmation, [DispositionType::AppointmentScheduled]);
    }

    #[test]
    fn appointment_with_missing_fields_names_them() {
        let lead = Lead { city: String::new(), zip: "  ".into(), ..sample_lead() };
        let err = validate("appointment_scheduled", &lead, "notes").unwrap_err();

        assert!(matches!(&err, AppError::MissingFields(f) if f == &["city", "zip"]));
        assert_eq!(err.to_string(), "Missing required fields: city, zip");
    }

    #[test]
    fn notes_are_enforced_only_where_required() {
        let lead = Lead::default();
        assert!(matches!(validate("not_interested", &lead, "  "), Err(AppError::NotesRequired)));
        assert!(matches!(validate("do_not_call", &lead, ""), Err(AppError::NotesRequired)));
        assert_eq!(validate("no_answer", &lead, "").unwrap(), DispositionType::NoAnswer);
        assert!(matches!(validate("voicemail", &lead, "x"), Err(AppError::InvalidDisposition(_))));
    }

    #[test]
    fn duration_depends_on_roof_and_stories() {
        let lead = |roof: &str, stories: &str| Lead {
            roof_type: roof.into(),
            stories: stories.into(),
            ..Default::default()
        };
        assert_eq!(appointment_duration_minutes(&lead("Asphalt", "1")), 30);
        assert_eq!(appointment_duration_minutes(&lead("Metal", "2")), 60);
        assert_eq!(appointment_duration_minutes(&lead("Clay Tile", "Three")), 80);
        assert_eq!(appointment_duration_minutes(&lead("slate", "3")), 85);
    }

    #[test]
    fn record_is_derived_from_the_call() {
        let now = Local.with_ymd_and_hms(2099, 11, 20, 14, 30, 5).unwrap();
        let record = prepare_record(
            DispositionType::AppointmentScheduled,
            &sample_lead(),
            "CNF209911201430050001",
            "Hail",
            now,
        );

        assert_eq!(record.disposition_date, "2099-11-20");
        assert_eq!(record.disposition_time, "14:30:05");
        assert_eq!(record.customer_name, "John Smith");
        assert_eq!(record.address, "123 Main St, Dallas, TX, 75201");
        assert_eq!(record.appointment_duration.as_deref(), Some("1 hour"));
        assert_eq!(record.notes, "Hail");

        let other = prepare_record(DispositionType::Busy, &sample_lead(), "CNF", "", now);
        assert!(other.appointment_duration.is_none());
    }

    #[tokio::test]
    async fn appointment_pipeline_renders_emails_and_updates_the_crm() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());

        let outcome = h
            .service
            .process("appointment_scheduled", Some(sample_lead()), "Hail damage")
            .await
            .unwrap();

        assert!(Regex::new(r"^CNF\d{14}\d{4}$").unwrap().is_match(&outcome.confirmation_number));
        assert!(outcome.report_path.exists());
        assert!(outcome.confirmation_path.as_ref().unwrap().exists());
        assert_eq!(outcome.emails_sent, ["john@example.com", "appointments@storm911.com"]);
        assert_eq!(h.mailer.recipients(), ["john@example.com", "appointments@storm911.com"]);

        let updates = h.api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "L-100");
        assert_eq!(updates[0].1["disposition"], "appointment_scheduled");
        assert_eq!(updates[0].1["confirmationNumber"], outcome.confirmation_number.as_str());

        let recent = h.calls.recent_calls(None).await;
        assert_eq!(recent[0].disposition, Some(DispositionType::AppointmentScheduled));
        assert_eq!(h.events.event_counts().await.user, 1);
    }

    #[tokio::test]
    async fn call_without_lead_id_creates_the_lead_first() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        let lead = Lead { lead_id: None, ..sample_lead() };

        let outcome = h.service.process("no_answer", Some(lead), "").await.unwrap();

        assert_eq!(outcome.lead_id, "NEW-1");
        assert_eq!(h.api.updates()[0].0, "NEW-1");
        assert!(outcome.confirmation_path.is_none());
        assert!(h.mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn auto_email_off_skips_all_mail() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        let mut settings = h.settings.get_settings().await;
        settings.export.auto_email = false;
        h.settings.replace_settings(settings).await.unwrap();

        let outcome = h.service.process("appointment_scheduled", Some(sample_lead()), "ok").await.unwrap();
        assert!(outcome.emails_sent.is_empty());
        assert!(h.mailer.sent().is_empty());
        assert_eq!(h.api.updates().len(), 1);
    }

    #[tokio::test]
    async fn crm_failure_aborts_and_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        h.api.fail_with(crate::common::error::CrmErrorKind::ServerError);

        let err = h.service.process("busy", Some(sample_lead()), "").await.unwrap_err();
        assert!(matches!(err, AppError::Crm(_)));
        assert!(h.calls.recent_calls(None).await.is_empty());

        let summary = h.events.error_summary().await.unwrap();
        assert_eq!(summary.error_types["CrmError"], 1);
    }

    #[tokio::test]
    async fn email_failure_keeps_pdfs_and_skips_crm_and_history() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        h.calls.set_current_call(sample_lead()).await.unwrap();
        h.mailer.fail_with("connection refused");

        let err = h.service.process("appointment_scheduled", None, "Hail").await.unwrap_err();
        assert!(matches!(err, AppError::Email(_)));

        // Os PDFs gerados antes do envio continuam em disco
        let pdfs: Vec<_> = std::fs::read_dir(dir.path().join("EXPORTS"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(pdfs.len(), 2);
        assert!(pdfs.iter().any(|p| p.starts_with("call_report_")));
        assert!(pdfs.iter().any(|p| p.starts_with("appointment_confirmation_")));

        assert!(h.api.updates().is_empty());
        assert!(h.calls.current_call().await.is_some());
        assert!(h.calls.recent_calls(None).await.is_empty());

        let summary = h.events.error_summary().await.unwrap();
        assert_eq!(summary.error_types["EmailError"], 1);
    }

    #[tokio::test]
    async fn disposing_another_lead_keeps_the_active_call() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        let active = Lead { lead_id: Some("ACTIVE".into()), ..sample_lead() };
        h.calls.set_current_call(active).await.unwrap();

        let other = Lead { lead_id: Some("OTHER".into()), ..sample_lead() };
        h.service.process("busy", Some(other), "").await.unwrap();

        let current = h.calls.current_call().await.unwrap();
        assert_eq!(current.lead_id.as_deref(), Some("ACTIVE"));
        let recent = h.calls.recent_calls(None).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].lead.lead_id.as_deref(), Some("OTHER"));

        // Sem `lead`, a disposição usa e libera a ligação atual
        h.service.process("busy", None, "").await.unwrap();
        assert!(h.calls.current_call().await.is_none());
        assert_eq!(h.calls.recent_calls(None).await.len(), 2);
    }

    #[tokio::test]
    async fn no_current_call_means_nothing_to_dispose() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness(dir.path());
        let err = h.service.process("busy", None, "").await.unwrap_err();
        assert!(matches!(err, AppError::NoActiveCall));
    }
}
