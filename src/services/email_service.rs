// src/services/email_service.rs

use std::{path::Path, sync::Arc, time::Duration};

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};

use crate::{
    common::{error::AppError, validation::validate_email},
    models::disposition::DispositionRecord,
};

// Transporte de e-mail; nos testes entra um mailer falso que só guarda as mensagens
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: Message) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

impl SmtpConfig {
    pub fn is_configured(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
            && self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}

pub struct SmtpMailer {
    config: SmtpConfig,
}

impl SmtpMailer {
    pub fn new(config: SmtpConfig) -> Self {
        if !config.is_configured() {
            tracing::warn!("⚠️ Credenciais de e-mail ausentes (STORM911_EMAIL / STORM911_EMAIL_PASSWORD)");
        }
        Self { config }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    // Uma sessão SMTP por mensagem, sem reaproveitamento
    async fn send(&self, message: Message) -> Result<(), AppError> {
        let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) else {
            return Err(AppError::EmailNotConfigured);
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.server)?
            .port(self.config.port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .timeout(Some(self.config.timeout))
            .build();

        transport.send(message).await?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    sender_email: Option<String>,
    sender_name: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, sender_email: Option<String>, sender_name: &str) -> Self {
        Self { mailer, sender_email, sender_name: sender_name.to_string() }
    }

    fn sender(&self) -> Result<Mailbox, AppError> {
        let email = self
            .sender_email
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or(AppError::EmailNotConfigured)?;

        format!("{} <{}>", self.sender_name, email)
            .parse()
            .map_err(|_| AppError::InvalidEmail(email.to_string()))
    }

    fn recipient(email: &str) -> Result<Mailbox, AppError> {
        let normalized =
            validate_email(email).map_err(|_| AppError::InvalidEmail(email.to_string()))?;
        normalized.parse().map_err(|_| AppError::InvalidEmail(email.to_string()))
    }

    /// Monta a mensagem em texto puro, anexando o PDF quando o arquivo existe.
    pub fn build_message(
        &self,
        recipient: &str,
        subject: &str,
        body: String,
        attachment: Option<&Path>,
    ) -> Result<Message, AppError> {
        let builder = Message::builder()
            .from(self.sender()?)
            .to(Self::recipient(recipient)?)
            .subject(subject);

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(body));

        if let Some(path) = attachment.filter(|p| p.exists()) {
            let filename = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| "document.pdf".to_string());
            let content_type = ContentType::parse("application/pdf")
                .map_err(|e| AppError::Email(e.to_string()))?;
            let bytes = std::fs::read(path)?;
            parts = parts.singlepart(Attachment::new(filename).body(bytes, content_type));
        }

        Ok(builder.multipart(parts)?)
    }

    pub async fn send_appointment_confirmation(
        &self,
        recipient: &str,
        record: &DispositionRecord,
        pdf_path: Option<&Path>,
    ) -> Result<(), AppError> {
        let message = self.build_message(
            recipient,
            "Storm911 - Roof Inspection Appointment Confirmation",
            appointment_body(record),
            pdf_path,
        )?;

        self.mailer.send(message).await.inspect_err(|e| {
            tracing::error!("Falha ao enviar a confirmação de agendamento: {}", e);
        })?;
        tracing::info!("✉️ Confirmação de agendamento enviada para {}", recipient);
        Ok(())
    }

    pub async fn send_call_report(
        &self,
        recipient: &str,
        record: &DispositionRecord,
        pdf_path: Option<&Path>,
    ) -> Result<(), AppError> {
        let message =
            self.build_message(recipient, "Storm911 - Call Report", call_report_body(record), pdf_path)?;

        self.mailer.send(message).await.inspect_err(|e| {
            tracing::error!("Falha ao enviar o relatório da ligação: {}", e);
        })?;
        tracing::info!("✉️ Relatório da ligação enviado para {}", recipient);
        Ok(())
    }

    pub async fn send_test_email(&self, recipient: &str) -> Result<(), AppError> {
        let body = "This is a test email from Storm911.\n\n\
                    If you received this email, the email configuration is working correctly.\n\n\
                    Best regards,\nThe Storm911 Team\n"
            .to_string();
        let message = self.build_message(recipient, "Storm911 - Email Test", body, None)?;

        self.mailer.send(message).await?;
        tracing::info!("✉️ E-mail de teste enviado para {}", recipient);
        Ok(())
    }
}

fn appointment_body(record: &DispositionRecord) -> String {
    let duration = record
        .appointment_duration
        .as_deref()
        .map(|d| format!("Estimated duration: {}\n", d))
        .unwrap_or_default();

    format!(
        "Dear {name},\n\n\
         Thank you for scheduling your FREE roof inspection with Storm911.\n\n\
         Your appointment is confirmed for:\n\
         Date: {date}\n\
         Time: {time}\n\
         Address: {address}\n\
         {duration}\
         Confirmation Number: {confirmation}\n\n\
         What to Expect:\n\
         - Our professional inspector will arrive at the scheduled time\n\
         - We will thoroughly examine your roof for any storm damage\n\
         - You will receive a detailed report of our findings\n\n\
         Important Notes:\n\
         - No payment is required for this inspection\n\
         - We work with all insurance companies\n\
         - You will receive professional documentation of any damage found\n\n\
         If you need to reschedule or have any questions, please contact us at:\n\
         Phone: 1-800-STORM911\n\
         Email: appointments@storm911.com\n\n\
         Thank you for choosing Storm911 for your roof inspection needs.\n\n\
         Best regards,\n\
         The Storm911 Team\n",
        name = record.customer_name,
        date = record.appointment_date,
        time = record.appointment_time,
        address = record.address,
        duration = duration,
        confirmation = record.confirmation_number,
    )
}

fn call_report_body(record: &DispositionRecord) -> String {
    format!(
        "Call Report Summary\n\n\
         Disposition: {disposition}\n\
         Confirmation Number: {confirmation}\n\n\
         Customer Information:\n\
         Name: {name}\n\
         Phone: {phone}\n\
         Address: {address}\n\n\
         Roofing Information:\n\
         Stories: {stories}\n\
         Roof Age: {roof_age}\n\
         Roof Type: {roof_type}\n\n\
         Insurance Information:\n\
         Has Insurance: {has_insurance}\n\
         Insurance Company: {insurance_company}\n\n\
         Appointment Information:\n\
         Date: {date}\n\
         Time: {time}\n\n\
         Please find the detailed report attached.\n",
        disposition = record.disposition_type.label(),
        confirmation = record.confirmation_number,
        name = record.customer_name,
        phone = record.phone,
        address = record.address,
        stories = record.stories,
        roof_age = record.roof_age,
        roof_type = record.roof_type,
        has_insurance = record.has_insurance,
        insurance_company = record.insurance_company,
        date = record.appointment_date,
        time = record.appointment_time,
    )
}
