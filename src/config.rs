// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;

use crate::{
    common::error::AppError,
    db::{CrmCredentials, CrmRepository, EventRepository, LeadApi, SettingsRepository, StateRepository},
    services::{
        call_service::CallService,
        disposition_service::DispositionService,
        document_service::{DocumentRenderer, DocumentService},
        email_service::{EmailService, Mailer, SmtpConfig, SmtpMailer},
        lead_service::LeadService,
        script_service::ScriptService,
        settings_service::SettingsService,
    },
};

// Configuração de processo (variáveis STORM911_*). Preferências do agente ficam em settings.json.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub api_user: Option<String>,
    pub api_pass: Option<String>,

    pub smtp_server: String,
    pub smtp_port: u16,
    pub email: Option<String>,
    pub email_password: Option<String>,
    pub internal_email: String,

    pub data_dir: PathBuf,
    pub exports_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub fonts_dir: PathBuf,

    pub bind_addr: String,
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn var_or(key: &str, default: &str) -> String {
    var(key).unwrap_or_else(|| default.to_string())
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.readymode.com/v1".into(),
            api_timeout: Duration::from_secs(30),
            api_user: None,
            api_pass: None,
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            email: None,
            email_password: None,
            internal_email: "appointments@storm911.com".into(),
            data_dir: "data".into(),
            exports_dir: "EXPORTS".into(),
            logs_dir: "logs".into(),
            fonts_dir: "assets/fonts".into(),
            bind_addr: "127.0.0.1:3000".into(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let api_timeout = match var("STORM911_API_TIMEOUT") {
            Some(v) => Duration::from_secs(v.parse().context("STORM911_API_TIMEOUT deve ser um número de segundos")?),
            None => defaults.api_timeout,
        };
        let smtp_port = match var("STORM911_SMTP_PORT") {
            Some(v) => v.parse().context("STORM911_SMTP_PORT inválida")?,
            None => defaults.smtp_port,
        };

        Ok(Self {
            api_base_url: var_or("STORM911_API_URL", &defaults.api_base_url),
            api_timeout,
            api_user: var("STORM911_API_USER"),
            api_pass: var("STORM911_API_PASS"),
            smtp_server: var_or("STORM911_SMTP_SERVER", &defaults.smtp_server),
            smtp_port,
            email: var("STORM911_EMAIL"),
            email_password: var("STORM911_EMAIL_PASSWORD"),
            internal_email: var_or("STORM911_INTERNAL_EMAIL", &defaults.internal_email),
            data_dir: var("STORM911_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
            exports_dir: var("STORM911_EXPORTS_DIR").map(PathBuf::from).unwrap_or(defaults.exports_dir),
            logs_dir: var("STORM911_LOGS_DIR").map(PathBuf::from).unwrap_or(defaults.logs_dir),
            fonts_dir: var("STORM911_FONTS_DIR").map(PathBuf::from).unwrap_or(defaults.fonts_dir),
            bind_addr: var_or("STORM911_BIND_ADDR", &defaults.bind_addr),
        })
    }

    pub fn initial_credentials(&self) -> Option<CrmCredentials> {
        match (&self.api_user, &self.api_pass) {
            (Some(user), Some(pass)) => Some(CrmCredentials { api_user: user.clone(), api_pass: pass.clone() }),
            _ => None,
        }
    }

    pub fn smtp(&self) -> SmtpConfig {
        SmtpConfig {
            server: self.smtp_server.clone(),
            port: self.smtp_port,
            username: self.email.clone(),
            password: self.email_password.clone(),
            timeout: self.api_timeout,
        }
    }
}

// O contexto da aplicação entregue a cada handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub crm: CrmRepository,
    pub events: EventRepository,
    pub lead_service: LeadService,
    pub call_service: CallService,
    pub script_service: ScriptService,
    pub settings_service: SettingsService,
    pub email_service: EmailService,
    pub disposition_service: DispositionService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let crm = CrmRepository::new(&config.api_base_url, config.api_timeout, config.initial_credentials())?;
        let mailer: Arc<dyn Mailer> = Arc::new(SmtpMailer::new(config.smtp()));
        let renderer: Arc<dyn DocumentRenderer> =
            Arc::new(DocumentService::new(&config.exports_dir, &config.fonts_dir)?);

        let api: Arc<dyn LeadApi> = Arc::new(crm.clone());
        let state = Self::from_parts(config, crm, api, mailer, renderer).await?;

        tracing::info!("✅ Estado da aplicação montado");
        Ok(state)
    }

    // --- Monta o gráfico de dependências ---
    pub async fn from_parts(
        config: AppConfig,
        crm: CrmRepository,
        api: Arc<dyn LeadApi>,
        mailer: Arc<dyn Mailer>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Result<Self, AppError> {
        std::fs::create_dir_all(&config.exports_dir)?;

        let state_repo = StateRepository::load(&config.data_dir)?;
        let settings_repo = SettingsRepository::load(&config.data_dir)?;
        let events = EventRepository::new(&config.logs_dir)?;

        // Remetente: nome nas preferências, endereço no ambiente
        let sender_name = settings_repo.get_settings().await.email.sender_name;
        let email_service = EmailService::new(mailer, config.email.clone(), &sender_name);

        let lead_service = LeadService::new(api.clone(), state_repo.clone(), events.clone());
        let call_service = CallService::new(state_repo.clone(), settings_repo.clone(), events.clone());
        let script_service = ScriptService::new(state_repo)?;
        let settings_service = SettingsService::new(settings_repo.clone());
        let disposition_service = DispositionService::new(
            api,
            renderer,
            email_service.clone(),
            call_service.clone(),
            settings_repo,
            events.clone(),
            &config.internal_email,
        );

        Ok(Self {
            config: Arc::new(config),
            crm,
            events,
            lead_service,
            call_service,
            script_service,
            settings_service,
            email_service,
            disposition_service,
        })
    }
}
