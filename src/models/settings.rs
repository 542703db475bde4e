// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Preferências do console, gravadas em `settings.json`.
// Cada categoria usa `#[serde(default)]`: chaves novas entram com o valor padrão
// quando um arquivo antigo é carregado.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Settings {
    pub appearance: AppearanceSettings,
    pub behavior: BehaviorSettings,
    pub notifications: NotificationSettings,
    pub api: ApiSettings,
    pub export: ExportSettings,
    pub email: EmailSettings,
    pub logging: LoggingSettings,
    pub security: SecuritySettings,
    pub performance: PerformanceSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct AppearanceSettings {
    pub theme: String,
    pub font_size: String,
    pub font_family: String,
    pub window_size: String,
    pub show_toolbar: bool,
    pub show_statusbar: bool,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
            font_size: "normal".into(),
            font_family: "Arial".into(),
            window_size: "1600x900".into(),
            show_toolbar: true,
            show_statusbar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct BehaviorSettings {
    pub auto_save: bool,
    pub confirm_exit: bool,
    pub confirm_dispositions: bool,
    pub show_tooltips: bool,
    pub enable_hotkeys: bool,
}

impl Default for BehaviorSettings {
    fn default() -> Self {
        Self {
            auto_save: true,
            confirm_exit: true,
            confirm_dispositions: true,
            show_tooltips: true,
            enable_hotkeys: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct NotificationSettings {
    pub enable_sound: bool,
    pub enable_popup: bool,
    pub sound_volume: i64,
    pub notification_duration: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self { enable_sound: true, enable_popup: true, sound_volume: 50, notification_duration: 5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ApiSettings {
    pub timeout: u64,
    pub retry_attempts: u32,
    pub cache_duration: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self { timeout: 30, retry_attempts: 3, cache_duration: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ExportSettings {
    pub pdf_directory: String,
    pub auto_email: bool,
    pub include_timestamp: bool,
    pub default_format: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            pdf_directory: "EXPORTS".into(),
            auto_email: true,
            include_timestamp: true,
            default_format: "pdf".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub use_tls: bool,
    pub sender_name: String,
    pub signature: bool,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: "smtp.gmail.com".into(),
            smtp_port: 587,
            use_tls: true,
            sender_name: "Storm911".into(),
            signature: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub max_file_size: u64,
    pub backup_count: u32,
    pub log_api_calls: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self { level: "INFO".into(), max_file_size: 10_485_760, backup_count: 5, log_api_calls: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct SecuritySettings {
    pub session_timeout: u64,
    pub max_login_attempts: u32,
    pub password_expiry: u32,
    pub require_2fa: bool,
}

impl Default for SecuritySettings {
    fn default() -> Self {
        Self { session_timeout: 3600, max_login_attempts: 3, password_expiry: 90, require_2fa: false }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct PerformanceSettings {
    pub cache_size: u64,
    pub max_recent_calls: usize,
    pub cleanup_interval: u64,
    pub max_export_size: u64,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self { cache_size: 100, max_recent_calls: 50, cleanup_interval: 86_400, max_export_size: 52_428_800 }
    }
}
