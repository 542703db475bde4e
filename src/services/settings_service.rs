// src/services/settings_service.rs

use std::{collections::BTreeMap, path::Path};

use serde_json::Value;

use crate::{
    common::error::{AppError, FieldErrorKey},
    db::SettingsRepository,
    models::settings::Settings,
};

pub const VALID_SMTP_PORTS: [u16; 3] = [25, 465, 587];

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self) -> Settings {
        self.repo.get_settings().await
    }

    /// Valor de uma chave; o que faltar no arquivo vem dos padrões.
    pub async fn get(&self, category: &str, key: &str) -> Result<Value, AppError> {
        let current = serde_json::to_value(self.repo.get_settings().await)?;
        if let Some(value) = current.get(category).and_then(|c| c.get(key)) {
            return Ok(value.clone());
        }

        let defaults = serde_json::to_value(Settings::default())?;
        defaults
            .get(category)
            .and_then(|c| c.get(key))
            .cloned()
            .ok_or_else(|| AppError::SettingNotFound(format!("{}.{}", category, key)))
    }

    // A troca passa pelo JSON e volta para `Settings`: valor do tipo errado não desserializa
    pub async fn set(&self, category: &str, key: &str, value: Value) -> Result<Settings, AppError> {
        let updated = self
            .repo
            .modify(|current| {
                let mut doc = serde_json::to_value(current)?;

                let slot = doc
                    .get_mut(category)
                    .and_then(|c| c.get_mut(key))
                    .ok_or_else(|| AppError::SettingNotFound(format!("{}.{}", category, key)))?;
                *slot = value;

                serde_json::from_value(doc).map_err(|_| AppError::InvalidField {
                    field: format!("{}.{}", category, key),
                    key: FieldErrorKey::InvalidFormat,
                })
            })
            .await?;

        tracing::info!("⚙️ Configuração alterada: {}.{}", category, key);
        Ok(updated)
    }

    pub async fn reset_category(&self, category: &str) -> Result<Settings, AppError> {
        let defaults = serde_json::to_value(Settings::default())?;
        let default_category = defaults
            .get(category)
            .cloned()
            .ok_or_else(|| AppError::SettingNotFound(category.to_string()))?;

        self.repo
            .modify(|current| {
                let mut doc = serde_json::to_value(current)?;
                if let Some(slot) = doc.get_mut(category) {
                    *slot = default_category;
                }
                Ok(serde_json::from_value(doc)?)
            })
            .await
    }

    pub async fn reset_all(&self) -> Result<Settings, AppError> {
        self.repo.replace_settings(Settings::default()).await
    }

    /// Problemas encontrados, agrupados por categoria. Vazio quando está tudo certo.
    pub async fn validate(&self) -> BTreeMap<String, Vec<String>> {
        validate_settings(&self.repo.get_settings().await)
    }

    pub async fn export_to(&self, target: &Path) -> Result<(), AppError> {
        self.repo.export_to(target).await
    }

    pub async fn import_from(&self, source: &Path) -> Result<Settings, AppError> {
        self.repo.import_from(source).await
    }
}

pub fn validate_settings(settings: &Settings) -> BTreeMap<String, Vec<String>> {
    let mut issues: BTreeMap<String, Vec<String>> = BTreeMap::new();
    let mut add = |category: &str, message: &str| {
        issues.entry(category.to_string()).or_default().push(message.to_string());
    };

    if !settings.appearance.window_size.contains('x') {
        add("appearance", "Invalid window size format");
    }
    if !(0..=100).contains(&settings.notifications.sound_volume) {
        add("notifications", "Sound volume must be 0-100");
    }
    if settings.security.session_timeout < 300 {
        add("security", "Session timeout too short");
    }
    if !VALID_SMTP_PORTS.contains(&settings.email.smtp_port) {
        add("email", "Invalid SMTP port");
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service(dir: &Path) -> SettingsService {
        SettingsService::new(SettingsRepository::load(dir).unwrap())
    }

    #[tokio::test]
    async fn get_and_set_round_trip_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        assert_eq!(service.get("email", "smtp_port").await.unwrap(), json!(587));
        service.set("email", "smtp_port", json!(465)).await.unwrap();

        let reloaded = SettingsService::new(SettingsRepository::load(dir.path()).unwrap());
        assert_eq!(reloaded.get_all().await.email.smtp_port, 465);
    }

    #[tokio::test]
    async fn unknown_keys_and_wrong_types_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        assert!(matches!(
            service.set("email", "nope", json!(1)).await,
            Err(AppError::SettingNotFound(_))
        ));
        assert!(matches!(
            service.set("email", "smtp_port", json!("not a port")).await,
            Err(AppError::InvalidField { .. })
        ));
        assert!(matches!(service.get("nope", "x").await, Err(AppError::SettingNotFound(_))));

        // Nada foi gravado
        assert_eq!(service.get_all().await, Settings::default());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_updates_to_different_keys_all_stick() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let changes = [
            ("appearance", "theme", json!("light")),
            ("export", "auto_email", json!(false)),
            ("email", "smtp_port", json!(465)),
            ("notifications", "sound_volume", json!(10)),
        ];
        let tasks: Vec<_> = changes
            .into_iter()
            .map(|(category, key, value)| {
                let service = service.clone();
                tokio::spawn(async move { service.set(category, key, value).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let reloaded = SettingsService::new(SettingsRepository::load(dir.path()).unwrap()).get_all().await;
        assert_eq!(reloaded.appearance.theme, "light");
        assert!(!reloaded.export.auto_email);
        assert_eq!(reloaded.email.smtp_port, 465);
        assert_eq!(reloaded.notifications.sound_volume, 10);
    }

    #[tokio::test]
    async fn reset_category_leaves_other_categories_alone() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        service.set("appearance", "theme", json!("light")).await.unwrap();
        service.set("export", "auto_email", json!(false)).await.unwrap();

        let settings = service.reset_category("appearance").await.unwrap();
        assert_eq!(settings.appearance.theme, "dark");
        assert!(!settings.export.auto_email);

        assert_eq!(service.reset_all().await.unwrap(), Settings::default());
    }

    #[test]
    fn validation_flags_each_bad_value() {
        let mut settings = Settings::default();
        assert!(validate_settings(&settings).is_empty());

        settings.appearance.window_size = "1600".into();
        settings.notifications.sound_volume = 150;
        settings.security.session_timeout = 60;
        settings.email.smtp_port = 2525;

        let issues = validate_settings(&settings);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues["email"], ["Invalid SMTP port"]);
        assert_eq!(issues["notifications"], ["Sound volume must be 0-100"]);
    }
}
