// src/db/settings_repo.rs

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::sync::Mutex;

use crate::{
    common::{
        error::AppError,
        json_store::{load_json, save_json},
    },
    models::settings::Settings,
};

pub const SETTINGS_FILE: &str = "settings.json";

#[derive(Clone)]
pub struct SettingsRepository {
    path: PathBuf,
    settings: Arc<Mutex<Settings>>,
}

impl SettingsRepository {
    pub fn load(data_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(SETTINGS_FILE);

        // O serde(default) de cada categoria completa o que faltar no arquivo
        let settings = match load_json::<Settings>(&path) {
            Ok(Some(s)) => s,
            Ok(None) => Settings::default(),
            Err(e) => {
                tracing::error!("Falha ao carregar as configurações ({:?}): {}", path, e);
                Settings::default()
            }
        };

        Ok(Self { path, settings: Arc::new(Mutex::new(settings)) })
    }

    pub async fn get_settings(&self) -> Settings {
        self.settings.lock().await.clone()
    }

    pub async fn replace_settings(&self, settings: Settings) -> Result<Settings, AppError> {
        let mut current = self.settings.lock().await;
        save_json(&self.path, &settings)?;
        *current = settings;
        Ok(current.clone())
    }

    /// Lê, altera e grava sem soltar o lock: alterações simultâneas não se perdem.
    pub async fn modify<F>(&self, change: F) -> Result<Settings, AppError>
    where
        F: FnOnce(Settings) -> Result<Settings, AppError>,
    {
        let mut current = self.settings.lock().await;
        let updated = change(current.clone())?;
        save_json(&self.path, &updated)?;
        *current = updated;
        Ok(current.clone())
    }

    pub async fn export_to(&self, target: &Path) -> Result<(), AppError> {
        let settings = self.settings.lock().await;
        save_json(target, &*settings)
    }

    pub async fn import_from(&self, source: &Path) -> Result<Settings, AppError> {
        let imported: Settings = load_json(source)?
            .ok_or_else(|| AppError::NotFound(format!("Settings file {:?}", source)))?;
        self.replace_settings(imported).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn partial_file_is_completed_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"appearance": {"theme": "light"}, "performance": {"max_recent_calls": 5}}"#,
        )
        .unwrap();

        let settings = SettingsRepository::load(dir.path()).unwrap().get_settings().await;
        assert_eq!(settings.appearance.theme, "light");
        assert_eq!(settings.appearance.window_size, "1600x900");
        assert_eq!(settings.performance.max_recent_calls, 5);
        assert_eq!(settings.email.smtp_port, 587);
    }

    #[tokio::test]
    async fn replaced_settings_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let repo = SettingsRepository::load(dir.path()).unwrap();

        let mut settings = repo.get_settings().await;
        settings.export.auto_email = false;
        repo.replace_settings(settings).await.unwrap();

        let reloaded = SettingsRepository::load(dir.path()).unwrap().get_settings().await;
        assert!(!reloaded.export.auto_email);
    }
}
