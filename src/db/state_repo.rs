// src/db/state_repo.rs

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    common::{
        error::AppError,
        json_store::{load_json, save_json},
    },
    models::call::AppStateDocument,
};

pub const STATE_FILE: &str = "app_state.json";

#[derive(Clone)]
pub struct StateRepository {
    path: PathBuf,
    state: Arc<Mutex<AppStateDocument>>,
}

impl StateRepository {
    pub fn load(data_dir: &Path) -> Result<Self, AppError> {
        std::fs::create_dir_all(data_dir)?;
        let path = data_dir.join(STATE_FILE);

        // Arquivo corrompido não impede a inicialização: começa do zero e avisa
        let state = match load_json::<AppStateDocument>(&path) {
            Ok(Some(doc)) => {
                tracing::info!("Estado da aplicação carregado de {:?}", path);
                doc
            }
            Ok(None) => AppStateDocument::default(),
            Err(e) => {
                tracing::error!("Falha ao carregar o estado da aplicação ({:?}): {}", path, e);
                AppStateDocument::default()
            }
        };

        Ok(Self { path, state: Arc::new(Mutex::new(state)) })
    }

    pub async fn snapshot(&self) -> AppStateDocument {
        self.state.lock().await.clone()
    }

    /// Aplica a alteração numa cópia e regrava o documento inteiro.
    /// A memória só muda depois que o arquivo foi gravado.
    pub async fn update<F, R>(&self, change: F) -> Result<R, AppError>
    where
        F: FnOnce(&mut AppStateDocument) -> R,
    {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let result = change(&mut next);
        next.last_updated = Utc::now();
        save_json(&self.path, &next)?;
        *state = next;
        Ok(result)
    }

    pub async fn export_to(&self, target: &Path) -> Result<(), AppError> {
        let state = self.state.lock().await;
        save_json(target, &*state)
    }

    pub async fn import_from(&self, source: &Path) -> Result<(), AppError> {
        let imported: AppStateDocument = load_json(source)?
            .ok_or_else(|| AppError::NotFound(format!("State file {:?}", source)))?;

        let mut imported = imported;
        imported.last_updated = Utc::now();

        let mut state = self.state.lock().await;
        save_json(&self.path, &imported)?;
        *state = imported;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::lead::Lead;

    #[tokio::test]
    async fn updates_survive_a_reload() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StateRepository::load(dir.path()).unwrap();

        repo.update(|s| {
            s.current_call = Some(Lead { first_name: "Ann".into(), ..Default::default() });
            s.script_page = 4;
        })
        .await
        .unwrap();

        let reloaded = StateRepository::load(dir.path()).unwrap().snapshot().await;
        assert_eq!(reloaded.script_page, 4);
        assert_eq!(reloaded.current_call.unwrap().first_name, "Ann");
    }

    #[tokio::test]
    async fn failed_save_leaves_memory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StateRepository::load(dir.path()).unwrap();
        repo.update(|s| s.script_page = 2).await.unwrap();

        // Uma pasta no lugar do arquivo faz o rename falhar
        let path = dir.path().join(STATE_FILE);
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        assert!(repo.update(|s| s.script_page = 9).await.is_err());
        assert_eq!(repo.snapshot().await.script_page, 2);
    }

    #[tokio::test]
    async fn corrupt_state_file_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "{{{").unwrap();

        let repo = StateRepository::load(dir.path()).unwrap();
        let state = repo.snapshot().await;
        assert!(state.current_call.is_none());
        assert!(state.recent_calls.is_empty());
    }

    #[tokio::test]
    async fn export_then_import_restores_state() {
        let dir = tempfile::tempdir().unwrap();
        let repo = StateRepository::load(dir.path()).unwrap();
        repo.update(|s| s.script_page = 7).await.unwrap();

        let backup = dir.path().join("backup.json");
        repo.export_to(&backup).await.unwrap();
        repo.update(|s| s.script_page = 0).await.unwrap();

        repo.import_from(&backup).await.unwrap();
        assert_eq!(repo.snapshot().await.script_page, 7);

        let missing = repo.import_from(&dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }
}
