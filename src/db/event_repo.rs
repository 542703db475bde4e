// src/db/event_repo.rs

use std::{
    collections::BTreeMap,
    fs::{self, File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, Local, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use zip::write::SimpleFileOptions;

use crate::{
    common::{error::AppError, formatting::mask_sensitive_data},
    models::event::{ErrorSummary, Event, EventCategory, EventCounts},
};

pub const EVENTS_FILE: &str = "events.log";
pub const ERROR_FILE: &str = "error.log";
pub const SECURITY_FILE: &str = "security.log";

const LOG_FILES: [&str; 3] = [EVENTS_FILE, ERROR_FILE, SECURITY_FILE];

// Log de eventos em JSON lines: um arquivo para eventos comuns, um para erros e um para segurança
#[derive(Clone)]
pub struct EventRepository {
    logs_dir: PathBuf,
    counts: Arc<Mutex<EventCounts>>,
}

impl EventRepository {
    pub fn new(logs_dir: &Path) -> Result<Self, AppError> {
        fs::create_dir_all(logs_dir)?;
        Ok(Self {
            logs_dir: logs_dir.to_path_buf(),
            counts: Arc::new(Mutex::new(EventCounts::default())),
        })
    }

    fn file_for(&self, category: EventCategory) -> PathBuf {
        let name = match category {
            EventCategory::Error => ERROR_FILE,
            EventCategory::Security => SECURITY_FILE,
            EventCategory::User | EventCategory::System => EVENTS_FILE,
        };
        self.logs_dir.join(name)
    }

    pub async fn log_event(
        &self,
        category: EventCategory,
        event_type: &str,
        data: Value,
    ) -> Result<(), AppError> {
        let event = Event {
            timestamp: Utc::now(),
            category,
            event_type: event_type.to_string(),
            data: mask_sensitive_data(&data),
        };

        let mut counts = self.counts.lock().await;
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.file_for(category))?;
        file.write_all(line.as_bytes())?;

        counts.bump(category);
        tracing::debug!(category = ?category, event_type, "evento registrado");
        Ok(())
    }

    /// Registro de erro no formato `{error_type, error_message, context}`.
    pub async fn log_error(&self, error: &AppError, context: Value) -> Result<(), AppError> {
        let data = json!({
            "error_type": error.kind(),
            "error_message": error.to_string(),
            "context": context,
        });
        self.log_event(EventCategory::Error, "exception", data).await
    }

    pub async fn log_security_event(&self, event_type: &str, details: Value) -> Result<(), AppError> {
        self.log_event(EventCategory::Security, event_type, details).await
    }

    // Contadores do processo atual (zeram ao reiniciar)
    pub async fn event_counts(&self) -> EventCounts {
        *self.counts.lock().await
    }

    pub async fn recent_events(
        &self,
        category: Option<EventCategory>,
        limit: usize,
    ) -> Result<Vec<Event>, AppError> {
        let path = self.file_for(category.unwrap_or(EventCategory::User));
        let _guard = self.counts.lock().await;

        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        let lines: Vec<&str> = raw.lines().filter(|l| !l.trim().is_empty()).collect();
        let start = lines.len().saturating_sub(limit);

        // Linhas ilegíveis são ignoradas
        let events = lines[start..]
            .iter()
            .filter_map(|l| serde_json::from_str::<Event>(l).ok())
            .filter(|e| category.is_none_or(|c| e.category == c))
            .collect();
        Ok(events)
    }

    pub async fn error_summary(&self) -> Result<ErrorSummary, AppError> {
        let errors = self.recent_events(Some(EventCategory::Error), 100).await?;

        let mut error_types: BTreeMap<String, usize> = BTreeMap::new();
        for error in &errors {
            let kind = error
                .data
                .get("error_type")
                .and_then(Value::as_str)
                .unwrap_or("unknown");
            *error_types.entry(kind.to_string()).or_default() += 1;
        }

        Ok(ErrorSummary {
            total_errors: errors.len(),
            error_types,
            most_recent: errors.last().cloned(),
        })
    }

    pub async fn clear_logs(&self) -> Result<(), AppError> {
        let mut counts = self.counts.lock().await;
        for name in LOG_FILES {
            File::create(self.logs_dir.join(name))?;
        }
        *counts = EventCounts::default();
        tracing::info!("Arquivos de eventos limpos");
        Ok(())
    }

    /// Compacta em `archive/{nome}.{AAAAMMDD}.zip` os arquivos com `days` dias ou mais e os esvazia.
    /// Arquivos vazios ficam de fora; um zip já existente nunca é sobrescrito.
    /// Retorna os caminhos dos arquivos gerados.
    pub async fn archive_old_logs(&self, days: i64) -> Result<Vec<PathBuf>, AppError> {
        let _guard = self.counts.lock().await;
        let archive_dir = self.logs_dir.join("archive");
        fs::create_dir_all(&archive_dir)?;

        let now = Local::now();
        let mut archived = Vec::new();

        for name in LOG_FILES {
            let path = self.logs_dir.join(name);
            if !path.exists() {
                continue;
            }

            let metadata = fs::metadata(&path)?;
            if metadata.len() == 0 {
                continue;
            }

            let mtime: DateTime<Local> = metadata.modified()?.into();
            if (now - mtime).num_days() < days {
                continue;
            }

            let archive_path = free_archive_path(&archive_dir, name, &mtime.format("%Y%m%d").to_string());
            let contents = fs::read(&path)?;
            write_zip(&archive_path, name, &contents)?;
            File::create(&path)?;

            tracing::info!("📦 Log arquivado: {:?}", archive_path);
            archived.push(archive_path);
        }

        Ok(archived)
    }
}

// `events.log.20260510.zip`, depois `events.log.20260510.1.zip`, ...
fn free_archive_path(archive_dir: &Path, name: &str, stamp: &str) -> PathBuf {
    let first = archive_dir.join(format!("{}.{}.zip", name, stamp));
    if !first.exists() {
        return first;
    }
    (1..)
        .map(|n| archive_dir.join(format!("{}.{}.{}.zip", name, stamp, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

fn write_zip(archive_path: &Path, entry_name: &str, contents: &[u8]) -> Result<(), AppError> {
    let file = OpenOptions::new().write(true).create_new(true).open(archive_path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(entry_name, options)
        .map_err(|e| AppError::InternalServerError(e.into()))?;
    zip.write_all(contents)?;
    zip.finish().map_err(|e| AppError::InternalServerError(e.into()))?;
    Ok(())
}
