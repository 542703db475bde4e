// src/services/call_service.rs

use std::{collections::BTreeMap, path::Path};

use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::digits_only},
    db::{EventRepository, SettingsRepository, StateRepository},
    models::{
        call::{AppStateDocument, CallRecord, CallStatistics, LastSearch},
        disposition::DispositionType,
        event::EventCategory,
        lead::Lead,
    },
    services::lead_service::normalize_lead,
};

// Mais recente primeiro, cortando o excedente do fim da lista
fn push_recent(state: &mut AppStateDocument, record: CallRecord, max_recent: usize) {
    state.recent_calls.insert(0, record);
    state.recent_calls.truncate(max_recent);
}

#[derive(Clone)]
pub struct CallService {
    state: StateRepository,
    settings: SettingsRepository,
    events: EventRepository,
}

impl CallService {
    pub fn new(state: StateRepository, settings: SettingsRepository, events: EventRepository) -> Self {
        Self { state, settings, events }
    }

    async fn max_recent_calls(&self) -> usize {
        self.settings.get_settings().await.performance.max_recent_calls
    }

    pub async fn current_call(&self) -> Option<Lead> {
        self.state.snapshot().await.current_call
    }

    pub async fn set_current_call(&self, mut lead: Lead) -> Result<Lead, AppError> {
        normalize_lead(&mut lead)?;
        let saved = lead.clone();
        self.state.update(|s| s.current_call = Some(lead)).await?;
        Ok(saved)
    }

    /// Encerra a ligação sem disposição: ela vai para o histórico recente.
    pub async fn clear_current_call(&self) -> Result<Option<CallRecord>, AppError> {
        let max_recent = self.max_recent_calls().await;

        let record = self
            .state
            .update(|s| {
                let lead = s.current_call.take()?;
                let record = CallRecord {
                    call_id: Uuid::new_v4(),
                    timestamp: Utc::now(),
                    lead,
                    disposition: None,
                    confirmation_number: None,
                };
                push_recent(s, record.clone(), max_recent);
                Some(record)
            })
            .await?;

        if let Some(r) = &record {
            self.events
                .log_event(EventCategory::User, "call_cleared", json!({ "call_id": r.call_id }))
                .await?;
        }
        Ok(record)
    }

    /// Último passo da disposição: grava a ligação com o resultado.
    /// A ligação atual só é liberada quando `from_current` ou quando é o mesmo lead.
    pub async fn finish_call(
        &self,
        lead: Lead,
        disposition: DispositionType,
        confirmation_number: &str,
        from_current: bool,
    ) -> Result<CallRecord, AppError> {
        let max_recent = self.max_recent_calls().await;
        let record = CallRecord {
            call_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            lead,
            disposition: Some(disposition),
            confirmation_number: Some(confirmation_number.to_string()),
        };

        let saved = record.clone();
        self.state
            .update(|s| {
                let same_lead = s.current_call.as_ref().is_some_and(|current| {
                    current.lead_id.is_some() && current.lead_id == saved.lead.lead_id
                });
                if from_current || same_lead {
                    s.current_call = None;
                }
                push_recent(s, saved, max_recent);
            })
            .await?;
        Ok(record)
    }

    pub async fn last_search(&self) -> Option<LastSearch> {
        self.state.snapshot().await.last_search
    }

    pub async fn recent_calls(&self, limit: Option<usize>) -> Vec<CallRecord> {
        let mut calls = self.state.snapshot().await.recent_calls;
        if let Some(limit) = limit {
            calls.truncate(limit);
        }
        calls
    }

    pub async fn clear_recent_calls(&self) -> Result<(), AppError> {
        self.state.update(|s| s.recent_calls.clear()).await?;
        self.events
            .log_event(EventCategory::User, "recent_calls_cleared", json!({}))
            .await
    }

    // Compara só os dígitos: "(555) 123-4567" e "5551234567" são o mesmo número
    pub async fn call_history(&self, phone: &str) -> Vec<CallRecord> {
        let wanted = digits_only(phone);
        self.state
            .snapshot()
            .await
            .recent_calls
            .into_iter()
            .filter(|c| !wanted.is_empty() && digits_only(&c.lead.phone) == wanted)
            .collect()
    }

    pub async fn statistics(&self) -> CallStatistics {
        let state = self.state.snapshot().await;
        let total_calls = state.recent_calls.len();

        let mut dispositions: BTreeMap<String, usize> = BTreeMap::new();
        for disposition in state.recent_calls.iter().filter_map(|c| c.disposition) {
            *dispositions.entry(disposition.id().to_string()).or_default() += 1;
        }

        let appointments = dispositions
            .get(DispositionType::AppointmentScheduled.id())
            .copied()
            .unwrap_or(0);
        let appointment_rate =
            if total_calls > 0 { appointments as f64 / total_calls as f64 } else { 0.0 };

        CallStatistics { total_calls, dispositions, appointment_rate, last_updated: state.last_updated }
    }

    /// Remove do histórico as ligações com mais de `days` dias. Retorna quantas saíram.
    pub async fn cleanup_old_data(&self, days: i64) -> Result<usize, AppError> {
        let cutoff = Utc::now() - Duration::days(days);
        let removed = self
            .state
            .update(|s| {
                let before = s.recent_calls.len();
                s.recent_calls.retain(|c| c.timestamp > cutoff);
                before - s.recent_calls.len()
            })
            .await?;

        tracing::info!("🧹 Limpeza de dados com mais de {} dias: {} ligações removidas", days, removed);
        Ok(removed)
    }

    pub async fn export_state(&self, target: &Path) -> Result<(), AppError> {
        self.state.export_to(target).await?;
        self.events
            .log_event(EventCategory::System, "state_exported", json!({ "path": target }))
            .await
    }

    pub async fn import_state(&self, source: &Path) -> Result<(), AppError> {
        self.state.import_from(source).await?;
        self.events
            .log_event(EventCategory::System, "state_imported", json!({ "path": source }))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_lead;

    async fn service(dir: &Path, max_recent: usize) -> CallService {
        let settings = SettingsRepository::load(&dir.join("data")).unwrap();
        let mut s = settings.get_settings().await;
        s.performance.max_recent_calls = max_recent;
        settings.replace_settings(s).await.unwrap();

        CallService::new(
            StateRepository::load(&dir.join("data")).unwrap(),
            settings,
            EventRepository::new(&dir.join("logs")).unwrap(),
        )
    }

    #[tokio::test]
    async fn clearing_the_call_moves_it_to_recent_calls() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 50).await;

        service.set_current_call(sample_lead()).await.unwrap();
        let record = service.clear_current_call().await.unwrap().unwrap();

        assert!(service.current_call().await.is_none());
        let recent = service.recent_calls(None).await;
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].call_id, record.call_id);
        assert!(recent[0].disposition.is_none());

        // Sem ligação ativa não há nada a mover
        assert!(service.clear_current_call().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn finishing_another_lead_keeps_the_active_call() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 50).await;
        let active = Lead { lead_id: Some("ACTIVE".into()), ..sample_lead() };
        service.set_current_call(active).await.unwrap();

        let other = Lead { lead_id: Some("OTHER".into()), ..sample_lead() };
        service.finish_call(other, DispositionType::Busy, "CNF1", false).await.unwrap();
        let current = service.current_call().await.unwrap();
        assert_eq!(current.lead_id.as_deref(), Some("ACTIVE"));

        // Mesmo lead: a ligação atual é liberada
        let same = Lead { lead_id: Some("ACTIVE".into()), ..sample_lead() };
        service.finish_call(same, DispositionType::Busy, "CNF2", false).await.unwrap();
        assert!(service.current_call().await.is_none());
        assert_eq!(service.recent_calls(None).await.len(), 2);
    }

    #[tokio::test]
    async fn recent_calls_are_trimmed_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 3).await;

        for i in 0..5 {
            let lead = Lead { first_name: format!("caller{i}"), ..sample_lead() };
            service.finish_call(lead, DispositionType::NoAnswer, "CNF", false).await.unwrap();
        }

        let recent = service.recent_calls(None).await;
        let names: Vec<_> = recent.iter().map(|c| c.lead.first_name.as_str()).collect();
        assert_eq!(names, ["caller4", "caller3", "caller2"]);
        assert_eq!(service.recent_calls(Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn statistics_count_dispositions_and_appointment_rate() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 50).await;

        service.finish_call(sample_lead(), DispositionType::AppointmentScheduled, "A", false).await.unwrap();
        service.finish_call(sample_lead(), DispositionType::NotInterested, "B", false).await.unwrap();
        service.finish_call(sample_lead(), DispositionType::NotInterested, "C", false).await.unwrap();
        service.set_current_call(sample_lead()).await.unwrap();
        service.clear_current_call().await.unwrap();

        let stats = service.statistics().await;
        assert_eq!(stats.total_calls, 4);
        assert_eq!(stats.dispositions["not_interested"], 2);
        assert_eq!(stats.dispositions["appointment_scheduled"], 1);
        assert!((stats.appointment_rate - 0.25).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn history_matches_on_digits() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 50).await;
        service.finish_call(sample_lead(), DispositionType::Busy, "X", false).await.unwrap();

        assert_eq!(service.call_history("555.123.4567").await.len(), 1);
        assert!(service.call_history("5559999999").await.is_empty());
    }

    #[tokio::test]
    async fn cleanup_drops_only_old_calls() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), 50).await;
        service.finish_call(sample_lead(), DispositionType::Busy, "X", false).await.unwrap();
        service
            .state
            .update(|s| {
                let mut old = s.recent_calls[0].clone();
                old.timestamp = Utc::now() - Duration::days(40);
                s.recent_calls.push(old);
            })
            .await
            .unwrap();

        assert_eq!(service.cleanup_old_data(30).await.unwrap(), 1);
        assert_eq!(service.recent_calls(None).await.len(), 1);
    }
}
