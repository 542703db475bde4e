// src/services/script_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::StateRepository,
    models::script::{
        ObjectionContent, ObjectionGroup, ObjectionGroupSummary, ObjectionResponse, TranscriptContent,
        TranscriptPage, TranscriptView,
    },
};

// Conteúdo estático, embutido no binário
const TRANSCRIPT_JSON: &str = include_str!("../../content/transcript.json");
const OBJECTIONS_JSON: &str = include_str!("../../content/objections.json");

pub const RESPONSE_NOT_AVAILABLE: &str = "Response not available.";
pub const INVALID_GROUP: &str = "Invalid objection group.";

/// Lê o roteiro e as objeções embutidos no binário.
pub fn embedded_content() -> Result<(Vec<TranscriptPage>, Vec<ObjectionGroup>), AppError> {
    let transcript: TranscriptContent = serde_json::from_str(TRANSCRIPT_JSON)?;
    let objections: ObjectionContent = serde_json::from_str(OBJECTIONS_JSON)?;

    if transcript.pages.is_empty() {
        return Err(anyhow::anyhow!("Roteiro embutido sem páginas").into());
    }
    Ok((transcript.pages, objections.groups))
}

#[derive(Clone)]
pub struct ScriptService {
    pages: Arc<Vec<TranscriptPage>>,
    groups: Arc<Vec<ObjectionGroup>>,
    state: StateRepository,
}

impl ScriptService {
    pub fn new(state: StateRepository) -> Result<Self, AppError> {
        let (pages, groups) = embedded_content()?;
        Ok(Self { pages: Arc::new(pages), groups: Arc::new(groups), state })
    }

    // =========================================================================
    //  ROTEIRO
    // =========================================================================

    pub fn pages(&self) -> &[TranscriptPage] {
        &self.pages
    }

    fn view(&self, index: usize) -> TranscriptView {
        let last = self.pages.len() - 1;
        let index = index.min(last);
        TranscriptView {
            index,
            total: self.pages.len(),
            has_previous: index > 0,
            has_next: index < last,
            page: self.pages[index].clone(),
        }
    }

    pub fn page(&self, index: usize) -> Result<TranscriptView, AppError> {
        if index >= self.pages.len() {
            return Err(AppError::NotFound(format!("Transcript page {}", index)));
        }
        Ok(self.view(index))
    }

    pub async fn current(&self) -> TranscriptView {
        self.view(self.state.snapshot().await.script_page)
    }

    // O cursor fica sempre em 0..N-1
    async fn move_cursor(&self, forward: bool) -> Result<TranscriptView, AppError> {
        let last = self.pages.len() - 1;
        let index = self
            .state
            .update(|s| {
                let current = s.script_page.min(last);
                s.script_page = if forward { (current + 1).min(last) } else { current.saturating_sub(1) };
                s.script_page
            })
            .await?;
        Ok(self.view(index))
    }

    pub async fn next(&self) -> Result<TranscriptView, AppError> {
        self.move_cursor(true).await
    }

    pub async fn previous(&self) -> Result<TranscriptView, AppError> {
        self.move_cursor(false).await
    }

    // =========================================================================
    //  OBJEÇÕES
    // =========================================================================

    pub fn groups(&self) -> Vec<ObjectionGroupSummary> {
        self.groups
            .iter()
            .map(|g| ObjectionGroupSummary {
                id: g.id,
                label: g.label.clone(),
                objections: g.objections.iter().map(|o| o.id.clone()).collect(),
            })
            .collect()
    }

    pub fn objections(&self, group_id: u8) -> Result<&ObjectionGroup, AppError> {
        self.groups
            .iter()
            .find(|g| g.id == group_id)
            .ok_or_else(|| AppError::NotFound(format!("Objection group {}", group_id)))
    }

    /// Resposta de uma objeção. Grupo ou objeção desconhecidos devolvem o texto padrão, não erro.
    pub fn objection_response(&self, group_id: u8, objection_id: &str) -> ObjectionResponse {
        let Ok(group) = self.objections(group_id) else {
            return ObjectionResponse { response: INVALID_GROUP.to_string(), key_points: Vec::new() };
        };

        match group.objections.iter().find(|o| o.id == objection_id) {
            Some(o) => ObjectionResponse { response: o.response.clone(), key_points: o.key_points.clone() },
            None => ObjectionResponse { response: RESPONSE_NOT_AVAILABLE.to_string(), key_points: Vec::new() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &std::path::Path) -> ScriptService {
        ScriptService::new(StateRepository::load(dir).unwrap()).unwrap()
    }

    #[test]
    fn embedded_content_is_complete() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        assert_eq!(service.pages().len(), 23);
        assert_eq!(service.pages()[0].title, "START Screen");

        let groups = service.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Common Sales Objections");
        assert_eq!(groups[1].label, "Technical and Trust Objections");
        assert_eq!(groups[0].objections.len() + groups[1].objections.len(), 20);
    }

    #[test]
    fn page_lookup_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let view = service.page(22).unwrap();
        assert!(!view.has_next);
        assert!(view.has_previous);
        assert!(matches!(service.page(23), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn cursor_is_clamped_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        assert_eq!(service.previous().await.unwrap().index, 0);
        for _ in 0..30 {
            service.next().await.unwrap();
        }
        assert_eq!(service.current().await.index, 22);
        assert_eq!(service.previous().await.unwrap().index, 21);

        // Outra instância lê o mesmo cursor do arquivo
        let reloaded = ScriptService::new(StateRepository::load(dir.path()).unwrap()).unwrap();
        assert_eq!(reloaded.current().await.index, 21);
    }

    #[test]
    fn objection_lookup_falls_back_to_fixed_texts() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let known = service.objection_response(1, "i_dont_have_time");
        assert!(known.response.starts_with("I completely understand"));
        assert!(!known.key_points.is_empty());

        assert_eq!(service.objection_response(1, "unknown").response, RESPONSE_NOT_AVAILABLE);
        let bad_group = service.objection_response(9, "i_dont_have_time");
        assert_eq!(bad_group.response, INVALID_GROUP);
        assert!(bad_group.key_points.is_empty());
    }
}
