// src/models/script.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- ROTEIRO (content/transcript.json) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptPage {
    pub id: usize,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptContent {
    pub pages: Vec<TranscriptPage>,
}

// Página atual do roteiro com as informações de navegação
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptView {
    pub index: usize,
    pub total: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub page: TranscriptPage,
}

// --- OBJEÇÕES (content/objections.json) ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Objection {
    pub id: String,
    pub title: String,
    pub response: String,
    #[serde(default)]
    pub key_points: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionGroup {
    pub id: u8,
    pub label: String,
    pub objections: Vec<Objection>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectionContent {
    pub groups: Vec<ObjectionGroup>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionGroupSummary {
    pub id: u8,
    pub label: String,
    pub objections: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObjectionResponse {
    pub response: String,
    pub key_points: Vec<String>,
}
