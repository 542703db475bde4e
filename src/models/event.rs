// src/models/event.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    User,
    System,
    Error,
    Security,
}

// Uma linha dos arquivos de evento (JSON lines)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub timestamp: DateTime<Utc>,
    pub category: EventCategory,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct EventCounts {
    pub user: u64,
    pub system: u64,
    pub error: u64,
    pub security: u64,
}

impl EventCounts {
    pub fn bump(&mut self, category: EventCategory) {
        match category {
            EventCategory::User => self.user += 1,
            EventCategory::System => self.system += 1,
            EventCategory::Error => self.error += 1,
            EventCategory::Security => self.security += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorSummary {
    pub total_errors: usize,
    pub error_types: BTreeMap<String, usize>,
    pub most_recent: Option<Event>,
}
