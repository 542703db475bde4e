// src/models/call.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{disposition::DispositionType, lead::Lead};

// Uma ligação encerrada (ou abandonada) guardada no histórico recente
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub call_id: Uuid,
    pub timestamp: DateTime<Utc>,

    #[serde(flatten)]
    pub lead: Lead,

    #[serde(default)]
    pub disposition: Option<DispositionType>,
    #[serde(default)]
    pub confirmation_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LastSearch {
    pub phone: String,
    pub found: bool,
    pub timestamp: DateTime<Utc>,
}

// O documento `app_state.json` inteiro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct AppStateDocument {
    pub current_call: Option<Lead>,
    pub last_search: Option<LastSearch>,
    // Mais recente primeiro
    pub recent_calls: Vec<CallRecord>,
    pub script_page: usize,
    pub last_updated: DateTime<Utc>,
}

impl Default for AppStateDocument {
    fn default() -> Self {
        Self {
            current_call: None,
            last_search: None,
            recent_calls: Vec::new(),
            script_page: 0,
            last_updated: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CallStatistics {
    pub total_calls: usize,
    pub dispositions: BTreeMap<String, usize>,
    pub appointment_rate: f64,
    pub last_updated: DateTime<Utc>,
}
