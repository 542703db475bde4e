// src/models/disposition.rs

use std::{path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::error::AppError;

// --- ENUMS ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DispositionType {
    AppointmentScheduled,
    NotInterested,
    CallBack,
    WrongNumber,
    NoAnswer,
    Busy,
    Disconnected,
    DoNotCall,
    Other,
}

impl DispositionType {
    pub const ALL: [DispositionType; 9] = [
        DispositionType::AppointmentScheduled,
        DispositionType::NotInterested,
        DispositionType::CallBack,
        DispositionType::WrongNumber,
        DispositionType::NoAnswer,
        DispositionType::Busy,
        DispositionType::Disconnected,
        DispositionType::DoNotCall,
        DispositionType::Other,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DispositionType::AppointmentScheduled => "appointment_scheduled",
            DispositionType::NotInterested => "not_interested",
            DispositionType::CallBack => "call_back",
            DispositionType::WrongNumber => "wrong_number",
            DispositionType::NoAnswer => "no_answer",
            DispositionType::Busy => "busy",
            DispositionType::Disconnected => "disconnected",
            DispositionType::DoNotCall => "do_not_call",
            DispositionType::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DispositionType::AppointmentScheduled => "Appointment Scheduled",
            DispositionType::NotInterested => "Not Interested",
            DispositionType::CallBack => "Call Back Later",
            DispositionType::WrongNumber => "Wrong Number",
            DispositionType::NoAnswer => "No Answer",
            DispositionType::Busy => "Busy",
            DispositionType::Disconnected => "Disconnected",
            DispositionType::DoNotCall => "Do Not Call",
            DispositionType::Other => "Other",
        }
    }

    pub fn requires_notes(&self) -> bool {
        matches!(
            self,
            DispositionType::AppointmentScheduled
                | DispositionType::NotInterested
                | DispositionType::CallBack
                | DispositionType::DoNotCall
                | DispositionType::Other
        )
    }

    pub fn requires_confirmation(&self) -> bool {
        matches!(self, DispositionType::AppointmentScheduled)
    }

    pub fn option(&self) -> DispositionOption {
        DispositionOption {
            id: *self,
            label: self.label().to_string(),
            requires_notes: self.requires_notes(),
            requires_confirmation: self.requires_confirmation(),
        }
    }
}

impl FromStr for DispositionType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DispositionType::ALL
            .into_iter()
            .find(|d| d.id() == s.trim())
            .ok_or_else(|| AppError::InvalidDisposition(s.to_string()))
    }
}

impl std::fmt::Display for DispositionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispositionOption {
    pub id: DispositionType,
    pub label: String,
    pub requires_notes: bool,
    pub requires_confirmation: bool,
}

// --- REGISTRO (imutável depois de criado) ---

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispositionRecord {
    pub disposition_type: DispositionType,
    pub confirmation_number: String,
    pub disposition_date: String,
    pub disposition_time: String,

    // Cliente
    pub customer_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,

    // Telhado
    pub stories: String,
    pub roof_age: String,
    pub roof_type: String,

    // Seguro
    pub has_insurance: String,
    pub insurance_company: String,
    pub is_homeowner: String,
    pub has_contractor: String,

    // Agendamento
    pub appointment_date: String,
    pub appointment_time: String,
    pub appointment_duration: Option<String>,

    pub notes: String,
    pub lead_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DispositionOutcome {
    pub confirmation_number: String,
    pub disposition: DispositionType,
    #[schema(value_type = String)]
    pub report_path: PathBuf,
    #[schema(value_type = Option<String>)]
    pub confirmation_path: Option<PathBuf>,
    pub emails_sent: Vec<String>,
    pub lead_id: String,
}
