// src/models/lead.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use serde_json::{Map, Value};

// --- LEAD / DADOS DA LIGAÇÃO ---

// Registro plano preenchido durante a ligação.
// Todos os campos são texto: o agente digita ou escolhe de uma lista.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Lead {
    // Identificador do lead no CRM (o único vínculo com o sistema remoto)
    pub lead_id: Option<String>,

    pub first_name: String,
    pub last_name: String,

    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,

    pub phone: String,
    pub cell: String,
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

    pub notes: String,
}

// (campo interno, chave no CRM)
const CRM_FIELDS: &[(&str, &str)] = &[
    ("first_name", "firstName"),
    ("last_name", "lastName"),
    ("address", "address"),
    ("city", "city"),
    ("state", "state"),
    ("zip", "zip"),
    ("phone", "phone"),
    ("cell", "phone2"),
    ("email", "email"),
    ("notes", "notes"),
    ("appointment_date", "appointmentDate"),
    ("appointment_time", "appointmentTime"),
    ("stories", "roofStories"),
    ("roof_age", "roofAge"),
    ("roof_type", "roofType"),
    ("has_insurance", "hasInsurance"),
    ("insurance_company", "insuranceCompany"),
    ("is_homeowner", "isHomeowner"),
    ("has_contractor", "hasContractor"),
];

impl Lead {
    pub fn customer_name(&self) -> String {
        [self.first_name.trim(), self.last_name.trim()]
            .iter()
            .filter(|p| !p.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Acesso por nome de campo (snake_case). `customer_name` é derivado.
    pub fn field(&self, name: &str) -> Option<String> {
        let value = match name {
            "customer_name" => return Some(self.customer_name()),
            "lead_id" => return self.lead_id.clone(),
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "address" => &self.address,
            "city" => &self.city,
            "state" => &self.state,
            "zip" => &self.zip,
            "phone" => &self.phone,
            "cell" => &self.cell,
            "email" => &self.email,
            "stories" => &self.stories,
            "roof_age" => &self.roof_age,
            "roof_type" => &self.roof_type,
            "has_insurance" => &self.has_insurance,
            "insurance_company" => &self.insurance_company,
            "is_homeowner" => &self.is_homeowner,
            "has_contractor" => &self.has_contractor,
            "appointment_date" => &self.appointment_date,
            "appointment_time" => &self.appointment_time,
            "notes" => &self.notes,
            _ => return None,
        };
        Some(value.clone())
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        Some(match name {
            "first_name" => &mut self.first_name,
            "last_name" => &mut self.last_name,
            "address" => &mut self.address,
            "city" => &mut self.city,
            "state" => &mut self.state,
            "zip" => &mut self.zip,
            "phone" => &mut self.phone,
            "cell" => &mut self.cell,
            "email" => &mut self.email,
            "stories" => &mut self.stories,
            "roof_age" => &mut self.roof_age,
            "roof_type" => &mut self.roof_type,
            "has_insurance" => &mut self.has_insurance,
            "insurance_company" => &mut self.insurance_company,
            "is_homeowner" => &mut self.is_homeowner,
            "has_contractor" => &mut self.has_contractor,
            "appointment_date" => &mut self.appointment_date,
            "appointment_time" => &mut self.appointment_time,
            "notes" => &mut self.notes,
            _ => return None,
        })
    }

    /// Nomes dos campos obrigatórios que estão vazios.
    pub fn missing_fields(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.field(name).is_none_or(|v| v.trim().is_empty()))
            .map(|name| name.to_string())
            .collect()
    }

    /// Payload para o CRM (chaves camelCase). Campos vazios não são enviados.
    pub fn to_crm_payload(&self) -> Map<String, Value> {
        let mut payload = Map::new();
        for (field, crm_key) in CRM_FIELDS {
            if let Some(value) = self.field(field) {
                if !value.trim().is_empty() {
                    payload.insert(crm_key.to_string(), Value::String(value));
                }
            }
        }
        payload
    }

    /// Converte o JSON do CRM. Campos ausentes, nulos ou numéricos são tolerados.
    pub fn from_crm(data: &Value) -> Lead {
        let mut lead = Lead::default();
        let Some(obj) = data.as_object() else {
            return lead;
        };

        for (field, crm_key) in CRM_FIELDS {
            if let (Some(value), Some(slot)) = (obj.get(*crm_key).and_then(value_as_text), lead.field_mut(field)) {
                *slot = value;
            }
        }

        lead.lead_id = ["id", "leadId", "lead_id"]
            .iter()
            .find_map(|k| obj.get(*k).and_then(value_as_text))
            .filter(|id| !id.is_empty());

        lead
    }
}

pub(crate) fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if *b { "Yes" } else { "No" }.to_string()),
        _ => None,
    }
}
