// src/db/crm_repo.rs

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::{
    common::error::{AppError, CrmErrorKind},
    models::lead::{value_as_text, Lead},
};

// O "banco" deste sistema é o CRM remoto: a fronteira fica atrás deste trait
#[async_trait]
pub trait LeadApi: Send + Sync {
    async fn search_lead(&self, phone: &str) -> Result<Lead, CrmErrorKind>;
    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmErrorKind>;
    async fn update_lead(&self, lead_id: &str, patch: Map<String, Value>) -> Result<(), CrmErrorKind>;
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmCredentials {
    pub api_user: String,
    pub api_pass: String,
}

impl fmt::Debug for CrmCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CrmCredentials")
            .field("api_user", &self.api_user)
            .field("api_pass", &"********")
            .finish()
    }
}

#[derive(Clone)]
pub struct CrmRepository {
    client: Client,
    base_url: String,
    credentials: Arc<RwLock<Option<CrmCredentials>>>,
}

impl CrmRepository {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        credentials: Option<CrmCredentials>,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Falha ao criar o cliente HTTP: {}", e))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Arc::new(RwLock::new(credentials)),
        })
    }

    /// Troca as credenciais e devolve as anteriores.
    pub async fn set_credentials(&self, credentials: CrmCredentials) -> Option<CrmCredentials> {
        self.credentials.write().await.replace(credentials)
    }

    pub async fn restore_credentials(&self, previous: Option<CrmCredentials>) {
        *self.credentials.write().await = previous;
    }

    pub async fn clear_credentials(&self) {
        *self.credentials.write().await = None;
    }

    pub async fn has_credentials(&self) -> bool {
        self.credentials
            .read()
            .await
            .as_ref()
            .is_some_and(|c| !c.api_user.is_empty() && !c.api_pass.is_empty())
    }

    // Toda chamada leva API_user / API_pass na query string (exigência do CRM)
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
    ) -> Result<Value, CrmErrorKind> {
        let credentials = match self.credentials.read().await.clone() {
            Some(c) if !c.api_user.is_empty() && !c.api_pass.is_empty() => c,
            _ => return Err(CrmErrorKind::Unauthenticated),
        };

        let url = format!("{}{}", self.base_url, endpoint);

        // Loga só método e caminho, nunca as credenciais
        tracing::debug!("API Request: {} {}", method, endpoint);

        let mut builder = self
            .client
            .request(method, &url)
            .query(&[
                ("API_user", credentials.api_user.as_str()),
                ("API_pass", credentials.api_pass.as_str()),
            ]);
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        tracing::debug!("Status Code: {}", status);

        if status.is_success() {
            let text = response.text().await.map_err(classify_transport_error)?;
            if text.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&text).map_err(|e| {
                tracing::warn!("Resposta do CRM não é JSON válido: {}", e);
                CrmErrorKind::ServerError
            });
        }

        match status {
            StatusCode::UNAUTHORIZED => Err(CrmErrorKind::Unauthenticated),
            StatusCode::NOT_FOUND => Err(CrmErrorKind::NotFound),
            other => {
                tracing::warn!("CRM respondeu {} para {}", other, endpoint);
                Err(CrmErrorKind::ServerError)
            }
        }
    }
}

fn classify_transport_error(e: reqwest::Error) -> CrmErrorKind {
    if e.is_timeout() {
        CrmErrorKind::Timeout
    } else if e.is_decode() {
        CrmErrorKind::ServerError
    } else {
        tracing::warn!("Falha de conexão com o CRM: {}", e);
        CrmErrorKind::ConnectionFailed
    }
}

// O CRM às vezes devolve o lead puro, às vezes embrulhado em `lead`/`data` ou numa lista
fn unwrap_lead_payload(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first().and_then(unwrap_lead_payload),
        Value::Object(obj) => {
            for key in ["lead", "data"] {
                if let Some(inner) = obj.get(key).filter(|v| v.is_object() || v.is_array()) {
                    return unwrap_lead_payload(inner);
                }
            }
            Some(value)
        }
        _ => None,
    }
}

#[async_trait]
impl LeadApi for CrmRepository {
    async fn search_lead(&self, phone: &str) -> Result<Lead, CrmErrorKind> {
        let endpoint = format!("/search/Lead/{}", phone);
        let data = self.request(Method::GET, &endpoint, None).await?;

        unwrap_lead_payload(&data)
            .map(Lead::from_crm)
            .ok_or(CrmErrorKind::NotFound)
    }

    async fn create_lead(&self, lead: &Lead) -> Result<String, CrmErrorKind> {
        let mut payload = lead.to_crm_payload();
        payload.insert("created_at".into(), Value::String(Utc::now().to_rfc3339()));

        let data = self
            .request(Method::POST, "/create/Lead", Some(&Value::Object(payload)))
            .await?;

        unwrap_lead_payload(&data)
            .and_then(|v| v.as_object())
            .and_then(|obj| {
                ["id", "leadId", "lead_id"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(value_as_text))
            })
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                tracing::warn!("CRM criou o lead mas não devolveu o ID");
                CrmErrorKind::ServerError
            })
    }

    async fn update_lead(&self, lead_id: &str, mut patch: Map<String, Value>) -> Result<(), CrmErrorKind> {
        patch.insert("updated_at".into(), Value::String(Utc::now().to_rfc3339()));

        let endpoint = format!("/update/Lead/{}", lead_id);
        self.request(Method::PUT, &endpoint, Some(&Value::Object(patch)))
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode as AxumStatus,
        routing::{get, post, put},
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use tokio::{net::TcpListener, sync::Mutex};

    type Recorded = Arc<Mutex<Vec<(String, Value)>>>;

    fn authorized(q: &HashMap<String, String>) -> bool {
        q.get("API_user").map(String::as_str) == Some("agent")
            && q.get("API_pass").map(String::as_str) == Some("secret")
    }

    async fn fake_search(
        Path(phone): Path<String>,
        Query(q): Query<HashMap<String, String>>,
    ) -> (AxumStatus, Json<Value>) {
        if !authorized(&q) {
            return (AxumStatus::UNAUTHORIZED, Json(json!({"error": "bad credentials"})));
        }
        match phone.as_str() {
            "5551234567" => (
                AxumStatus::OK,
                Json(json!({"lead": {"id": 42, "firstName": "John", "lastName": "Doe", "phone": "5551234567"}})),
            ),
            "5550000500" => (AxumStatus::INTERNAL_SERVER_ERROR, Json(json!({}))),
            _ => (AxumStatus::NOT_FOUND, Json(json!({}))),
        }
    }

    async fn fake_create(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
        rec.lock().await.push(("create".into(), body));
        Json(json!({"data": {"leadId": "L-77"}}))
    }

    async fn fake_update(
        State(rec): State<Recorded>,
        Path(id): Path<String>,
        Json(body): Json<Value>,
    ) -> AxumStatus {
        rec.lock().await.push((id, body));
        AxumStatus::NO_CONTENT
    }

    async fn slow() -> &'static str {
        tokio::time::sleep(Duration::from_secs(3)).await;
        "late"
    }

    async fn spawn_crm() -> (String, Recorded) {
        let recorded: Recorded = Arc::default();
        let router = Router::new()
            .route("/search/Lead/{phone}", get(fake_search))
            .route("/create/Lead", post(fake_create))
            .route("/update/Lead/{id}", put(fake_update))
            .route("/slow/search/Lead/{phone}", get(slow))
            .with_state(recorded.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        (format!("http://{}", addr), recorded)
    }

    fn creds() -> Option<CrmCredentials> {
        Some(CrmCredentials { api_user: "agent".into(), api_pass: "secret".into() })
    }

    #[tokio::test]
    async fn search_returns_parsed_lead() {
        let (base, _) = spawn_crm().await;
        let repo = CrmRepository::new(&base, Duration::from_secs(5), creds()).unwrap();

        let lead = repo.search_lead("5551234567").await.unwrap();
        assert_eq!(lead.lead_id.as_deref(), Some("42"));
        assert_eq!(lead.customer_name(), "John Doe");
    }

    #[tokio::test]
    async fn status_codes_map_to_error_kinds() {
        let (base, _) = spawn_crm().await;
        let repo = CrmRepository::new(&base, Duration::from_secs(5), creds()).unwrap();

        assert_eq!(repo.search_lead("5559999999").await, Err(CrmErrorKind::NotFound));
        assert_eq!(repo.search_lead("5550000500").await, Err(CrmErrorKind::ServerError));

        repo.set_credentials(CrmCredentials { api_user: "agent".into(), api_pass: "wrong".into() }).await;
        assert_eq!(repo.search_lead("5551234567").await, Err(CrmErrorKind::Unauthenticated));
    }

    #[tokio::test]
    async fn replaced_credentials_can_be_restored() {
        let repo = CrmRepository::new("http://127.0.0.1:9", Duration::from_secs(1), creds()).unwrap();

        let previous = repo
            .set_credentials(CrmCredentials { api_user: "other".into(), api_pass: "x".into() })
            .await;
        assert_eq!(previous.as_ref().map(|c| c.api_user.as_str()), Some("agent"));

        repo.restore_credentials(previous).await;
        let current = repo.credentials.read().await.clone().unwrap();
        assert_eq!(current.api_user, "agent");
    }

    #[tokio::test]
    async fn missing_credentials_never_reach_the_network() {
        // Porta sem ninguém escutando: se houvesse request, viria ConnectionFailed
        let repo = CrmRepository::new("http://127.0.0.1:9", Duration::from_secs(1), None).unwrap();
        assert!(!repo.has_credentials().await);
        assert_eq!(repo.search_lead("5551234567").await, Err(CrmErrorKind::Unauthenticated));
    }

    #[tokio::test]
    async fn unreachable_server_is_connection_failed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let repo = CrmRepository::new(&format!("http://{}", addr), Duration::from_secs(2), creds()).unwrap();
        assert_eq!(repo.search_lead("5551234567").await, Err(CrmErrorKind::ConnectionFailed));
    }

    #[tokio::test]
    async fn slow_server_times_out() {
        let (base, _) = spawn_crm().await;
        let repo = CrmRepository::new(&format!("{}/slow", base), Duration::from_millis(200), creds()).unwrap();
        assert_eq!(repo.search_lead("5551234567").await, Err(CrmErrorKind::Timeout));
    }

    #[tokio::test]
    async fn create_and_update_send_stamped_payloads() {
        let (base, recorded) = spawn_crm().await;
        let repo = CrmRepository::new(&format!("{}/", base), Duration::from_secs(5), creds()).unwrap();

        let lead = Lead { first_name: "Ann".into(), phone: "5551112222".into(), ..Default::default() };
        let id = repo.create_lead(&lead).await.unwrap();
        assert_eq!(id, "L-77");

        let mut patch = Map::new();
        patch.insert("disposition".into(), json!("busy"));
        repo.update_lead(&id, patch).await.unwrap();

        let calls = recorded.lock().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1["firstName"], "Ann");
        assert!(calls[0].1.get("created_at").is_some());
        assert_eq!(calls[1].0, "L-77");
        assert_eq!(calls[1].1["disposition"], "busy");
        assert!(calls[1].1.get("updated_at").is_some());
    }
}
