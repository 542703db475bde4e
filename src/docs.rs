// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Sistema ---
        handlers::system::health,
        handlers::system::validate_value,
        handlers::system::send_test_email,

        // --- CRM ---
        handlers::crm::set_credentials,
        handlers::crm::clear_credentials,

        // --- Leads ---
        handlers::leads::search_lead,
        handlers::leads::create_lead,
        handlers::leads::update_lead,

        // --- Ligações ---
        handlers::calls::get_current_call,
        handlers::calls::set_current_call,
        handlers::calls::clear_current_call,
        handlers::calls::last_search,
        handlers::calls::recent_calls,
        handlers::calls::clear_recent_calls,
        handlers::calls::call_history,
        handlers::calls::statistics,
        handlers::calls::cleanup,
        handlers::calls::export_state,
        handlers::calls::import_state,

        // --- Disposições ---
        handlers::dispositions::list_options,
        handlers::dispositions::validate_disposition,
        handlers::dispositions::process_disposition,

        // --- Roteiro ---
        handlers::script::list_pages,
        handlers::script::get_page,
        handlers::script::current_page,
        handlers::script::next_page,
        handlers::script::previous_page,
        handlers::script::list_objection_groups,
        handlers::script::get_objection_group,
        handlers::script::get_objection_response,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::get_issues,
        handlers::settings::get_setting,
        handlers::settings::update_setting,
        handlers::settings::reset_all,
        handlers::settings::reset_category,
        handlers::settings::export_settings,
        handlers::settings::import_settings,

        // --- Eventos ---
        handlers::events::list_events,
        handlers::events::event_counts,
        handlers::events::error_summary,
        handlers::events::archive_logs,
        handlers::events::clear_events,
    ),
    components(
        schemas(
            // --- Lead / Ligação ---
            models::lead::Lead,
            models::call::CallRecord,
            models::call::LastSearch,
            models::call::CallStatistics,

            // --- Disposição ---
            models::disposition::DispositionType,
            models::disposition::DispositionOption,
            models::disposition::DispositionOutcome,

            // --- Roteiro ---
            models::script::TranscriptPage,
            models::script::TranscriptView,
            models::script::Objection,
            models::script::ObjectionGroup,
            models::script::ObjectionGroupSummary,
            models::script::ObjectionResponse,

            // --- Configurações ---
            models::settings::Settings,

            // --- Eventos ---
            models::event::EventCategory,
            models::event::Event,
            models::event::EventCounts,
            models::event::ErrorSummary,

            // --- Payloads ---
            models::api::HealthStatus,
            models::api::FieldValidationPayload,
            models::api::FieldValidationResult,
            models::api::TestEmailPayload,
            models::api::CredentialsPayload,
            models::api::CreatedLead,
            models::api::RetentionPayload,
            models::api::CleanupResult,
            models::api::FilePathPayload,
            models::api::DispositionPayload,
            models::api::DispositionValidation,
            models::api::SettingValuePayload,
            models::api::ArchiveResult,
        )
    ),
    tags(
        (name = "Sistema", description = "Saúde, validação de campos e teste de e-mail"),
        (name = "CRM", description = "Credenciais da API do CRM"),
        (name = "Leads", description = "Busca e gravação de leads no CRM"),
        (name = "Ligações", description = "Ligação atual, histórico e estatísticas"),
        (name = "Disposições", description = "Encerramento da ligação (PDF, e-mail, CRM)"),
        (name = "Roteiro", description = "Roteiro de atendimento e respostas a objeções"),
        (name = "Configurações", description = "Preferências do agente"),
        (name = "Eventos", description = "Log de eventos da aplicação")
    ),
    modifiers(&InfoAddon)
)]
pub struct ApiDoc;

struct InfoAddon;

impl utoipa::Modify for InfoAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = "Storm911 API".to_string();
        openapi.info.description = Some(
            "API local do assistente de ligações. As rotas de leads, ligações e disposições \
             exigem credenciais do CRM configuradas."
                .to_string(),
        );
    }
}
