//src/main.rs

use std::{path::Path, process::ExitCode};

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;
mod setup_check;
#[cfg(test)]
mod test_support;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::credentials::crm_guard;

#[derive(Parser)]
#[command(name = "storm911", version, about = "Assistente de ligações para inspeção de telhados")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sobe a API local (padrão)
    Serve,
    /// Confere pastas, fontes, conteúdo e variáveis de ambiente
    VerifySetup,
}

// Console compacto + arquivo JSON diário em `logs/`. O guard precisa viver até o fim do processo.
fn init_tracing(logs_dir: &Path) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storm911=info,tower_http=info".into());
    let console = tracing_subscriber::fmt::layer().with_target(false).compact();

    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        eprintln!("Aviso: não foi possível criar {:?}: {}", logs_dir, e);
        tracing_subscriber::registry().with(filter).with(console).init();
        return None;
    }

    let file_appender = tracing_appender::rolling::daily(logs_dir, "storm911.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .init();

    Some(guard)
}

fn build_router(app_state: AppState) -> Router {
    // Rotas que falam com o CRM ou mexem na ligação (exigem credenciais)
    let crm_routes = Router::new()
        .route("/leads", post(handlers::leads::create_lead))
        .route("/leads/search/{phone}", get(handlers::leads::search_lead))
        .route("/leads/{id}", put(handlers::leads::update_lead))
        .route(
            "/calls/current",
            get(handlers::calls::get_current_call)
                .put(handlers::calls::set_current_call)
                .delete(handlers::calls::clear_current_call),
        )
        .route(
            "/calls/recent",
            get(handlers::calls::recent_calls).delete(handlers::calls::clear_recent_calls),
        )
        .route("/calls/last-search", get(handlers::calls::last_search))
        .route("/calls/history/{phone}", get(handlers::calls::call_history))
        .route("/calls/statistics", get(handlers::calls::statistics))
        .route("/calls/cleanup", post(handlers::calls::cleanup))
        .route("/calls/state/export", post(handlers::calls::export_state))
        .route("/calls/state/import", post(handlers::calls::import_state))
        .route("/dispositions", post(handlers::dispositions::process_disposition))
        .route("/dispositions/options", get(handlers::dispositions::list_options))
        .route("/dispositions/validate", post(handlers::dispositions::validate_disposition))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), crm_guard));

    let script_routes = Router::new()
        .route("/script/pages", get(handlers::script::list_pages))
        .route("/script/pages/{index}", get(handlers::script::get_page))
        .route("/script/current", get(handlers::script::current_page))
        .route("/script/next", post(handlers::script::next_page))
        .route("/script/previous", post(handlers::script::previous_page))
        .route("/objections", get(handlers::script::list_objection_groups))
        .route("/objections/{group}", get(handlers::script::get_objection_group))
        .route("/objections/{group}/{id}", get(handlers::script::get_objection_response));

    let settings_routes = Router::new()
        .route("/settings", get(handlers::settings::get_settings))
        .route("/settings/issues", get(handlers::settings::get_issues))
        .route("/settings/reset", post(handlers::settings::reset_all))
        .route("/settings/reset/{category}", post(handlers::settings::reset_category))
        .route("/settings/export", post(handlers::settings::export_settings))
        .route("/settings/import", post(handlers::settings::import_settings))
        .route(
            "/settings/{category}/{key}",
            get(handlers::settings::get_setting).put(handlers::settings::update_setting),
        );

    let event_routes = Router::new()
        .route("/events", get(handlers::events::list_events).delete(handlers::events::clear_events))
        .route("/events/counts", get(handlers::events::event_counts))
        .route("/events/errors", get(handlers::events::error_summary))
        .route("/events/archive", post(handlers::events::archive_logs));

    let api = Router::new()
        .route("/health", get(handlers::system::health))
        .route("/validate", post(handlers::system::validate_value))
        .route("/email/test", post(handlers::system::send_test_email))
        .route(
            "/crm/credentials",
            put(handlers::crm::set_credentials).delete(handlers::crm::clear_credentials),
        )
        .merge(crm_routes)
        .merge(script_routes)
        .merge(settings_routes)
        .merge(event_routes);

    Router::new()
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(config).await?;
    let app = build_router(app_state);

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    tracing::info!("📚 Documentação em http://{}/swagger-ui", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("👋 Encerrando o servidor");
        })
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuração inválida: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::VerifySetup => {
            let results = setup_check::run_checks(&config);
            if setup_check::print_report(&results) { ExitCode::SUCCESS } else { ExitCode::FAILURE }
        }
        Command::Serve => {
            let _guard = init_tracing(&config.logs_dir);

            match serve(config).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    tracing::error!("🔥 Falha ao iniciar a aplicação: {:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
