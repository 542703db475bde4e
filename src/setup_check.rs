// src/setup_check.rs

use std::path::Path;

use crate::{
    config::AppConfig,
    services::{document_service::load_fonts, script_service::embedded_content},
};

#[derive(Debug)]
pub struct CheckResult {
    pub name: &'static str,
    pub passed: bool,
    pub details: Vec<String>,
}

impl CheckResult {
    fn new(name: &'static str, details: Vec<String>) -> Self {
        Self { name, passed: details.is_empty(), details }
    }
}

// Nenhuma pasta é criada aqui: só conferimos o que existe
fn check_directories(config: &AppConfig) -> CheckResult {
    let dirs = [&config.data_dir, &config.exports_dir, &config.logs_dir];
    let missing = dirs
        .iter()
        .filter(|d| !d.is_dir())
        .map(|d| format!("Pasta ausente: {}", d.display()))
        .collect();
    CheckResult::new("Estrutura de pastas", missing)
}

fn is_writable(dir: &Path) -> bool {
    tempfile::NamedTempFile::new_in(dir).is_ok()
}

fn check_permissions(config: &AppConfig) -> CheckResult {
    let dirs = [&config.data_dir, &config.exports_dir, &config.logs_dir];
    let problems = dirs
        .iter()
        .filter(|d| d.is_dir() && !is_writable(d))
        .map(|d| format!("Sem permissão de escrita: {}", d.display()))
        .collect();
    CheckResult::new("Permissões", problems)
}

fn check_content() -> CheckResult {
    match embedded_content() {
        Ok(_) => CheckResult::new("Conteúdo do roteiro", Vec::new()),
        Err(e) => CheckResult::new("Conteúdo do roteiro", vec![e.to_string()]),
    }
}

fn check_fonts(config: &AppConfig) -> CheckResult {
    match load_fonts(&config.fonts_dir) {
        Ok(_) => CheckResult::new("Fontes para PDF", Vec::new()),
        Err(e) => CheckResult::new("Fontes para PDF", vec![e.to_string()]),
    }
}

fn check_environment(config: &AppConfig) -> CheckResult {
    let vars = [
        ("STORM911_API_USER", config.api_user.is_some()),
        ("STORM911_API_PASS", config.api_pass.is_some()),
        ("STORM911_EMAIL", config.email.is_some()),
        ("STORM911_EMAIL_PASSWORD", config.email_password.is_some()),
    ];
    let missing = vars
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| format!("Variável não definida: {}", name))
        .collect();
    CheckResult::new("Variáveis de ambiente", missing)
}

pub fn run_checks(config: &AppConfig) -> Vec<CheckResult> {
    vec![
        check_directories(config),
        check_permissions(config),
        check_content(),
        check_fonts(config),
        check_environment(config),
    ]
}

/// Imprime o relatório e devolve `true` se tudo passou.
pub fn print_report(results: &[CheckResult]) -> bool {
    println!("\nVerificação do ambiente Storm911");
    println!("================================");

    for result in results {
        let mark = if result.passed { "✅" } else { "❌" };
        println!("{} {}", mark, result.name);
        for detail in &result.details {
            println!("   - {}", detail);
        }
    }

    let all_passed = results.iter().all(|r| r.passed);
    if all_passed {
        println!("\n✅ Tudo pronto.");
    } else {
        println!("\n❌ Há problemas. Veja os detalhes acima.");
    }
    all_passed
}
