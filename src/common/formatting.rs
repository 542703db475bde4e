// src/common/formatting.rs

use chrono::{DateTime, Local};
use rand::Rng;
use serde_json::Value;

use crate::common::validation::digits_only;

// Campos que nunca devem aparecer em claro nos logs
const SENSITIVE_KEYS: &[&str] = &["password", "api_pass", "API_pass", "apiPass", "ssn", "credit_card"];

/// Formata `(XXX) XXX-XXXX`; se não tiver 10 dígitos, devolve como veio.
pub fn format_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    if digits.len() != 10 {
        return phone.to_string();
    }
    format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
}

pub fn format_address(address: &str, city: &str, state: &str, zip: &str) -> String {
    [address, city, state, zip]
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_duration(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    let plural = |n: u32| if n == 1 { "" } else { "s" };

    match (hours, mins) {
        (0, m) => format!("{} minute{}", m, plural(m)),
        (h, 0) => format!("{} hour{}", h, plural(h)),
        (h, m) => format!("{} hour{} {} minute{}", h, plural(h), m, plural(m)),
    }
}

/// `CNF` + timestamp local (14 dígitos) + 4 dígitos aleatórios.
pub fn generate_confirmation_number() -> String {
    let suffix = rand::rng().random_range(0..10_000u32);
    confirmation_number_at(Local::now(), suffix)
}

pub fn confirmation_number_at(at: DateTime<Local>, suffix: u32) -> String {
    format!("CNF{}{:04}", at.format("%Y%m%d%H%M%S"), suffix % 10_000)
}

/// Troca o valor das chaves sensíveis por `********` (só no primeiro nível).
pub fn mask_sensitive_data(data: &Value) -> Value {
    let mut masked = data.clone();
    if let Some(obj) = masked.as_object_mut() {
        for key in SENSITIVE_KEYS {
            if let Some(v) = obj.get_mut(*key) {
                *v = Value::String("*".repeat(8));
            }
        }
    }
    masked
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use regex::Regex;
    use serde_json::json;

    #[test]
    fn confirmation_number_shape() {
        let re = Regex::new(r"^CNF\d{14}\d{4}$").unwrap();
        for _ in 0..50 {
            let cnf = generate_confirmation_number();
            assert!(re.is_match(&cnf), "unexpected confirmation number {cnf}");
        }
    }

    #[test]
    fn same_second_different_suffix_differs() {
        let at = Local.with_ymd_and_hms(2026, 3, 14, 9, 30, 5).unwrap();
        let a = confirmation_number_at(at, 7);
        let b = confirmation_number_at(at, 4021);
        assert_eq!(a, "CNF202603140930050007");
        assert_eq!(b, "CNF202603140930054021");
        assert_ne!(a, b);
    }

    #[test]
    fn address_skips_blank_parts() {
        assert_eq!(format_address("12 Elm St", "", "TX", "75001"), "12 Elm St, TX, 75001");
        assert_eq!(format_address("", "", "", ""), "");
    }

    #[test]
    fn duration_is_human_readable() {
        assert_eq!(format_duration(30), "30 minutes");
        assert_eq!(format_duration(1), "1 minute");
        assert_eq!(format_duration(60), "1 hour");
        assert_eq!(format_duration(75), "1 hour 15 minutes");
        assert_eq!(format_duration(121), "2 hours 1 minute");
    }

    #[test]
    fn phone_formatting_leaves_odd_lengths_alone() {
        assert_eq!(format_phone("555.123.4567"), "(555) 123-4567");
        assert_eq!(format_phone("123"), "123");
        assert_eq!(format_phone("55٥٥٥٥"), "55٥٥٥٥");
        assert_eq!(format_phone("555१२३4567"), "555१२३4567");
    }

    #[test]
    fn sensitive_keys_are_masked() {
        let masked = mask_sensitive_data(&json!({"API_pass": "secret", "phone": "5551234567"}));
        assert_eq!(masked["API_pass"], "********");
        assert_eq!(masked["phone"], "5551234567");
    }
}
