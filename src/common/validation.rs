// src/common/validation.rs

use std::sync::OnceLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use validator::ValidateEmail;

use crate::common::error::FieldErrorKey;

/// Horários oferecidos para a inspeção (horário comercial).
pub const APPOINTMENT_TIMES: &[&str] = &[
    "9:00 AM", "10:00 AM", "11:00 AM", "12:00 PM",
    "1:00 PM", "2:00 PM", "3:00 PM", "4:00 PM", "5:00 PM",
];

pub const DATE_FORMAT: &str = "%m/%d/%Y";

// Só dígitos ASCII: `\d` do regex aceita qualquer dígito Unicode
fn re_non_digit() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^0-9]").unwrap())
}

// Plano de numeração norte-americano: DDD não começa com 0 nem 1
fn re_nanp() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[2-9][0-9]{9}$").unwrap())
}

fn re_zip() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{5}([0-9]{4})?$").unwrap())
}

fn re_zip_separators() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\s-]").unwrap())
}

pub fn digits_only(value: &str) -> String {
    re_non_digit().replace_all(value, "").into_owned()
}

/// Valida um telefone americano e devolve no formato `(555) 123-4567`.
pub fn validate_phone(phone: &str) -> Result<String, FieldErrorKey> {
    let mut digits = digits_only(phone);

    // Aceita o código do país (+1)
    if digits.len() == 11 && digits.starts_with('1') {
        digits.remove(0);
    }

    if !re_nanp().is_match(&digits) {
        return Err(FieldErrorKey::InvalidFormat);
    }

    Ok(format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..]))
}

/// Valida o e-mail e devolve a forma normalizada (sem espaços, domínio em minúsculas).
pub fn validate_email(email: &str) -> Result<String, FieldErrorKey> {
    let trimmed = email.trim();

    if !trimmed.validate_email() {
        return Err(FieldErrorKey::InvalidFormat);
    }

    match trimmed.rsplit_once('@') {
        Some((local, domain)) => Ok(format!("{}@{}", local, domain.to_lowercase())),
        None => Err(FieldErrorKey::InvalidFormat),
    }
}

/// ZIP de 5 ou 9 dígitos; o de 9 sai como `12345-6789`.
pub fn validate_zip(zip_code: &str) -> Result<String, FieldErrorKey> {
    let cleaned = re_zip_separators().replace_all(zip_code, "");

    if !re_zip().is_match(&cleaned) {
        return Err(FieldErrorKey::InvalidFormat);
    }

    if cleaned.len() == 9 {
        Ok(format!("{}-{}", &cleaned[..5], &cleaned[5..]))
    } else {
        Ok(cleaned.into_owned())
    }
}

pub fn validate_date(date: &str) -> Result<String, FieldErrorKey> {
    validate_date_on(date, Local::now().date_naive())
}

/// Data `MM/DD/YYYY` que não pode estar no passado (hoje é aceito).
pub fn validate_date_on(date: &str, today: NaiveDate) -> Result<String, FieldErrorKey> {
    let parsed = NaiveDate::parse_from_str(date.trim(), DATE_FORMAT)
        .map_err(|_| FieldErrorKey::InvalidFormat)?;

    if parsed < today {
        return Err(FieldErrorKey::FutureDate);
    }

    Ok(parsed.format(DATE_FORMAT).to_string())
}

pub fn validate_time(time: &str) -> Result<String, FieldErrorKey> {
    let trimmed = time.trim();
    if APPOINTMENT_TIMES.contains(&trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(FieldErrorKey::BusinessHours)
    }
}

/// Validador pelo nome do campo. `None` quando o campo não tem validação.
pub fn validate_field(field: &str, value: &str) -> Option<Result<String, FieldErrorKey>> {
    let check: fn(&str) -> Result<String, FieldErrorKey> = match field {
        "phone" | "cell" => validate_phone,
        "email" => validate_email,
        "zip" => validate_zip,
        "date" | "appointment_date" => validate_date,
        "time" | "appointment_time" => validate_time,
        _ => return None,
    };
    Some(check(value))
}
