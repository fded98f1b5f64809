//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! y conversión de tipos.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use validator::ValidationError;

use crate::utils::errors::AppError;

fn plate_regex() -> &'static Regex {
    static PLATE: OnceLock<Regex> = OnceLock::new();
    PLATE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]{0,48}[A-Za-z0-9]$").expect("plate regex is valid")
    })
}

/// Validar formato de matrícula: alfanumérica, con espacios o guiones internos
pub fn validate_number_plate(value: &str) -> Result<(), ValidationError> {
    if !plate_regex().is_match(value) {
        let mut error = ValidationError::new("number_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar formato de teléfono (básico)
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let clean_phone = value.chars().filter(|c| c.is_ascii_digit()).collect::<String>();
    if clean_phone.len() < 10 || clean_phone.len() > 15 {
        let mut error = ValidationError::new("phone");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_empty"));
    }
    Ok(())
}

/// Convertir string a datetime. Acepta RFC3339 o la forma ISO sin zona
/// (`2024-01-01T10:00` / `2024-01-01T10:00:00`), que se interpreta como UTC.
pub fn parse_datetime(value: &str) -> Result<DateTime<Utc>, AppError> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("'{}' is not a valid ISO-8601 timestamp", value)))
}

/// Coste de daños: no negativo, guardado con 2 decimales
pub fn normalize_damage_cost(value: Decimal) -> Result<Decimal, AppError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(AppError::Validation("damage_cost cannot be negative".to_string()));
    }
    let mut cost = value.round_dp(2);
    cost.rescale(2);
    Ok(cost)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_plate_format() {
        assert!(validate_number_plate("KA-01-AB-1234").is_ok());
        assert!(validate_number_plate("MH12 XY 9").is_ok());
        assert!(validate_number_plate("-KA01").is_err());
        assert!(validate_number_plate("KA_01").is_err());
        assert!(validate_number_plate("").is_err());
    }

    #[test]
    fn test_phone_digits() {
        assert!(validate_phone("+91 98765 43210").is_ok());
        assert!(validate_phone("12345").is_err());
    }

    #[test]
    fn test_parse_datetime_forms() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_datetime("2024-01-01T10:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T10:00:00").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T10:00:00Z").unwrap(), expected);
        assert_eq!(parse_datetime("2024-01-01T15:30:00+05:30").unwrap(), expected);
        assert!(parse_datetime("mañana").is_err());
    }

    #[test]
    fn test_damage_cost_normalization() {
        assert_eq!(normalize_damage_cost(Decimal::from(500)).unwrap().to_string(), "500.00");
        assert!(normalize_damage_cost(Decimal::from(-1)).is_err());
        assert!(normalize_damage_cost(Decimal::ZERO).is_ok());
    }
}
