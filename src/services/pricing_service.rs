//! Motor de precios
//!
//! precio = horas × tarifa, con horas fraccionarias, redondeado a 2 decimales
//! con redondeo bancario (mitad al par). El depósito es fijo.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::utils::errors::{AppError, AppResult};

/// Depósito de garantía por reserva, en unidades de moneda
pub const SECURITY_DEPOSIT_UNITS: i64 = 2000;

const MILLIS_PER_HOUR: i64 = 3_600_000;

/// Mayor importe que cabe en una columna `numeric(10,2)`
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

pub fn security_deposit() -> Decimal {
    Decimal::new(SECURITY_DEPOSIT_UNITS * 100, 2)
}

/// Precio total de una ventana. No valida el orden de las fechas: quien
/// llama debe rechazar `end <= start` antes.
pub fn compute_price(price_per_hour: i32, start: DateTime<Utc>, end: DateTime<Utc>) -> Decimal {
    let millis = Decimal::from((end - start).num_milliseconds());
    let raw = millis * Decimal::from(price_per_hour) / Decimal::from(MILLIS_PER_HOUR);

    let mut price = raw.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    price.rescale(2);
    price
}

/// Rechaza importes que no caben en la columna monetaria
pub fn ensure_storable(amount: Decimal, field: &str) -> AppResult<Decimal> {
    if amount.abs() > MAX_AMOUNT {
        return Err(AppError::Validation(format!(
            "{} {} exceeds the maximum of {}",
            field, amount, MAX_AMOUNT
        )));
    }
    Ok(amount)
}

/// Reembolso informativo; puede ser negativo si el daño supera el depósito
pub fn compute_refund(security_deposit: Decimal, damage_cost: Decimal) -> Decimal {
    security_deposit - damage_cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_two_hours_at_100() {
        let price = compute_price(100, t0(), Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
        assert_eq!(price, Decimal::new(20000, 2));
        assert_eq!(price.to_string(), "200.00");
    }

    #[test]
    fn test_price_is_linear_in_duration() {
        for rate in [1, 37, 100, 2500] {
            let one = compute_price(rate, t0(), t0() + Duration::hours(1));
            let two = compute_price(rate, t0(), t0() + Duration::hours(2));
            assert_eq!(two, one * Decimal::from(2));
        }
    }

    #[test]
    fn test_fractional_hours_billed_proportionally() {
        let price = compute_price(100, t0(), t0() + Duration::minutes(90));
        assert_eq!(price, Decimal::from(150));
    }

    #[test]
    fn test_one_second_prices_at_rate_over_3600() {
        assert_eq!(compute_price(3600, t0(), t0() + Duration::seconds(1)), Decimal::ONE);
        // 100 / 3600 = 0.02777…
        assert_eq!(
            compute_price(100, t0(), t0() + Duration::seconds(1)),
            Decimal::new(3, 2)
        );
    }

    #[test]
    fn test_midpoint_rounds_to_even() {
        // 18 s a tarifa 1 = 0.005 -> 0.00 ; 54 s = 0.015 -> 0.02
        assert_eq!(compute_price(1, t0(), t0() + Duration::seconds(18)), Decimal::ZERO);
        assert_eq!(
            compute_price(1, t0(), t0() + Duration::seconds(54)),
            Decimal::new(2, 2)
        );
    }

    #[test]
    fn test_deposit_is_fixed() {
        assert_eq!(security_deposit(), Decimal::from(2000));
        assert_eq!(security_deposit().to_string(), "2000.00");
    }

    #[test]
    fn test_refund_is_not_clamped() {
        assert_eq!(compute_refund(security_deposit(), Decimal::from(500)), Decimal::from(1500));
        assert_eq!(compute_refund(security_deposit(), Decimal::from(2600)), Decimal::from(-600));
    }

    #[test]
    fn test_storable_bound_matches_numeric_10_2() {
        assert_eq!(MAX_AMOUNT, Decimal::new(9_999_999_999, 2));
        assert_eq!(ensure_storable(MAX_AMOUNT, "total_price").unwrap(), MAX_AMOUNT);

        let err = ensure_storable(MAX_AMOUNT + Decimal::new(1, 2), "total_price").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // Tarifa 1000 durante 100.000 horas
        let price = compute_price(1000, t0(), t0() + Duration::hours(100_000));
        assert!(ensure_storable(price, "total_price").is_err());
    }
}
