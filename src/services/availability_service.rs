//! Servicio de disponibilidad
//!
//! Un vehículo está disponible si ninguna de sus reservas está en un estado
//! activo (pending, confirmed, in_use). El flag `is_available` del vehículo no
//! participa: la fuente de verdad son las reservas.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::Booking;
use crate::repositories::RentalStore;
use crate::utils::errors::AppResult;

/// Predicado puro sobre las reservas de un vehículo
pub fn is_vehicle_free(bookings: &[Booking], excluding: Option<Uuid>) -> bool {
    !bookings
        .iter()
        .filter(|b| Some(b.id) != excluding)
        .any(Booking::is_active)
}

pub struct AvailabilityChecker {
    store: Arc<dyn RentalStore>,
}

impl AvailabilityChecker {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Lectura sin efectos; la comprobación definitiva se repite dentro de
    /// la transacción de creación
    pub async fn is_available(&self, vehicle_id: Uuid, excluding: Option<Uuid>) -> AppResult<bool> {
        let bookings = self.store.bookings_for_vehicle(vehicle_id).await?;
        Ok(is_vehicle_free(&bookings, excluding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;

    fn booking(status: BookingStatus) -> Booking {
        let start = Utc::now();
        Booking {
            status,
            ..Booking::pending(
                Uuid::new_v4(),
                Uuid::new_v4(),
                start,
                start + Duration::hours(2),
                Decimal::from(200),
                Decimal::from(2000),
            )
        }
    }

    #[test]
    fn test_no_bookings_means_available() {
        assert!(is_vehicle_free(&[], None));
    }

    #[test]
    fn test_any_active_status_blocks() {
        for status in BookingStatus::ACTIVE {
            assert!(!is_vehicle_free(&[booking(status)], None), "{:?}", status);
        }
    }

    #[test]
    fn test_terminal_bookings_do_not_block() {
        let history = vec![booking(BookingStatus::Returned), booking(BookingStatus::Cancelled)];
        assert!(is_vehicle_free(&history, None));
    }

    #[test]
    fn test_excluded_booking_is_ignored() {
        let current = booking(BookingStatus::Pending);
        let id = current.id;
        let bookings = vec![current, booking(BookingStatus::Returned)];

        assert!(!is_vehicle_free(&bookings, None));
        assert!(is_vehicle_free(&bookings, Some(id)));
    }
}
