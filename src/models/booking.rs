//! Modelo de Booking
//!
//! Contiene la reserva, su máquina de estados y el reporte de daños
//! que se crea al devolver el vehículo.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

use crate::utils::errors::{AppError, AppResult};

/// Estado de la reserva - mapea al ENUM booking_status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "booking_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InUse,
    Returned,
    Cancelled,
}

/// Eventos que hacen avanzar una reserva
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingEvent {
    /// Pago o aprobación externa
    Confirm,
    /// Recogida del vehículo
    Start,
    Return,
    Cancel,
}

impl BookingStatus {
    /// Estados que bloquean el vehículo
    pub const ACTIVE: [BookingStatus; 3] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::InUse,
    ];

    pub fn is_active(self) -> bool {
        Self::ACTIVE.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BookingStatus::Returned | BookingStatus::Cancelled)
    }

    /// Sólo se puede cambiar la ventana antes de la recogida
    pub fn is_reschedulable(self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InUse => "in_use",
            BookingStatus::Returned => "returned",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Tabla de transiciones: (estado actual, evento) -> siguiente estado
    pub fn next(self, event: BookingEvent) -> Option<BookingStatus> {
        use BookingEvent as E;
        use BookingStatus as S;

        match (self, event) {
            (S::Pending, E::Confirm) => Some(S::Confirmed),
            (S::Pending | S::Confirmed, E::Start) => Some(S::InUse),
            (S::Pending | S::Confirmed | S::InUse, E::Return) => Some(S::Returned),
            (S::Pending | S::Confirmed, E::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }

    /// Igual que `next`, pero rechaza las transiciones no listadas
    pub fn apply(self, event: BookingEvent) -> AppResult<BookingStatus> {
        self.next(event).ok_or_else(|| {
            AppError::InvalidStateTransition(format!(
                "cannot apply {:?} to a {} booking",
                event,
                self.as_str()
            ))
        })
    }
}

/// Booking principal - mapea exactamente a la tabla bookings
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Booking {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub user_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_price: Decimal,
    pub security_deposit: Decimal,
    pub status: BookingStatus,
    pub ordered_at: DateTime<Utc>,
}

impl Booking {
    /// Nueva reserva pendiente; `ordered_at` queda fijado aquí
    pub fn pending(
        vehicle_id: Uuid,
        user_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        total_price: Decimal,
        security_deposit: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            vehicle_id,
            user_id,
            start_time,
            end_time,
            total_price,
            security_deposit,
            status: BookingStatus::Pending,
            ordered_at: Utc::now().trunc_subsecs(6),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Reporte de daños, uno por reserva
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct DamageReport {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub damage_description: String,
    pub damage_cost: Decimal,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DamageReport {
    pub fn new(
        booking_id: Uuid,
        damage_description: String,
        damage_cost: Decimal,
        image: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            booking_id,
            damage_description,
            damage_cost,
            image,
            created_at: Utc::now().trunc_subsecs(6),
        }
    }
}

/// Filtro para listados de reservas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub by_user: Option<Uuid>,
    /// Reservas de los vehículos de este propietario
    pub by_owner: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let confirmed = BookingStatus::Pending.apply(BookingEvent::Confirm).unwrap();
        assert_eq!(confirmed, BookingStatus::Confirmed);

        let in_use = confirmed.apply(BookingEvent::Start).unwrap();
        assert_eq!(in_use, BookingStatus::InUse);

        let returned = in_use.apply(BookingEvent::Return).unwrap();
        assert_eq!(returned, BookingStatus::Returned);
    }

    #[test]
    fn test_pending_can_skip_confirmation() {
        assert_eq!(
            BookingStatus::Pending.next(BookingEvent::Start),
            Some(BookingStatus::InUse)
        );
        assert_eq!(
            BookingStatus::Pending.next(BookingEvent::Cancel),
            Some(BookingStatus::Cancelled)
        );
    }

    #[test]
    fn test_terminal_states_reject_every_event() {
        for status in [BookingStatus::Returned, BookingStatus::Cancelled] {
            assert!(status.is_terminal());
            for event in [
                BookingEvent::Confirm,
                BookingEvent::Start,
                BookingEvent::Return,
                BookingEvent::Cancel,
            ] {
                let err = status.apply(event).unwrap_err();
                assert!(matches!(err, AppError::InvalidStateTransition(_)));
            }
        }
    }

    #[test]
    fn test_in_use_cannot_be_cancelled_or_reconfirmed() {
        assert_eq!(BookingStatus::InUse.next(BookingEvent::Cancel), None);
        assert_eq!(BookingStatus::InUse.next(BookingEvent::Confirm), None);
        assert_eq!(BookingStatus::Confirmed.next(BookingEvent::Confirm), None);
    }

    #[test]
    fn test_active_set() {
        assert!(BookingStatus::Pending.is_active());
        assert!(BookingStatus::Confirmed.is_active());
        assert!(BookingStatus::InUse.is_active());
        assert!(!BookingStatus::Returned.is_active());
        assert!(!BookingStatus::Cancelled.is_active());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&BookingStatus::InUse).unwrap();
        assert_eq!(json, "\"in_use\"");
    }
}
