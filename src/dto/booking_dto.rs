use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Booking, BookingEvent, DamageReport};

// Request para reservar o reprogramar; fechas en ISO-8601
#[derive(Debug, Clone, Deserialize)]
pub struct BookingWindowRequest {
    pub start_time: String,
    pub end_time: String,
}

// Cambios de estado que puede pedir un colaborador externo (pago, recogida, cancelación)
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StatusChange {
    Confirm,
    Start,
    Cancel,
}

impl From<StatusChange> for BookingEvent {
    fn from(change: StatusChange) -> Self {
        match change {
            StatusChange::Confirm => BookingEvent::Confirm,
            StatusChange::Start => BookingEvent::Start,
            StatusChange::Cancel => BookingEvent::Cancel,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub event: StatusChange,
}

// Request de devolución
#[derive(Debug, Clone, Deserialize)]
pub struct ReturnVehicleRequest {
    #[serde(default)]
    pub damage_cost: Decimal,
    #[serde(default)]
    pub damage_description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingScope {
    /// Reservas hechas por el usuario
    #[default]
    Mine,
    /// Reservas sobre los vehículos del usuario
    Owner,
    All,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingListQuery {
    #[serde(default)]
    pub scope: BookingScope,
}

// Resultado de la liquidación
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SettlementResponse {
    pub booking: Booking,
    pub damage_report: DamageReport,
    /// Informativo; puede ser negativo
    pub refund: Decimal,
}
