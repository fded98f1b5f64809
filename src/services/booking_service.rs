//! Servicio de reservas
//!
//! Ciclo de vida de una reserva: creación, reprogramación y cambios de
//! estado. La creación comprueba disponibilidad antes de calcular el precio,
//! pero la garantía de exclusividad la da `insert_booking_exclusive`.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Booking, BookingEvent, BookingFilter, Identity, Vehicle};
use crate::repositories::RentalStore;
use crate::services::availability_service::AvailabilityChecker;
use crate::services::pricing_service::{compute_price, ensure_storable, security_deposit};
use crate::utils::errors::{forbidden_error, not_found_error, AppError, AppResult};

pub struct BookingService {
    store: Arc<dyn RentalStore>,
}

impl BookingService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    async fn vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    pub async fn get_booking(&self, id: Uuid) -> AppResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))
    }

    /// Crea una reserva pendiente a nombre de quien la pide
    pub async fn create_booking(
        &self,
        vehicle_id: Uuid,
        requester: &dyn Identity,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let vehicle = self.vehicle(vehicle_id).await?;

        if vehicle.is_owned_by(requester.user_id()) {
            warn!("🚫 Usuario {} intentó reservar su propio vehículo {}", requester.user_id(), vehicle_id);
            return Err(AppError::SelfBooking);
        }

        let (start_time, end_time) = window(start_time, end_time)?;

        let checker = AvailabilityChecker::new(self.store.clone());
        if !checker.is_available(vehicle_id, None).await? {
            return Err(AppError::VehicleUnavailable(vehicle_id));
        }

        let booking = Booking::pending(
            vehicle_id,
            requester.user_id(),
            start_time,
            end_time,
            ensure_storable(compute_price(vehicle.price_per_hour, start_time, end_time), "total_price")?,
            security_deposit(),
        );

        let booking = self.store.insert_booking_exclusive(booking).await?;
        info!(
            "📅 Reserva {} creada para vehículo {} ({} + depósito {})",
            booking.id, vehicle_id, booking.total_price, booking.security_deposit
        );
        Ok(booking)
    }

    pub async fn list_bookings(&self, filter: BookingFilter) -> AppResult<Vec<Booking>> {
        self.store.list_bookings(&filter).await
    }

    /// Cambia la ventana de una reserva aún no recogida y recalcula el precio
    pub async fn reschedule_booking(
        &self,
        booking_id: Uuid,
        requester: &dyn Identity,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> AppResult<Booking> {
        let current = self.get_booking(booking_id).await?;
        if current.user_id != requester.user_id() {
            return Err(forbidden_error("reschedule booking", "only the requester can reschedule"));
        }

        let (start_time, end_time) = window(start_time, end_time)?;
        let vehicle = self.vehicle(current.vehicle_id).await?;
        let total_price = ensure_storable(
            compute_price(vehicle.price_per_hour, start_time, end_time),
            "total_price",
        )?;

        let booking = self
            .store
            .reschedule_booking_exclusive(booking_id, start_time, end_time, total_price)
            .await?;
        info!("🔁 Reserva {} reprogramada ({})", booking.id, booking.total_price);
        Ok(booking)
    }

    /// Aplica un evento externo (confirmación, recogida, cancelación).
    /// Confirmar y recoger quedan para el dueño o un administrador; quien
    /// reservó sólo puede cancelar. La devolución sólo entra por la liquidación.
    pub async fn transition_booking(
        &self,
        booking_id: Uuid,
        actor: &dyn Identity,
        event: BookingEvent,
    ) -> AppResult<Booking> {
        if event == BookingEvent::Return {
            return Err(AppError::InvalidStateTransition(
                "returns must go through settlement".to_string(),
            ));
        }

        let current = self.get_booking(booking_id).await?;
        let vehicle = self.vehicle(current.vehicle_id).await?;
        let allowed = match event {
            // Confirmación y recogida las registra quien entrega el vehículo
            BookingEvent::Confirm | BookingEvent::Start => {
                vehicle.is_owned_by(actor.user_id()) || actor.is_admin()
            }
            _ => can_manage(&current, &vehicle, actor),
        };
        if !allowed {
            return Err(forbidden_error(
                "change booking status",
                "not allowed to apply this event to the booking",
            ));
        }

        let booking = self.store.apply_booking_event(booking_id, event).await?;
        info!("🔄 Reserva {}: {:?} -> {}", booking.id, event, booking.status.as_str());
        Ok(booking)
    }
}

/// Quien reservó, el dueño del vehículo o un administrador
pub(crate) fn can_manage(booking: &Booking, vehicle: &Vehicle, actor: &dyn Identity) -> bool {
    booking.user_id == actor.user_id() || vehicle.is_owned_by(actor.user_id()) || actor.is_admin()
}

fn window(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (start, end) = (start.trunc_subsecs(6), end.trunc_subsecs(6));
    if end <= start {
        return Err(AppError::InvalidInterval);
    }
    Ok((start, end))
}
