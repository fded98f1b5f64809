//! Servicio de liquidación
//!
//! Devolución del vehículo: la reserva pasa a `returned` y se crea su reporte
//! de daños en la misma unidad atómica. El reembolso es informativo.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::dto::booking_dto::SettlementResponse;
use crate::models::{Booking, DamageReport, Identity};
use crate::repositories::RentalStore;
use crate::services::booking_service::can_manage;
use crate::services::pricing_service::{compute_refund, ensure_storable};
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};
use crate::utils::validation::normalize_damage_cost;

pub struct SettlementService {
    store: Arc<dyn RentalStore>,
}

impl SettlementService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Reserva a la que `actor` tiene acceso como parte o administrador
    async fn authorized_booking(&self, booking_id: Uuid, actor: &dyn Identity, operation: &str) -> AppResult<Booking> {
        let booking = self
            .store
            .find_booking(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))?;
        let vehicle = self
            .store
            .find_vehicle(booking.vehicle_id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &booking.vehicle_id.to_string()))?;

        if !can_manage(&booking, &vehicle, actor) {
            return Err(forbidden_error(operation, "not a party to this booking"));
        }
        Ok(booking)
    }

    pub async fn return_vehicle(
        &self,
        booking_id: Uuid,
        actor: &dyn Identity,
        damage_cost: Decimal,
        damage_description: String,
        image: Option<String>,
    ) -> AppResult<SettlementResponse> {
        let damage_cost = ensure_storable(normalize_damage_cost(damage_cost)?, "damage_cost")?;
        self.authorized_booking(booking_id, actor, "return vehicle").await?;

        let report = DamageReport::new(booking_id, damage_description, damage_cost, image);
        let (booking, damage_report) = self.store.settle_booking(booking_id, report).await?;
        let refund = compute_refund(booking.security_deposit, damage_report.damage_cost);

        info!(
            "🏁 Reserva {} liquidada: daños {}, reembolso {}",
            booking.id, damage_report.damage_cost, refund
        );

        Ok(SettlementResponse {
            booking,
            damage_report,
            refund,
        })
    }

    pub async fn get_damage_report(&self, booking_id: Uuid, actor: &dyn Identity) -> AppResult<DamageReport> {
        self.authorized_booking(booking_id, actor, "view damage report").await?;
        self.store
            .find_damage_report(booking_id)
            .await?
            .ok_or_else(|| not_found_error("DamageReport", &booking_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::auth::AuthenticatedUser;
    use crate::models::{BookingStatus, Vehicle, VehicleType};
    use crate::repositories::InMemoryRepository;
    use crate::services::booking_service::BookingService;
    use crate::utils::errors::AppError;
    use chrono::{TimeZone, Utc};

    struct Fixture {
        settlements: SettlementService,
        customer: AuthenticatedUser,
        booking: Booking,
    }

    async fn fixture() -> Fixture {
        let store: Arc<dyn RentalStore> = Arc::new(InMemoryRepository::new());
        let owner_id = Uuid::new_v4();
        let vehicle = store
            .insert_vehicle(Vehicle {
                id: Uuid::new_v4(),
                owner_id: Some(owner_id),
                name: "Activa 6G".to_string(),
                vehicle_type: VehicleType::Bike,
                number_plate: "DL-03-XY-9090".to_string(),
                seats: 2,
                price_per_hour: 50,
                image: None,
                is_available: true,
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let customer = AuthenticatedUser::new(Uuid::new_v4(), &["customer"], false);
        let booking = BookingService::new(store.clone())
            .create_booking(
                vehicle.id,
                &customer,
                Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap(),
            )
            .await
            .unwrap();

        Fixture {
            settlements: SettlementService::new(store),
            customer,
            booking,
        }
    }

    #[tokio::test]
    async fn test_return_creates_report_and_refund() {
        let f = fixture().await;

        let settlement = f
            .settlements
            .return_vehicle(
                f.booking.id,
                &f.customer,
                Decimal::new(500, 0),
                "Scratched mirror".to_string(),
                None,
            )
            .await
            .unwrap();

        assert_eq!(settlement.booking.status, BookingStatus::Returned);
        assert_eq!(settlement.damage_report.booking_id, f.booking.id);
        assert_eq!(settlement.damage_report.damage_cost, Decimal::new(50000, 2));
        assert_eq!(settlement.refund, Decimal::new(150000, 2));

        let report = f.settlements.get_damage_report(f.booking.id, &f.customer).await.unwrap();
        assert_eq!(report, settlement.damage_report);
    }

    #[tokio::test]
    async fn test_second_return_is_rejected() {
        let f = fixture().await;
        f.settlements
            .return_vehicle(f.booking.id, &f.customer, Decimal::ZERO, String::new(), None)
            .await
            .unwrap();

        let err = f
            .settlements
            .return_vehicle(f.booking.id, &f.customer, Decimal::ZERO, String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidStateTransition(_)));
    }

    #[tokio::test]
    async fn test_damage_above_deposit_gives_negative_refund() {
        let f = fixture().await;

        let settlement = f
            .settlements
            .return_vehicle(f.booking.id, &f.customer, Decimal::new(2500, 0), "Totalled".to_string(), None)
            .await
            .unwrap();
        assert_eq!(settlement.refund, Decimal::new(-50000, 2));
    }

    #[tokio::test]
    async fn test_oversized_damage_cost_rejected_without_settling() {
        let f = fixture().await;

        let err = f
            .settlements
            .return_vehicle(
                f.booking.id,
                &f.customer,
                Decimal::new(10_000_000_000, 2),
                "Written off".to_string(),
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        // La reserva sigue abierta y se puede liquidar con un coste válido
        let settlement = f
            .settlements
            .return_vehicle(f.booking.id, &f.customer, Decimal::ZERO, String::new(), None)
            .await
            .unwrap();
        assert_eq!(settlement.refund, Decimal::new(200000, 2));
    }

    #[tokio::test]
    async fn test_negative_cost_and_strangers_rejected() {
        let f = fixture().await;

        let err = f
            .settlements
            .return_vehicle(f.booking.id, &f.customer, Decimal::new(-1, 0), String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stranger = AuthenticatedUser::new(Uuid::new_v4(), &["customer"], false);
        let err = f
            .settlements
            .return_vehicle(f.booking.id, &stranger, Decimal::ZERO, String::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        // Sin liquidación no hay reporte
        let err = f.settlements.get_damage_report(f.booking.id, &f.customer).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
