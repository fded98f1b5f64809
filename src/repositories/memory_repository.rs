//! Repositorio en memoria
//!
//! Mismas garantías que la implementación PostgreSQL: todas las tablas viven
//! detrás de un único `Mutex`, así que cada operación compuesta se ejecuta
//! como una unidad sin ventanas intermedias.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{BookingRepository, ProfileRepository, VehicleRepository};
use crate::models::{
    Booking, BookingEvent, BookingFilter, DamageReport, UserProfile, Vehicle, VehicleFilters,
};
use crate::services::availability_service::is_vehicle_free;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Default)]
struct Tables {
    vehicles: HashMap<Uuid, Vehicle>,
    bookings: HashMap<Uuid, Booking>,
    /// Indexado por booking_id
    damage_reports: HashMap<Uuid, DamageReport>,
    profiles: HashMap<Uuid, UserProfile>,
}

impl Tables {
    fn plate_taken(&self, plate: &str, except: Uuid) -> bool {
        self.vehicles
            .values()
            .any(|v| v.id != except && v.number_plate == plate)
    }

    fn bookings_of(&self, vehicle_id: Uuid) -> Vec<Booking> {
        self.bookings
            .values()
            .filter(|b| b.vehicle_id == vehicle_id)
            .cloned()
            .collect()
    }

    fn booking(&self, id: Uuid) -> AppResult<&Booking> {
        self.bookings
            .get(&id)
            .ok_or_else(|| not_found_error("Booking", &id.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VehicleRepository for InMemoryRepository {
    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        if tables.plate_taken(&vehicle.number_plate, vehicle.id) {
            return Err(AppError::DuplicatePlate(vehicle.number_plate));
        }
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let tables = self.tables.lock().await;
        Ok(tables.vehicles.get(&id).cloned())
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        let tables = self.tables.lock().await;
        let mut vehicles: Vec<Vehicle> = tables
            .vehicles
            .values()
            .filter(|v| filters.matches(v))
            .cloned()
            .collect();
        vehicles.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(vehicles)
    }

    async fn update_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let mut tables = self.tables.lock().await;
        if !tables.vehicles.contains_key(&vehicle.id) {
            return Err(not_found_error("Vehicle", &vehicle.id.to_string()));
        }
        if tables.plate_taken(&vehicle.number_plate, vehicle.id) {
            return Err(AppError::DuplicatePlate(vehicle.number_plate));
        }
        tables.vehicles.insert(vehicle.id, vehicle.clone());
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.vehicles.remove(&id).is_none() {
            return Ok(false);
        }

        let removed: Vec<Uuid> = tables
            .bookings
            .values()
            .filter(|b| b.vehicle_id == id)
            .map(|b| b.id)
            .collect();
        for booking_id in removed {
            tables.bookings.remove(&booking_id);
            tables.damage_reports.remove(&booking_id);
        }
        Ok(true)
    }
}

#[async_trait]
impl BookingRepository for InMemoryRepository {
    async fn bookings_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut bookings = tables.bookings_of(vehicle_id);
        bookings.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn active_vehicle_ids(&self) -> AppResult<HashSet<Uuid>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .bookings
            .values()
            .filter(|b| b.is_active())
            .map(|b| b.vehicle_id)
            .collect())
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let tables = self.tables.lock().await;
        Ok(tables.bookings.get(&id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>> {
        let tables = self.tables.lock().await;
        let mut bookings: Vec<Booking> = tables
            .bookings
            .values()
            .filter(|b| filter.by_user.map_or(true, |user| b.user_id == user))
            .filter(|b| {
                filter.by_owner.map_or(true, |owner| {
                    tables
                        .vehicles
                        .get(&b.vehicle_id)
                        .map_or(false, |v| v.is_owned_by(owner))
                })
            })
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.ordered_at.cmp(&a.ordered_at).then(a.id.cmp(&b.id)));
        Ok(bookings)
    }

    async fn insert_booking_exclusive(&self, booking: Booking) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        if !tables.vehicles.contains_key(&booking.vehicle_id) {
            return Err(not_found_error("Vehicle", &booking.vehicle_id.to_string()));
        }
        if !is_vehicle_free(&tables.bookings_of(booking.vehicle_id), None) {
            return Err(AppError::VehicleUnavailable(booking.vehicle_id));
        }
        tables.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn reschedule_booking_exclusive(
        &self,
        booking_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        total_price: Decimal,
    ) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        let current = tables.booking(booking_id)?.clone();

        if !current.status.is_reschedulable() {
            return Err(AppError::InvalidStateTransition(format!(
                "cannot reschedule a {} booking",
                current.status.as_str()
            )));
        }
        if !is_vehicle_free(&tables.bookings_of(current.vehicle_id), Some(booking_id)) {
            return Err(AppError::VehicleUnavailable(current.vehicle_id));
        }

        let updated = Booking {
            start_time,
            end_time,
            total_price,
            ..current
        };
        tables.bookings.insert(booking_id, updated.clone());
        Ok(updated)
    }

    async fn apply_booking_event(&self, booking_id: Uuid, event: BookingEvent) -> AppResult<Booking> {
        let mut tables = self.tables.lock().await;
        let current = tables.booking(booking_id)?.clone();
        let status = current.status.apply(event)?;

        let updated = Booking { status, ..current };
        tables.bookings.insert(booking_id, updated.clone());
        Ok(updated)
    }

    async fn settle_booking(
        &self,
        booking_id: Uuid,
        report: DamageReport,
    ) -> AppResult<(Booking, DamageReport)> {
        let mut tables = self.tables.lock().await;
        let current = tables.booking(booking_id)?.clone();
        let status = current.status.apply(BookingEvent::Return)?;

        if tables.damage_reports.contains_key(&booking_id) {
            return Err(AppError::DuplicateReport(booking_id));
        }

        // Ambas escrituras se validan antes, así que no hay aplicación parcial
        let report = DamageReport { booking_id, ..report };
        let updated = Booking { status, ..current };
        tables.bookings.insert(booking_id, updated.clone());
        tables.damage_reports.insert(booking_id, report.clone());
        Ok((updated, report))
    }

    async fn find_damage_report(&self, booking_id: Uuid) -> AppResult<Option<DamageReport>> {
        let tables = self.tables.lock().await;
        Ok(tables.damage_reports.get(&booking_id).cloned())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryRepository {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let tables = self.tables.lock().await;
        Ok(tables.profiles.get(&user_id).cloned())
    }

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        let mut tables = self.tables.lock().await;
        let saved = match tables.profiles.get(&profile.user_id) {
            Some(existing) => UserProfile {
                created_at: existing.created_at,
                ..profile
            },
            None => profile,
        };
        tables.profiles.insert(saved.user_id, saved.clone());
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, VehicleType};
    use chrono::Duration;

    fn vehicle(plate: &str) -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            owner_id: Some(Uuid::new_v4()),
            name: "Activa".to_string(),
            vehicle_type: VehicleType::Bike,
            number_plate: plate.to_string(),
            seats: 2,
            price_per_hour: 50,
            image: None,
            is_available: true,
            created_at: Utc::now(),
        }
    }

    fn booking_for(vehicle_id: Uuid) -> Booking {
        let start = Utc::now();
        Booking::pending(
            vehicle_id,
            Uuid::new_v4(),
            start,
            start + Duration::hours(1),
            Decimal::new(5000, 2),
            Decimal::new(200000, 2),
        )
    }

    #[tokio::test]
    async fn test_duplicate_plate_rejected() {
        let repo = InMemoryRepository::new();
        repo.insert_vehicle(vehicle("MH-12-XY-0001")).await.unwrap();

        let err = repo.insert_vehicle(vehicle("MH-12-XY-0001")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicatePlate(_)));
    }

    #[tokio::test]
    async fn test_delete_vehicle_cascades_bookings_and_reports() {
        let repo = InMemoryRepository::new();
        let v = repo.insert_vehicle(vehicle("MH-12-XY-0002")).await.unwrap();
        let b = repo.insert_booking_exclusive(booking_for(v.id)).await.unwrap();
        repo.settle_booking(b.id, DamageReport::new(b.id, String::new(), Decimal::ZERO, None))
            .await
            .unwrap();

        assert!(repo.delete_vehicle(v.id).await.unwrap());
        assert!(repo.find_booking(b.id).await.unwrap().is_none());
        assert!(repo.find_damage_report(b.id).await.unwrap().is_none());
        assert!(!repo.delete_vehicle(v.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_settlement_leaves_no_partial_state() {
        let repo = InMemoryRepository::new();
        let v = repo.insert_vehicle(vehicle("MH-12-XY-0003")).await.unwrap();
        let b = repo.insert_booking_exclusive(booking_for(v.id)).await.unwrap();
        repo.apply_booking_event(b.id, BookingEvent::Cancel).await.unwrap();

        let err = repo
            .settle_booking(b.id, DamageReport::new(b.id, "golpe".into(), Decimal::from(100), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidStateTransition(_)));
        assert!(repo.find_damage_report(b.id).await.unwrap().is_none());
        let stored = repo.find_booking(b.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_profile_upsert_keeps_created_at() {
        let repo = InMemoryRepository::new();
        let user_id = Uuid::new_v4();
        let first_seen = Utc::now() - Duration::days(3);
        let first = repo
            .upsert_profile(UserProfile {
                user_id,
                phone: "9876543210".into(),
                address: "MG Road".into(),
                created_at: first_seen,
                updated_at: first_seen,
            })
            .await
            .unwrap();

        let second = repo
            .upsert_profile(UserProfile {
                user_id,
                phone: "9123456780".into(),
                address: "Brigade Road".into(),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.phone, "9123456780");
    }
}
