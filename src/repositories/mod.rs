//! Repositorios
//!
//! Capa de acceso a datos. Cada agregado tiene su trait y hay dos
//! implementaciones: PostgreSQL (`PgRepository`) y memoria
//! (`InMemoryRepository`). Las operaciones `*_exclusive` y `settle_booking`
//! son unidades atómicas: comprobación y escritura ocurren bajo el mismo
//! bloqueo o transacción.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Booking, BookingEvent, BookingFilter, DamageReport, UserProfile, Vehicle, VehicleFilters,
};
use crate::utils::errors::AppResult;

pub mod booking_repository;
pub mod memory_repository;
pub mod profile_repository;
pub mod vehicle_repository;

pub use memory_repository::InMemoryRepository;

#[async_trait]
pub trait VehicleRepository: Send + Sync {
    /// Falla con `DuplicatePlate` si la matrícula ya existe
    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle>;

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>>;

    /// Aplica filtros de texto, tipo y plazas; `only_available` lo resuelve el servicio
    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>>;

    async fn update_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle>;

    /// Borra el vehículo y, en cascada, sus reservas y reportes
    async fn delete_vehicle(&self, id: Uuid) -> AppResult<bool>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn bookings_for_vehicle(&self, vehicle_id: Uuid) -> AppResult<Vec<Booking>>;

    async fn active_vehicle_ids(&self) -> AppResult<HashSet<Uuid>>;

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>>;

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<Vec<Booking>>;

    /// Inserta la reserva sólo si el vehículo no tiene otra activa
    async fn insert_booking_exclusive(&self, booking: Booking) -> AppResult<Booking>;

    /// Cambia la ventana y el precio excluyendo la propia reserva del chequeo
    async fn reschedule_booking_exclusive(
        &self,
        booking_id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        total_price: Decimal,
    ) -> AppResult<Booking>;

    async fn apply_booking_event(&self, booking_id: Uuid, event: BookingEvent) -> AppResult<Booking>;

    /// Marca la reserva como devuelta y crea su reporte en una sola unidad
    async fn settle_booking(
        &self,
        booking_id: Uuid,
        report: DamageReport,
    ) -> AppResult<(Booking, DamageReport)>;

    async fn find_damage_report(&self, booking_id: Uuid) -> AppResult<Option<DamageReport>>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>>;

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile>;
}

/// Almacén completo que consumen los servicios
pub trait RentalStore: VehicleRepository + BookingRepository + ProfileRepository {}

impl<T> RentalStore for T where T: VehicleRepository + BookingRepository + ProfileRepository {}

/// Repositorio respaldado por PostgreSQL
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
