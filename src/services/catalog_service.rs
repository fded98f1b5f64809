//! Servicio de catálogo
//!
//! Alta, consulta, edición y borrado de vehículos. Sólo el propietario puede
//! editar su vehículo; el borrado lo puede hacer también un administrador.

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleListingResponse};
use crate::models::{Identity, Vehicle, VehicleFilters};
use crate::repositories::RentalStore;
use crate::utils::errors::{forbidden_error, not_found_error, AppResult};

pub struct CatalogService {
    store: Arc<dyn RentalStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    /// Listado filtrado más el conjunto de vehículos con reserva activa
    pub async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<VehicleListingResponse> {
        let active_vehicle_ids = self.store.active_vehicle_ids().await?;
        let mut vehicles = self.store.list_vehicles(filters).await?;

        if filters.only_available {
            vehicles.retain(|v| !active_vehicle_ids.contains(&v.id));
        }

        Ok(VehicleListingResponse {
            vehicles,
            active_vehicle_ids,
        })
    }

    pub async fn get_vehicle(&self, id: Uuid) -> AppResult<Vehicle> {
        self.store
            .find_vehicle(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))
    }

    pub async fn create_vehicle(
        &self,
        actor: &dyn Identity,
        request: CreateVehicleRequest,
    ) -> AppResult<Vehicle> {
        request.validate()?;

        let owner_id = if actor.is_admin() {
            request.owner_id
        } else if actor.is_owner() {
            match request.owner_id {
                Some(other) if other != actor.user_id() => {
                    return Err(forbidden_error("create vehicle", "owners can only list their own vehicles"));
                }
                _ => Some(actor.user_id()),
            }
        } else {
            return Err(forbidden_error("create vehicle", "owner role required"));
        };

        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            owner_id,
            name: request.name,
            vehicle_type: request.vehicle_type,
            number_plate: request.number_plate,
            seats: request
                .seats
                .unwrap_or_else(|| request.vehicle_type.default_seats()),
            price_per_hour: request.price_per_hour,
            image: request.image,
            is_available: true,
            // PostgreSQL guarda microsegundos
            created_at: Utc::now().trunc_subsecs(6),
        };

        let vehicle = self.store.insert_vehicle(vehicle).await?;
        info!("🚗 Vehículo {} creado ({})", vehicle.id, vehicle.number_plate);
        Ok(vehicle)
    }

    /// Sólo el propietario edita. Las plazas se recalculan por defecto
    /// únicamente si cambia el tipo y no se envían explícitamente.
    pub async fn update_vehicle(
        &self,
        id: Uuid,
        editor: &dyn Identity,
        request: UpdateVehicleRequest,
    ) -> AppResult<Vehicle> {
        request.validate()?;

        let current = self.get_vehicle(id).await?;
        if !current.is_owned_by(editor.user_id()) {
            return Err(forbidden_error("update vehicle", "only the owner can edit it"));
        }

        let vehicle_type = request.vehicle_type.unwrap_or(current.vehicle_type);
        let seats = match request.seats {
            Some(seats) => seats,
            None if vehicle_type != current.vehicle_type => vehicle_type.default_seats(),
            None => current.seats,
        };

        let updated = Vehicle {
            name: request.name.unwrap_or(current.name),
            vehicle_type,
            number_plate: request.number_plate.unwrap_or(current.number_plate),
            seats,
            price_per_hour: request.price_per_hour.unwrap_or(current.price_per_hour),
            image: request.image.unwrap_or(current.image),
            ..current
        };

        let vehicle = self.store.update_vehicle(updated).await?;
        info!("✏️ Vehículo {} actualizado", vehicle.id);
        Ok(vehicle)
    }

    /// Borra el vehículo junto con sus reservas y reportes
    pub async fn delete_vehicle(&self, id: Uuid, actor: &dyn Identity) -> AppResult<()> {
        let vehicle = self.get_vehicle(id).await?;
        if !vehicle.is_owned_by(actor.user_id()) && !actor.is_admin() {
            return Err(forbidden_error("delete vehicle", "only the owner or an admin can delete it"));
        }

        if !self.store.delete_vehicle(id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        info!("🗑️ Vehículo {} eliminado", id);
        Ok(())
    }
}
