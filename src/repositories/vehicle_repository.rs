use async_trait::async_trait;
use uuid::Uuid;

use super::{PgRepository, VehicleRepository};
use crate::models::{Vehicle, VehicleFilters};
use crate::utils::errors::{map_constraint_violation, AppResult};

#[async_trait]
impl VehicleRepository for PgRepository {
    async fn insert_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let created = sqlx::query_as::<_, Vehicle>(
            r#"
            INSERT INTO vehicles (id, owner_id, name, vehicle_type, number_plate, seats, price_per_hour, image, is_available, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.owner_id)
        .bind(&vehicle.name)
        .bind(vehicle.vehicle_type)
        .bind(&vehicle.number_plate)
        .bind(vehicle.seats)
        .bind(vehicle.price_per_hour)
        .bind(&vehicle.image)
        .bind(vehicle.is_available)
        .bind(vehicle.created_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| map_constraint_violation(e, vehicle.id, Some(&vehicle.number_plate)))?;

        Ok(created)
    }

    async fn find_vehicle(&self, id: Uuid) -> AppResult<Option<Vehicle>> {
        let vehicle = sqlx::query_as::<_, Vehicle>("SELECT * FROM vehicles WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(vehicle)
    }

    async fn list_vehicles(&self, filters: &VehicleFilters) -> AppResult<Vec<Vehicle>> {
        // strpos en lugar de ILIKE para no interpretar '%' del usuario
        let vehicles = sqlx::query_as::<_, Vehicle>(
            r#"
            SELECT * FROM vehicles
            WHERE ($1::text IS NULL
                   OR strpos(lower(name), $1) > 0
                   OR strpos(lower(number_plate), $1) > 0)
              AND ($2::vehicle_type IS NULL OR vehicle_type = $2)
              AND ($3::int IS NULL OR seats >= $3)
            ORDER BY created_at DESC, id ASC
            "#,
        )
        .bind(filters.search_text())
        .bind(filters.vehicle_type)
        .bind(filters.seats)
        .fetch_all(self.pool())
        .await?;

        Ok(vehicles)
    }

    async fn update_vehicle(&self, vehicle: Vehicle) -> AppResult<Vehicle> {
        let updated = sqlx::query_as::<_, Vehicle>(
            r#"
            UPDATE vehicles
            SET name = $2, vehicle_type = $3, number_plate = $4, seats = $5, price_per_hour = $6, image = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.name)
        .bind(vehicle.vehicle_type)
        .bind(&vehicle.number_plate)
        .bind(vehicle.seats)
        .bind(vehicle.price_per_hour)
        .bind(&vehicle.image)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| map_constraint_violation(e, vehicle.id, Some(&vehicle.number_plate)))?;

        updated.ok_or_else(|| crate::utils::errors::not_found_error("Vehicle", &vehicle.id.to_string()))
    }

    async fn delete_vehicle(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM vehicles WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
