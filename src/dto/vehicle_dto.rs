use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Vehicle, VehicleType};
use crate::utils::validation::{validate_not_empty, validate_number_plate};

// Request para crear un vehículo
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_empty")]
    pub name: String,

    pub vehicle_type: VehicleType,

    #[validate(length(min = 2, max = 50), custom = "validate_number_plate")]
    pub number_plate: String,

    /// Si no se indica, se usa el valor por defecto del tipo
    #[validate(range(min = 1, max = 60))]
    pub seats: Option<i32>,

    #[validate(range(min = 1))]
    pub price_per_hour: i32,

    #[validate(length(max = 1024))]
    pub image: Option<String>,

    /// Sólo un administrador puede fijar otro propietario (o ninguno)
    pub owner_id: Option<Uuid>,
}

// Request para actualizar un vehículo; los campos ausentes no cambian
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 255), custom = "validate_not_empty")]
    pub name: Option<String>,

    pub vehicle_type: Option<VehicleType>,

    #[validate(length(min = 2, max = 50), custom = "validate_number_plate")]
    pub number_plate: Option<String>,

    #[validate(range(min = 1, max = 60))]
    pub seats: Option<i32>,

    #[validate(range(min = 1))]
    pub price_per_hour: Option<i32>,

    /// Ausente: se conserva; `null`: se borra
    #[serde(default, deserialize_with = "explicit_null")]
    #[validate(length(max = 1024))]
    pub image: Option<Option<String>>,
}

/// Distingue un campo ausente (`None`) de un `null` explícito (`Some(None)`)
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// Listado con los ids de vehículos que tienen una reserva activa
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct VehicleListingResponse {
    pub vehicles: Vec<Vehicle>,
    pub active_vehicle_ids: HashSet<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_image_absent_null_and_value() {
        let absent: UpdateVehicleRequest = serde_json::from_str(r#"{"seats": 5}"#).unwrap();
        assert_eq!(absent.image, None);

        let cleared: UpdateVehicleRequest = serde_json::from_str(r#"{"image": null}"#).unwrap();
        assert_eq!(cleared.image, Some(None));

        let replaced: UpdateVehicleRequest =
            serde_json::from_str(r#"{"image": "vehicles/new.jpg"}"#).unwrap();
        assert_eq!(replaced.image, Some(Some("vehicles/new.jpg".to_string())));
    }
}
