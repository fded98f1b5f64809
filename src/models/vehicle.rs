//! Modelo de Vehicle
//!
//! Este módulo contiene el struct Vehicle y su tipo.
//! Mapea exactamente a la tabla vehicles del schema PostgreSQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;

/// Tipo de vehículo - mapea al ENUM vehicle_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "vehicle_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    Car,
    Bike,
}

impl VehicleType {
    /// Número de plazas por defecto cuando no se indica explícitamente
    pub fn default_seats(self) -> i32 {
        match self {
            VehicleType::Car => 4,
            VehicleType::Bike => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Car => "car",
            VehicleType::Bike => "bike",
        }
    }
}

/// Vehicle principal
///
/// `is_available` se conserva por compatibilidad con el schema, pero la
/// disponibilidad real se deriva siempre de las reservas activas.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Vehicle {
    pub id: Uuid,
    pub owner_id: Option<Uuid>,
    pub name: String,
    pub vehicle_type: VehicleType,
    pub number_plate: String,
    pub seats: i32,
    pub price_per_hour: i32,
    pub image: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl Vehicle {
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner_id == Some(user_id)
    }
}

/// Filtros para búsqueda de vehículos
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VehicleFilters {
    pub search: Option<String>,
    pub vehicle_type: Option<VehicleType>,
    /// Mínimo de plazas
    pub seats: Option<i32>,
    #[serde(default)]
    pub only_available: bool,
}

impl VehicleFilters {
    /// Texto de búsqueda normalizado, ignorando cadenas vacías
    pub fn search_text(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Aplica los filtros de catálogo (texto, tipo y plazas) a un vehículo
    pub fn matches(&self, vehicle: &Vehicle) -> bool {
        if let Some(text) = self.search_text() {
            let in_name = vehicle.name.to_lowercase().contains(&text);
            let in_plate = vehicle.number_plate.to_lowercase().contains(&text);
            if !in_name && !in_plate {
                return false;
            }
        }
        if let Some(vehicle_type) = self.vehicle_type {
            if vehicle.vehicle_type != vehicle_type {
                return false;
            }
        }
        if let Some(seats) = self.seats {
            if vehicle.seats < seats {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vehicle {
        Vehicle {
            id: Uuid::new_v4(),
            owner_id: None,
            name: "Swift Dzire".to_string(),
            vehicle_type: VehicleType::Car,
            number_plate: "KA-01-AB-1234".to_string(),
            seats: 4,
            price_per_hour: 150,
            image: None,
            is_available: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_default_seats_by_type() {
        assert_eq!(VehicleType::Car.default_seats(), 4);
        assert_eq!(VehicleType::Bike.default_seats(), 2);
    }

    #[test]
    fn test_filters_match_name_or_plate_case_insensitive() {
        let vehicle = sample();
        let by_name = VehicleFilters { search: Some("swift".into()), ..Default::default() };
        let by_plate = VehicleFilters { search: Some("ab-12".into()), ..Default::default() };
        let miss = VehicleFilters { search: Some("activa".into()), ..Default::default() };

        assert!(by_name.matches(&vehicle));
        assert!(by_plate.matches(&vehicle));
        assert!(!miss.matches(&vehicle));
    }

    #[test]
    fn test_filters_seats_is_a_minimum() {
        let vehicle = sample();
        let two = VehicleFilters { seats: Some(2), ..Default::default() };
        let six = VehicleFilters { seats: Some(6), ..Default::default() };
        let bikes = VehicleFilters { vehicle_type: Some(VehicleType::Bike), ..Default::default() };

        assert!(two.matches(&vehicle));
        assert!(!six.matches(&vehicle));
        assert!(!bikes.matches(&vehicle));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filters = VehicleFilters { search: Some("   ".into()), ..Default::default() };
        assert_eq!(filters.search_text(), None);
        assert!(filters.matches(&sample()));
    }
}
