//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Nombres de las restricciones del schema que se traducen a errores de dominio
pub const PLATE_UNIQUE_CONSTRAINT: &str = "vehicles_number_plate_key";
pub const ACTIVE_BOOKING_CONSTRAINT: &str = "bookings_one_active_per_vehicle";
pub const DAMAGE_REPORT_CONSTRAINT: &str = "damage_reports_booking_id_key";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid interval: end time must be strictly after start time")]
    InvalidInterval,

    #[error("Owners cannot book their own vehicle")]
    SelfBooking,

    #[error("Vehicle {0} already has an active booking")]
    VehicleUnavailable(uuid::Uuid),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("A damage report already exists for booking {0}")]
    DuplicateReport(uuid::Uuid),

    #[error("Number plate '{0}' is already registered")]
    DuplicatePlate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl AppError {
    /// Código estable expuesto a los clientes
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInterval => "INVALID_INTERVAL",
            AppError::SelfBooking => "SELF_BOOKING",
            AppError::VehicleUnavailable(_) => "VEHICLE_UNAVAILABLE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::InvalidStateTransition(_) => "INVALID_STATE_TRANSITION",
            AppError::DuplicateReport(_) => "DUPLICATE_REPORT",
            AppError::DuplicatePlate(_) => "DUPLICATE_PLATE",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DB_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInterval | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) | AppError::SelfBooking => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::VehicleUnavailable(_)
            | AppError::InvalidStateTransition(_)
            | AppError::DuplicateReport(_)
            | AppError::DuplicatePlate(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();

        let error_response = match &self {
            AppError::Database(e) => {
                error!("❌ Error de base de datos: {}", e);
                ErrorResponse {
                    error: "Database Error".to_string(),
                    message: "An error occurred while accessing the database".to_string(),
                    details: Some(json!({ "sql_error": e.to_string() })),
                    code,
                }
            }

            AppError::Internal(msg) => {
                error!("❌ Error interno: {}", msg);
                ErrorResponse {
                    error: "Internal Server Error".to_string(),
                    message: "An unexpected error occurred".to_string(),
                    details: None,
                    code,
                }
            }

            other => {
                warn!("⚠️ Petición rechazada ({}): {}", other.code(), other);
                ErrorResponse {
                    error: status.canonical_reason().unwrap_or("Error").to_string(),
                    message: other.to_string(),
                    details: None,
                    code,
                }
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Traducir violaciones de restricciones de PostgreSQL a errores de dominio
pub fn map_constraint_violation(e: sqlx::Error, subject: uuid::Uuid, plate: Option<&str>) -> AppError {
    if let sqlx::Error::Database(db_error) = &e {
        match db_error.constraint() {
            Some(PLATE_UNIQUE_CONSTRAINT) => {
                return AppError::DuplicatePlate(plate.unwrap_or_default().to_string());
            }
            Some(ACTIVE_BOOKING_CONSTRAINT) => return AppError::VehicleUnavailable(subject),
            Some(DAMAGE_REPORT_CONSTRAINT) => return AppError::DuplicateReport(subject),
            _ => {}
        }
    }
    AppError::Database(e)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_map_to_statuses() {
        assert_eq!(AppError::InvalidInterval.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::SelfBooking.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::VehicleUnavailable(uuid::Uuid::nil()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DuplicatePlate("KA-01".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            not_found_error("Vehicle", "42").status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_non_constraint_database_error_stays_storage_error() {
        let mapped = map_constraint_violation(sqlx::Error::RowNotFound, uuid::Uuid::nil(), None);
        assert_eq!(mapped.code(), "DB_ERROR");
    }
}
