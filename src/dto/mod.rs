//! DTOs de la API
//!
//! Requests y responses que viajan por HTTP.

pub mod api_response;
pub mod booking_dto;
pub mod profile_dto;
pub mod vehicle_dto;

pub use api_response::ApiResponse;
