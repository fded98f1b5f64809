//! Modelos del sistema
//!
//! Este módulo contiene todos los modelos de datos que mapean exactamente
//! al schema PostgreSQL.

pub mod booking;
pub mod user;
pub mod vehicle;

pub use booking::{Booking, BookingEvent, BookingFilter, BookingStatus, DamageReport};
pub use user::{Identity, Role, UserProfile};
pub use vehicle::{Vehicle, VehicleFilters, VehicleType};
