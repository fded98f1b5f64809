//! Wheelzy
//!
//! Backend de alquiler de vehículos: catálogo, reservas con exclusividad por
//! vehículo, precios y liquidación de daños al devolver.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

pub use routes::create_app;
pub use state::AppState;
