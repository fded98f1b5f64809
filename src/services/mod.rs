//! Services module
//!
//! Este módulo contiene la lógica de negocio de la aplicación. Los servicios
//! reciben el almacén como `Arc<dyn RentalStore>` y no conocen HTTP.

pub mod availability_service;
pub mod booking_service;
pub mod catalog_service;
pub mod pricing_service;
pub mod profile_service;
pub mod settlement_service;

pub use booking_service::BookingService;
pub use catalog_service::CatalogService;
pub use profile_service::ProfileService;
pub use settlement_service::SettlementService;
