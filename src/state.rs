//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::RentalStore;
use crate::services::{
    booking_service::BookingService, catalog_service::CatalogService,
    profile_service::ProfileService, settlement_service::SettlementService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RentalStore>,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn RentalStore>, config: EnvironmentConfig) -> Self {
        Self { store, config }
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.store.clone())
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(self.store.clone())
    }

    pub fn settlements(&self) -> SettlementService {
        SettlementService::new(self.store.clone())
    }

    pub fn profiles(&self) -> ProfileService {
        ProfileService::new(self.store.clone())
    }
}
