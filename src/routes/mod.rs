//! Rutas HTTP
//!
//! Handlers finos sobre los servicios. La autenticación se resuelve con el
//! extractor `AuthenticatedUser` en cada handler que la necesita.

pub mod booking_routes;
pub mod profile_routes;
pub mod vehicle_routes;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo de la API
pub fn create_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(health))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/bookings", booking_routes::create_booking_router())
        .nest("/api/profile", profile_routes::create_profile_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "wheelzy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
