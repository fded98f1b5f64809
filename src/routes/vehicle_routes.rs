use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::booking_dto::BookingWindowRequest;
use crate::dto::vehicle_dto::{CreateVehicleRequest, UpdateVehicleRequest, VehicleListingResponse};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{Booking, Vehicle, VehicleFilters};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::parse_datetime;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/bookings", post(create_booking))
}

// El catálogo es público
async fn list_vehicles(
    State(state): State<AppState>,
    Query(filters): Query<VehicleFilters>,
) -> Result<Json<ApiResponse<VehicleListingResponse>>, AppError> {
    let listing = state.catalog().list_vehicles(&filters).await?;
    Ok(Json(ApiResponse::success(listing)))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = state.catalog().get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

async fn create_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Vehicle>>), AppError> {
    let vehicle = state.catalog().create_vehicle(&user, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(vehicle, "Vehículo creado exitosamente")),
    ))
}

async fn update_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let vehicle = state.catalog().update_vehicle(id, &user, request).await?;
    Ok(Json(ApiResponse::success_with_message(vehicle, "Vehículo actualizado exitosamente")))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    state.catalog().delete_vehicle(id, &user).await?;
    Ok(Json(ApiResponse::message("Vehículo eliminado exitosamente")))
}

async fn create_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(vehicle_id): Path<Uuid>,
    Json(request): Json<BookingWindowRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Booking>>), AppError> {
    let start_time = parse_datetime(&request.start_time)?;
    let end_time = parse_datetime(&request.end_time)?;

    let booking = state
        .bookings()
        .create_booking(vehicle_id, &user, start_time, end_time)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(booking, "Reserva creada exitosamente")),
    ))
}
