use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::dto::booking_dto::{
    BookingListQuery, BookingScope, BookingWindowRequest, ReturnVehicleRequest,
    SettlementResponse, TransitionRequest,
};
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{Booking, BookingFilter, DamageReport, Identity};
use crate::state::AppState;
use crate::utils::errors::{forbidden_error, AppError};
use crate::utils::validation::parse_datetime;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_bookings))
        .route("/:id/schedule", put(reschedule_booking))
        .route("/:id/transition", post(transition_booking))
        .route("/:id/return", post(return_vehicle))
        .route("/:id/damage", get(get_damage_report))
}

/// Traduce el alcance pedido a un filtro, comprobando el rol necesario
fn scope_filter(scope: BookingScope, user: &AuthenticatedUser) -> Result<BookingFilter, AppError> {
    match scope {
        BookingScope::Mine => Ok(BookingFilter {
            by_user: Some(user.user_id()),
            by_owner: None,
        }),
        BookingScope::Owner if user.is_owner() => Ok(BookingFilter {
            by_user: None,
            by_owner: Some(user.user_id()),
        }),
        BookingScope::All if user.is_admin() => Ok(BookingFilter::default()),
        BookingScope::Owner => Err(forbidden_error("list bookings", "owner role required")),
        BookingScope::All => Err(forbidden_error("list bookings", "admin role required")),
    }
}

async fn list_bookings(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<ApiResponse<Vec<Booking>>>, AppError> {
    let filter = scope_filter(query.scope, &user)?;
    let bookings = state.bookings().list_bookings(filter).await?;
    Ok(Json(ApiResponse::success(bookings)))
}

async fn reschedule_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<BookingWindowRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let start_time = parse_datetime(&request.start_time)?;
    let end_time = parse_datetime(&request.end_time)?;

    let booking = state
        .bookings()
        .reschedule_booking(id, &user, start_time, end_time)
        .await?;
    Ok(Json(ApiResponse::success_with_message(booking, "Reserva reprogramada")))
}

async fn transition_booking(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<Json<ApiResponse<Booking>>, AppError> {
    let booking = state
        .bookings()
        .transition_booking(id, &user, request.event.into())
        .await?;
    Ok(Json(ApiResponse::success(booking)))
}

async fn return_vehicle(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ReturnVehicleRequest>,
) -> Result<Json<ApiResponse<SettlementResponse>>, AppError> {
    let settlement = state
        .settlements()
        .return_vehicle(id, &user, request.damage_cost, request.damage_description, request.image)
        .await?;
    Ok(Json(ApiResponse::success_with_message(settlement, "Vehículo devuelto")))
}

async fn get_damage_report(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DamageReport>>, AppError> {
    let report = state.settlements().get_damage_report(id, &user).await?;
    Ok(Json(ApiResponse::success(report)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_requires_role() {
        let customer = AuthenticatedUser::new(Uuid::new_v4(), &["customer"], false);
        let owner = AuthenticatedUser::new(Uuid::new_v4(), &["owner"], false);
        let admin = AuthenticatedUser::new(Uuid::new_v4(), &[], true);

        let mine = scope_filter(BookingScope::Mine, &customer).unwrap();
        assert_eq!(mine.by_user, Some(customer.user_id));

        assert!(matches!(
            scope_filter(BookingScope::Owner, &customer),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(
            scope_filter(BookingScope::Owner, &owner).unwrap().by_owner,
            Some(owner.user_id)
        );

        assert!(matches!(
            scope_filter(BookingScope::All, &owner),
            Err(AppError::Forbidden(_))
        ));
        assert_eq!(scope_filter(BookingScope::All, &admin).unwrap(), BookingFilter::default());
    }
}
