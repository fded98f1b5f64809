use axum::{extract::State, routing::get, Json, Router};

use crate::dto::profile_dto::UpdateProfileRequest;
use crate::dto::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::UserProfile;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_profile_router() -> Router<AppState> {
    Router::new().route("/", get(get_profile).put(update_profile))
}

async fn get_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = state.profiles().get_profile(user.user_id).await?;
    Ok(Json(ApiResponse::success(profile)))
}

async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let profile = state.profiles().upsert_profile(user.user_id, request).await?;
    Ok(Json(ApiResponse::success_with_message(profile, "Perfil actualizado")))
}
