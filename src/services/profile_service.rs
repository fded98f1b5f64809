//! Servicio de perfiles de usuario

use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::profile_dto::UpdateProfileRequest;
use crate::models::UserProfile;
use crate::repositories::RentalStore;
use crate::utils::errors::{not_found_error, AppResult};

pub struct ProfileService {
    store: Arc<dyn RentalStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn RentalStore>) -> Self {
        Self { store }
    }

    pub async fn get_profile(&self, user_id: Uuid) -> AppResult<UserProfile> {
        self.store
            .find_profile(user_id)
            .await?
            .ok_or_else(|| not_found_error("Profile", &user_id.to_string()))
    }

    /// Crea o reemplaza el perfil; `created_at` se conserva si ya existía
    pub async fn upsert_profile(&self, user_id: Uuid, request: UpdateProfileRequest) -> AppResult<UserProfile> {
        request.validate()?;

        let now = Utc::now().trunc_subsecs(6);
        let profile = self
            .store
            .upsert_profile(UserProfile {
                user_id,
                phone: request.phone.trim().to_string(),
                address: request.address.trim().to_string(),
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("👤 Perfil de {} guardado", user_id);
        Ok(profile)
    }
}
