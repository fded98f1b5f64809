use async_trait::async_trait;
use uuid::Uuid;

use super::{PgRepository, ProfileRepository};
use crate::models::UserProfile;
use crate::utils::errors::AppResult;

#[async_trait]
impl ProfileRepository for PgRepository {
    async fn find_profile(&self, user_id: Uuid) -> AppResult<Option<UserProfile>> {
        let profile = sqlx::query_as::<_, UserProfile>("SELECT * FROM user_profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(profile)
    }

    async fn upsert_profile(&self, profile: UserProfile) -> AppResult<UserProfile> {
        // created_at sólo se fija en el primer alta
        let saved = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO user_profiles (user_id, phone, address, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE
            SET phone = EXCLUDED.phone, address = EXCLUDED.address, updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(profile.created_at)
        .bind(profile.updated_at)
        .fetch_one(self.pool())
        .await?;

        Ok(saved)
    }
}
