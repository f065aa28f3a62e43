use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::UpsertProfileDto;
use crate::features::users::models::{UpsertUser, User};
use crate::shared::constants::ROLE_NGO;

/// Service for user profiles
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Build the stored profile from the token and the submitted fields.
    /// The role always comes from the token.
    pub fn profile_from(user: &AuthenticatedUser, dto: UpsertProfileDto) -> Result<UpsertUser> {
        let email = dto
            .email
            .or_else(|| user.email.clone())
            .ok_or_else(|| AppError::Validation("email: Email is required".to_string()))?;

        Ok(UpsertUser {
            id: user.sub.clone(),
            name: dto.name.trim().to_string(),
            email,
            role: user.primary_role().to_string(),
            location: dto
                .location
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
        })
    }

    /// Create or refresh the caller's profile
    pub async fn upsert(&self, data: &UpsertUser) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, role, location)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET name = EXCLUDED.name, email = EXCLUDED.email, role = EXCLUDED.role,
                location = EXCLUDED.location, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(&data.id)
        .bind(&data.name)
        .bind(&data.email)
        .bind(&data.role)
        .bind(&data.location)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to upsert user profile: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Upserted profile for user: {} (role: {})", user.id, user.role);
        Ok(user)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get user: {:?}", e);
                AppError::Database(e)
            })
    }

    pub async fn get_by_id(&self, id: &str) -> Result<User> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    /// Get a user that holds the NGO role
    pub async fn find_ngo(&self, id: &str) -> Result<User> {
        self.find_by_id(id)
            .await?
            .filter(User::is_ngo)
            .ok_or_else(|| AppError::NotFound(format!("NGO {} not found", id)))
    }

    /// NGO directory ordered by name
    pub async fn list_ngos(&self) -> Result<Vec<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE role = $1 ORDER BY name")
            .bind(ROLE_NGO)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list NGOs: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Ids of every user whose location matches, ignoring case
    pub async fn list_ids_by_location(&self, location: &str) -> Result<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT id FROM users WHERE LOWER(location) = LOWER($1) ORDER BY id",
        )
        .bind(location.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list users by location: {:?}", e);
            AppError::Database(e)
        })
    }

    /// Add `amount` to an NGO's running total inside the caller's transaction
    pub async fn increment_total_donations(
        conn: &mut PgConnection,
        ngo_id: &str,
        amount: Decimal,
    ) -> Result<()> {
        let result = sqlx::query(
            "UPDATE users SET total_donations = total_donations + $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(ngo_id)
        .bind(amount)
        .execute(conn)
        .await
        .map_err(|e| {
            tracing::error!("Failed to increment donation total: {:?}", e);
            AppError::Database(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("NGO {} not found", ngo_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{ROLE_CITIZEN, ROLE_NGO};
    use crate::shared::test_helpers::create_user;

    fn dto(email: Option<&str>) -> UpsertProfileDto {
        UpsertProfileDto {
            name: "  Green Hands  ".to_string(),
            email: email.map(String::from),
            location: Some(" Pune ".to_string()),
        }
    }

    #[test]
    fn test_profile_takes_role_from_token() {
        let user = create_user("ngo-1", ROLE_NGO);
        let profile = UserService::profile_from(&user, dto(None)).unwrap();

        assert_eq!(profile.id, "ngo-1");
        assert_eq!(profile.role, ROLE_NGO);
        assert_eq!(profile.name, "Green Hands");
        assert_eq!(profile.location.as_deref(), Some("Pune"));
        assert_eq!(profile.email, "ngo-1@example.org");
    }

    #[test]
    fn test_profile_requires_some_email() {
        let mut user = create_user("c1", ROLE_CITIZEN);
        user.email = None;

        let err = UserService::profile_from(&user, dto(None)).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let ok = UserService::profile_from(&user, dto(Some("c1@test.org"))).unwrap();
        assert_eq!(ok.email, "c1@test.org");
    }
}
