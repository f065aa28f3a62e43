use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::User;

/// Response DTO for a user profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            location: u.location,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Public directory entry for an NGO
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NgoResponseDto {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    #[schema(value_type = String, example = "1250.00")]
    pub total_donations: Decimal,
}

impl From<User> for NgoResponseDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            location: u.location,
            total_donations: u.total_donations,
        }
    }
}

/// Request DTO for creating or updating the caller's profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpsertProfileDto {
    #[validate(length(min = 1, max = 128, message = "Name must be 1-128 characters"))]
    pub name: String,

    /// Defaults to the email in the access token
    #[validate(email(message = "Email must be a valid address"))]
    pub email: Option<String>,

    #[validate(length(max = 255, message = "Location must not exceed 255 characters"))]
    pub location: Option<String>,
}
