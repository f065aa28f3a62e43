use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

use crate::shared::constants::ROLE_NGO;

/// Database model for a user profile
#[derive(Debug, Clone, FromRow)]
pub struct User {
    /// Identity-provider subject
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub location: Option<String>,
    /// Running total of completed donations received (NGOs only)
    pub total_donations: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_ngo(&self) -> bool {
        self.role == ROLE_NGO
    }
}

/// Data for creating or refreshing a profile
#[derive(Debug)]
pub struct UpsertUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub location: Option<String>,
}
