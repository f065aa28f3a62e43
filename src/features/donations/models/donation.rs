use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Donation status as reported by the payment processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "donation_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DonationStatus {
    Pending,
    Completed,
    Failed,
}

impl std::fmt::Display for DonationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DonationStatus::Pending => write!(f, "pending"),
            DonationStatus::Completed => write!(f, "completed"),
            DonationStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Database model for donation
#[derive(Debug, Clone, FromRow)]
pub struct Donation {
    pub id: Uuid,
    pub user_id: String,
    pub ngo_id: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: DonationStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Only completed donations count towards an NGO's total
    pub fn counts_towards_total(&self) -> bool {
        self.status == DonationStatus::Completed
    }
}

/// Data for recording a donation
#[derive(Debug, Clone)]
pub struct CreateDonation {
    pub user_id: String,
    pub ngo_id: String,
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: DonationStatus,
    pub message: Option<String>,
}
