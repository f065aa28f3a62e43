use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::donations::models::{Donation, DonationStatus};
use crate::features::notifications::dtos::DispatchOutcome;

/// Response DTO for donation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub ngo_id: String,
    #[schema(value_type = String)]
    pub amount: Decimal,
    pub transaction_id: String,
    pub status: DonationStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for DonationResponseDto {
    fn from(d: Donation) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            ngo_id: d.ngo_id,
            amount: d.amount,
            transaction_id: d.transaction_id,
            status: d.status,
            message: d.message,
            created_at: d.created_at,
        }
    }
}

/// Request DTO for recording a donation the payment processor confirmed
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateDonationDto {
    #[validate(length(min = 1, message = "NGO is required"))]
    pub ngo_id: String,

    #[schema(value_type = String, example = "25.00")]
    #[validate(custom(function = "validate_amount"))]
    pub amount: Decimal,

    #[validate(length(min = 1, max = 255, message = "Transaction id is required"))]
    pub transaction_id: String,

    /// Status reported by the processor
    pub status: DonationStatus,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,
}

fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        let mut err = ValidationError::new("amount");
        err.message = Some("Amount must be greater than zero".into());
        return Err(err);
    }
    if amount.scale() > 2 {
        let mut err = ValidationError::new("amount");
        err.message = Some("Amount must have at most two decimal places".into());
        return Err(err);
    }
    Ok(())
}

/// Recorded donation plus what happened to its notifications.
/// Notifications are only sent for completed donations.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DonationReceiptDto {
    pub donation: DonationResponseDto,
    pub donor_notification: DispatchOutcome,
    pub ngo_notified: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dto(amount: &str) -> CreateDonationDto {
        CreateDonationDto {
            ngo_id: "ngo-1".to_string(),
            amount: Decimal::from_str(amount).unwrap(),
            transaction_id: "pi_123".to_string(),
            status: DonationStatus::Completed,
            message: None,
        }
    }

    #[test]
    fn test_amount_must_be_positive() {
        assert!(dto("10.50").validate().is_ok());
        assert!(dto("0").validate().is_err());
        assert!(dto("-5").validate().is_err());
    }

    #[test]
    fn test_amount_at_most_two_decimals() {
        assert!(dto("1.999").validate().is_err());
    }
}
