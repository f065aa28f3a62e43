use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::{AppError, Result};

/// Collaboration status enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "collaboration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CollaborationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl std::fmt::Display for CollaborationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollaborationStatus::Pending => write!(f, "pending"),
            CollaborationStatus::Accepted => write!(f, "accepted"),
            CollaborationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

/// Answer the invited NGO gives to a pending request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CollaborationDecision {
    Accepted,
    Rejected,
}

impl From<CollaborationDecision> for CollaborationStatus {
    fn from(decision: CollaborationDecision) -> Self {
        match decision {
            CollaborationDecision::Accepted => CollaborationStatus::Accepted,
            CollaborationDecision::Rejected => CollaborationStatus::Rejected,
        }
    }
}

/// Database model for collaboration: one NGO inviting another onto an issue
#[derive(Debug, Clone, FromRow)]
pub struct Collaboration {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub requested_by: String,
    pub requested_to: String,
    pub message: Option<String>,
    pub status: CollaborationStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for a new collaboration request
#[derive(Debug, Clone)]
pub struct CreateCollaboration {
    pub issue_id: Uuid,
    pub requested_by: String,
    pub requested_to: String,
    pub message: Option<String>,
}

impl CreateCollaboration {
    pub fn new(
        issue_id: Uuid,
        requested_by: &str,
        requested_to: &str,
        message: Option<String>,
    ) -> Result<Self> {
        let requested_to = requested_to.trim();
        if requested_to == requested_by {
            return Err(AppError::Validation(
                "ngo_id: cannot invite yourself to collaborate".to_string(),
            ));
        }

        Ok(Self {
            issue_id,
            requested_by: requested_by.to_string(),
            requested_to: requested_to.to_string(),
            message: message
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_invitation_is_rejected() {
        let err = CreateCollaboration::new(Uuid::now_v7(), "ngo-1", " ngo-1 ", None).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_blank_message_is_dropped() {
        let data =
            CreateCollaboration::new(Uuid::now_v7(), "ngo-1", "ngo-2", Some("   ".into())).unwrap();
        assert_eq!(data.requested_to, "ngo-2");
        assert!(data.message.is_none());
    }

    #[test]
    fn test_decision_maps_to_status() {
        assert_eq!(
            CollaborationStatus::from(CollaborationDecision::Accepted),
            CollaborationStatus::Accepted
        );
        assert_eq!(
            CollaborationStatus::from(CollaborationDecision::Rejected),
            CollaborationStatus::Rejected
        );
    }
}
