use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::collaborations::models::{
    Collaboration, CollaborationDecision, CollaborationStatus,
};

/// Response DTO for collaboration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CollaborationResponseDto {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub requested_by: String,
    pub requested_to: String,
    pub message: Option<String>,
    pub status: CollaborationStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<Collaboration> for CollaborationResponseDto {
    fn from(c: Collaboration) -> Self {
        Self {
            id: c.id,
            issue_id: c.issue_id,
            requested_by: c.requested_by,
            requested_to: c.requested_to,
            message: c.message,
            status: c.status,
            responded_at: c.responded_at,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendCollaborationRequestDto {
    pub issue_id: Uuid,

    /// User id of the NGO being invited
    #[validate(length(min = 1, message = "NGO id is required"))]
    pub ngo_id: String,

    #[validate(length(max = 1000, message = "Message must not exceed 1000 characters"))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RespondCollaborationDto {
    pub decision: CollaborationDecision,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RespondOutcomeDto {
    pub collaboration: CollaborationResponseDto,
    /// Whether the issue's collaborator list changed
    pub issue_updated: bool,
}
