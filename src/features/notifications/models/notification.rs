use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Notification type enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "notification_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    IssuePicked,
    TaskAssigned,
    TaskUpdate,
    DonationReceived,
    JobReminder,
    CollaborationRequest,
    CollaborationResponse,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationType::IssuePicked => write!(f, "issue_picked"),
            NotificationType::TaskAssigned => write!(f, "task_assigned"),
            NotificationType::TaskUpdate => write!(f, "task_update"),
            NotificationType::DonationReceived => write!(f, "donation_received"),
            NotificationType::JobReminder => write!(f, "job_reminder"),
            NotificationType::CollaborationRequest => write!(f, "collaboration_request"),
            NotificationType::CollaborationResponse => write!(f, "collaboration_response"),
        }
    }
}

/// Database model for notification
#[derive(Debug, Clone, FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub is_read: bool,
    /// Slug of the issue or event the notification links to
    pub event_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub message: String,
    pub event_slug: Option<String>,
}
