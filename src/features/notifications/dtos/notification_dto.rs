use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::notifications::models::{Notification, NotificationType};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

/// Response DTO for notification
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponseDto {
    pub id: Uuid,
    pub user_id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub is_read: bool,
    pub event_slug: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Notification> for NotificationResponseDto {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            user_id: n.user_id,
            message: n.message,
            notification_type: n.notification_type,
            is_read: n.is_read,
            event_slug: n.event_slug,
            created_at: n.created_at,
        }
    }
}

/// Query parameters for listing notifications
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NotificationListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    /// Only unread notifications
    #[serde(default)]
    pub unread: bool,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl NotificationListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountDto {
    pub unread: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MarkAllReadDto {
    pub updated: u64,
}

/// Result of notifying a set of users. Each recipient is handled on its own;
/// one failure does not undo the others.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FanOutReport {
    pub recipients: usize,
    pub delivered: usize,
    pub failed: usize,
}

/// Result of a notification that is also emailed. The two steps are
/// independent: the in-app record can exist while the email failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DispatchOutcome {
    pub notification_created: bool,
    pub email_sent: bool,
}
