use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::chat::models::ChatMessage;
use crate::shared::constants::{DEFAULT_CHAT_ARCHIVE_DAYS, DEFAULT_CHAT_PAGE_SIZE};
use crate::shared::types::PaginationQuery;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageResponseDto {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub archived: bool,
}

impl From<ChatMessage> for ChatMessageResponseDto {
    fn from(m: ChatMessage) -> Self {
        Self {
            id: m.id,
            issue_id: m.issue_id,
            sender_id: m.sender_id,
            sender_name: m.sender_name,
            message: m.message,
            sent_at: m.sent_at,
            archived: m.archived,
        }
    }
}

/// Query parameters for an issue's chat history
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ChatHistoryQuery {
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Messages per page, clamped to 1..=100
    #[serde(default = "default_limit")]
    pub limit: i64,

    #[serde(default)]
    pub include_archived: bool,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    DEFAULT_CHAT_PAGE_SIZE
}

impl ChatHistoryQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery::new(self.page, self.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SendChatMessageDto {
    #[validate(length(min = 1, max = 2000, message = "Message must be 1-2000 characters"))]
    pub message: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ArchiveChatQuery {
    /// Archive messages older than this many days (default 30)
    #[serde(default = "default_days_old")]
    pub days_old: i64,
}

fn default_days_old() -> i64 {
    DEFAULT_CHAT_ARCHIVE_DAYS
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ArchiveChatResultDto {
    pub archived: u64,
    pub days_old: i64,
}
