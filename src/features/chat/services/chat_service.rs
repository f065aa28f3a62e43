use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::chat::dtos::{ChatHistoryQuery, ChatMessageResponseDto};
use crate::features::chat::models::{archive_cutoff, ChatMessage, NewChatMessage};
use crate::features::issues::IssueService;
use crate::features::users::UserService;
use crate::modules::live::{issue_room, LiveHub};

/// Live event name for a new chat message
pub const CHAT_MESSAGE_EVENT: &str = "chat_message";

/// Service for per-issue chat rooms
pub struct ChatService {
    pool: PgPool,
    issues: Arc<IssueService>,
    users: Arc<UserService>,
    hub: LiveHub,
}

impl ChatService {
    pub fn new(
        pool: PgPool,
        issues: Arc<IssueService>,
        users: Arc<UserService>,
        hub: LiveHub,
    ) -> Self {
        Self {
            pool,
            issues,
            users,
            hub,
        }
    }

    /// One page of an issue's messages, newest first, with the total count
    pub async fn history(
        &self,
        issue_id: Uuid,
        query: &ChatHistoryQuery,
    ) -> Result<(Vec<ChatMessage>, i64)> {
        self.issues.get_by_id(issue_id).await?;
        let pagination = query.pagination();

        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT * FROM chat_messages
            WHERE issue_id = $1 AND ($2 OR NOT archived)
            ORDER BY sent_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(issue_id)
        .bind(query.include_archived)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list chat messages: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages WHERE issue_id = $1 AND ($2 OR NOT archived)",
        )
        .bind(issue_id)
        .bind(query.include_archived)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count chat messages: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((messages, total))
    }

    /// Store a message and push it to everyone in the issue's live room
    pub async fn send(
        &self,
        issue_id: Uuid,
        sender: &AuthenticatedUser,
        text: &str,
    ) -> Result<ChatMessage> {
        let fallback = sender.name.clone().unwrap_or_default();
        let draft = NewChatMessage::new(issue_id, &sender.sub, &fallback, text)?;

        self.issues.get_by_id(issue_id).await?;
        let sender_name = match self.users.find_by_id(&sender.sub).await? {
            Some(profile) => profile.name,
            None => draft.sender_name.clone(),
        };

        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, issue_id, sender_id, sender_name, message, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(draft.issue_id)
        .bind(&draft.sender_id)
        .bind(&sender_name)
        .bind(&draft.message)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to store chat message: {:?}", e);
            AppError::Database(e)
        })?;

        let dto = ChatMessageResponseDto::from(message.clone());
        let reached = self
            .hub
            .emit(&issue_room(issue_id), CHAT_MESSAGE_EVENT, &dto);
        tracing::debug!(
            "Chat message {} on issue {} pushed to {} sessions",
            message.id,
            issue_id,
            reached
        );

        Ok(message)
    }

    /// Archive every live message older than `days_old` days.
    /// Already archived messages are left alone, so reruns are harmless.
    pub async fn archive_older_than(&self, days_old: i64) -> Result<u64> {
        let cutoff = archive_cutoff(Utc::now(), days_old)?;

        let result = sqlx::query(
            r#"
            UPDATE chat_messages
            SET archived = TRUE, archived_at = NOW()
            WHERE NOT archived AND sent_at < $1
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to archive chat messages: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }
}
