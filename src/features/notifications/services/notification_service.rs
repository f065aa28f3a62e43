use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::notifications::dtos::NotificationResponseDto;
use crate::features::notifications::models::{CreateNotification, Notification};
use crate::modules::live::{user_room, LiveHub};
use crate::shared::types::PaginationQuery;

/// Live event name for a new notification
pub const NOTIFICATION_EVENT: &str = "notification";

/// Service for persisted notifications and their live push
pub struct NotificationService {
    pool: PgPool,
    hub: LiveHub,
}

impl NotificationService {
    pub fn new(pool: PgPool, hub: LiveHub) -> Self {
        Self { pool, hub }
    }

    /// Store a notification, then push it to the owner's live room.
    /// The push is best effort; the stored record is what counts.
    pub async fn create(&self, data: &CreateNotification) -> Result<Notification> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (id, user_id, message, notification_type, event_slug)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&data.user_id)
        .bind(&data.message)
        .bind(data.notification_type)
        .bind(&data.event_slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create notification: {:?}", e);
            AppError::Database(e)
        })?;

        let dto = NotificationResponseDto::from(notification.clone());
        let reached = self
            .hub
            .emit(&user_room(&notification.user_id), NOTIFICATION_EVENT, &dto);
        tracing::debug!(
            "Notification {} ({}) for {} pushed to {} sessions",
            notification.id,
            notification.notification_type,
            notification.user_id,
            reached
        );

        Ok(notification)
    }

    /// Page of the user's notifications, newest first, with total count
    pub async fn list(
        &self,
        user_id: &str,
        unread_only: bool,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<Notification>, i64)> {
        let notifications = sqlx::query_as::<_, Notification>(
            r#"
            SELECT * FROM notifications
            WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(unread_only)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list notifications: {:?}", e);
            AppError::Database(e)
        })?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read)",
        )
        .bind(user_id)
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to count notifications: {:?}", e);
            AppError::Database(e)
        })?;

        Ok((notifications, total))
    }

    pub async fn unread_count(&self, user_id: &str) -> Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count unread notifications: {:?}", e);
                AppError::Database(e)
            })
    }

    /// Mark one notification read. Other users' notifications are reported
    /// as missing.
    pub async fn mark_read(&self, id: Uuid, user_id: &str) -> Result<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notification read: {:?}", e);
            AppError::Database(e)
        })?
        .ok_or_else(|| AppError::NotFound(format!("Notification {} not found", id)))
    }

    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to mark notifications read: {:?}", e);
            AppError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    pub async fn delete(&self, id: Uuid, user_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete notification: {:?}", e);
                AppError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Notification {} not found", id)));
        }

        tracing::info!("Deleted notification {} for user {}", id, user_id);
        Ok(())
    }
}
