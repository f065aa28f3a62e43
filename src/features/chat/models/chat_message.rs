use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::shared::constants::MAX_CHAT_MESSAGE_LEN;

/// Database model for a message in an issue's chat room
#[derive(Debug, Clone, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub issue_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
}

/// A message ready to be stored
#[derive(Debug, Clone)]
pub struct NewChatMessage {
    pub issue_id: Uuid,
    pub sender_id: String,
    pub sender_name: String,
    pub message: String,
}

impl NewChatMessage {
    pub fn new(issue_id: Uuid, sender_id: &str, sender_name: &str, message: &str) -> Result<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::Validation(
                "message: Message must not be empty".to_string(),
            ));
        }
        if message.chars().count() > MAX_CHAT_MESSAGE_LEN {
            return Err(AppError::Validation(format!(
                "message: Message must not exceed {} characters",
                MAX_CHAT_MESSAGE_LEN
            )));
        }

        let sender_name = match sender_name.trim() {
            "" => "Anonymous",
            name => name,
        };

        Ok(Self {
            issue_id,
            sender_id: sender_id.to_string(),
            sender_name: sender_name.to_string(),
            message: message.to_string(),
        })
    }
}

/// Messages sent before the returned instant are due for archival
pub fn archive_cutoff(now: DateTime<Utc>, days_old: i64) -> Result<DateTime<Utc>> {
    if days_old < 0 {
        return Err(AppError::Validation(
            "days_old: must not be negative".to_string(),
        ));
    }
    Duration::try_days(days_old)
        .and_then(|age| now.checked_sub_signed(age))
        .ok_or_else(|| AppError::Validation("days_old: out of range".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_message_is_trimmed() {
        let msg = NewChatMessage::new(Uuid::now_v7(), "u1", "Ana", "  hello  ").unwrap();
        assert_eq!(msg.message, "hello");
        assert_eq!(msg.sender_name, "Ana");
    }

    #[test]
    fn test_blank_message_is_rejected() {
        let err = NewChatMessage::new(Uuid::now_v7(), "u1", "Ana", " \n ").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_length_counts_characters() {
        let at_limit = "é".repeat(MAX_CHAT_MESSAGE_LEN);
        assert!(NewChatMessage::new(Uuid::now_v7(), "u1", "Ana", &at_limit).is_ok());

        let over = "a".repeat(MAX_CHAT_MESSAGE_LEN + 1);
        assert!(NewChatMessage::new(Uuid::now_v7(), "u1", "Ana", &over).is_err());
    }

    #[test]
    fn test_blank_sender_name_falls_back() {
        let msg = NewChatMessage::new(Uuid::now_v7(), "u1", " ", "hi").unwrap();
        assert_eq!(msg.sender_name, "Anonymous");
    }

    #[test]
    fn test_archive_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 3, 31, 12, 0, 0).unwrap();
        let cutoff = archive_cutoff(now, 30).unwrap();
        assert_eq!(cutoff, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());

        assert_eq!(archive_cutoff(now, 0).unwrap(), now);
        assert!(archive_cutoff(now, -1).is_err());
        assert!(archive_cutoff(now, i64::MAX).is_err());
    }
}
