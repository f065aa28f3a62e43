use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;

use crate::features::chat::ChatService;

/// Periodically archives chat messages past a fixed age
pub struct ChatArchiveWorker {
    chat: Arc<ChatService>,
    period: Duration,
    days_old: i64,
}

impl ChatArchiveWorker {
    pub fn new(chat: Arc<ChatService>, period: Duration, days_old: i64) -> Self {
        Self {
            chat,
            period,
            days_old,
        }
    }

    pub async fn run(&self) {
        tracing::info!(
            "Starting chat archive worker (every {:?}, older than {} days)",
            self.period,
            self.days_old
        );

        let mut interval = interval(self.period);

        loop {
            interval.tick().await;

            match self.chat.archive_older_than(self.days_old).await {
                Ok(0) => {}
                Ok(count) => tracing::info!("Archived {} chat messages", count),
                Err(e) => tracing::error!("Error archiving chat messages: {:?}", e),
            }
        }
    }
}
