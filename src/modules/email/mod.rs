//! Transactional email client
//!
//! Sends JSON messages to an HTTP email API (`POST {EMAIL_API_URL}` with a
//! bearer key). Email is a side channel: callers log failures and carry on.

use serde::Serialize;
use thiserror::Error;

use crate::core::config::EmailConfig;

/// Message handed to the email API
#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email delivery is not configured")]
    Disabled,

    #[error("Failed to reach email API: {0}")]
    Transport(String),

    #[error("Email API rejected message: HTTP {0}")]
    Rejected(u16),
}

/// HTTP email API client
pub struct EmailClient {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailClient {
    pub fn new(config: EmailConfig) -> Result<Self, EmailError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent("CivicHubCore/1.0 (notifications)")
            .build()
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_enabled()
    }

    /// Send one message; `Err(Disabled)` when no API is configured
    pub async fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let (Some(url), Some(key)) = (&self.config.api_url, &self.config.api_key) else {
            tracing::debug!("Email disabled, skipping '{}' to {}", message.subject, message.to);
            return Err(EmailError::Disabled);
        };

        let request = SendEmailRequest {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmailError::Rejected(status.as_u16()));
        }

        tracing::info!("Sent email '{}' to {}", message.subject, message.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            api_url: None,
            api_key: None,
            from: "noreply@civichub.local".to_string(),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_send_without_configuration_is_disabled() {
        let client = EmailClient::new(disabled_config()).unwrap();
        assert!(!client.is_enabled());

        let result = client
            .send(&EmailMessage {
                to: "asha@example.org".to_string(),
                subject: "Hello".to_string(),
                body: "Body".to_string(),
            })
            .await;

        assert!(matches!(result, Err(EmailError::Disabled)));
    }
}
