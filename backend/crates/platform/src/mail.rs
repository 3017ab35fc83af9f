//! Outbound Mail
//!
//! Delivery is delegated to an HTTP mail relay (any provider that accepts a
//! JSON `{to, subject, body}` POST). Without a relay configured, messages are
//! written to the log so local development still shows reset links.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("Mail relay request failed: {0}")]
    Transport(String),

    #[error("Mail relay rejected the message with status {0}")]
    Rejected(u16),
}

/// Mail dispatch backend
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// Relay over HTTP, or log-only when no endpoint is configured
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl HttpMailer {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: Some(endpoint.into()),
            api_key,
        }
    }

    pub fn log_only() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
            api_key: None,
        }
    }
}

impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(
                to = %message.to,
                subject = %message.subject,
                body = %message.body,
                "Mail relay not configured, message logged instead"
            );
            return Ok(());
        };

        let mut request = self.client.post(endpoint).json(message);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(MailError::Rejected(response.status().as_u16()));
        }

        tracing::info!(to = %message.to, subject = %message.subject, "Mail dispatched");
        Ok(())
    }
}

/// Keeps every message in memory; cloning shares the outbox
#[derive(Debug, Clone, Default)]
pub struct OutboxMailer {
    sent: Arc<Mutex<Vec<MailMessage>>>,
}

impl OutboxMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().await.clone()
    }
}

impl Mailer for OutboxMailer {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpMailer, MailMessage, Mailer, OutboxMailer};

    fn message() -> MailMessage {
        MailMessage {
            to: "user@example.com".into(),
            subject: "Password Reset Request".into(),
            body: "https://example.com/reset-password?token=abc".into(),
        }
    }

    #[tokio::test]
    async fn test_outbox_records_messages() {
        let mailer = OutboxMailer::new();
        let shared = mailer.clone();
        mailer.send(&message()).await.unwrap();

        assert_eq!(shared.sent().await, vec![message()]);
    }

    #[tokio::test]
    async fn test_log_only_mailer_succeeds() {
        assert!(HttpMailer::log_only().send(&message()).await.is_ok());
    }
}
