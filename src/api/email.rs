//! Credential and invitation email dispatch.
//!
//! Delivery goes through an HTTP relay when one is configured, otherwise
//! messages are logged. Dispatch happens after the owning transaction
//! commits, and a failed send is reported as a warning rather than an error.

use anyhow::{Context, Result};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tracing::info;

const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// A rendered message, ready for dispatch.
#[derive(Clone, Debug)]
pub struct EmailMessage {
    pub to_email: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
}

pub type SendFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

pub trait EmailSender: Send + Sync {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a>;
}

/// Logs outgoing mail instead of delivering it. Default when no relay is set.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogEmailSender;

impl EmailSender for LogEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move {
            info!(
                to_email = %message.to_email,
                subject = %message.subject,
                "email relay not configured, logging message: {}",
                message.text_body
            );
            Ok(())
        })
    }
}

/// Posts messages to an HTTP mail relay as JSON.
#[derive(Clone, Debug)]
pub struct RelayEmailSender {
    client: reqwest::Client,
    relay_url: String,
    from: String,
}

impl RelayEmailSender {
    pub fn new(relay_url: String, from: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(RELAY_TIMEOUT)
            .build()
            .context("failed to build email relay client")?;

        Ok(Self {
            client,
            relay_url,
            from,
        })
    }
}

impl EmailSender for RelayEmailSender {
    fn send<'a>(&'a self, message: &'a EmailMessage) -> SendFuture<'a> {
        Box::pin(async move {
            let payload = serde_json::json!({
                "from": self.from,
                "to": message.to_email,
                "subject": message.subject,
                "text": message.text_body,
                "html": message.html_body,
            });

            self.client
                .post(&self.relay_url)
                .json(&payload)
                .send()
                .await
                .context("email relay request failed")?
                .error_for_status()
                .context("email relay rejected the message")?;

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> EmailMessage {
        EmailMessage {
            to_email: "jane@example.com".to_string(),
            subject: "Welcome".to_string(),
            text_body: "hello".to_string(),
            html_body: "<p>hello</p>".to_string(),
        }
    }

    #[tokio::test]
    async fn test_log_sender_always_succeeds() {
        let sender = LogEmailSender;
        assert!(sender.send(&message()).await.is_ok());
    }

    #[tokio::test]
    async fn test_log_sender_as_trait_object() {
        let sender: Box<dyn EmailSender> = Box::new(LogEmailSender);
        assert!(sender.send(&message()).await.is_ok());
    }

    #[test]
    fn test_relay_sender_builds() {
        let sender = RelayEmailSender::new(
            "http://localhost:8025/send".to_string(),
            "no-reply@dungi.dev".to_string(),
        );
        assert!(sender.is_ok());
    }
}
