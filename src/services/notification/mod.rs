//! Settlement notification delivery.
//!
//! Delivery is best effort. A failed delivery is reported to the caller, which logs
//! it; the transfer record is never touched.
use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use thiserror::Error;
use tracing::info;

use crate::models::{SettlementNotification, WebhookNotification, TRANSFER_SETTLED_EVENT};

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("Webhook request failed: {0}")]
    RequestFailed(String),

    #[error("Webhook responded with HTTP {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid webhook configuration: {0}")]
    Configuration(String),
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait SettlementNotifier: Send + Sync {
    async fn notify_settled(
        &self,
        notification: SettlementNotification,
    ) -> Result<(), NotificationError>;
}

/// Writes settlements to the log only.
#[derive(Debug, Default, Clone)]
pub struct LogSettlementNotifier;

#[async_trait]
impl SettlementNotifier for LogSettlementNotifier {
    async fn notify_settled(
        &self,
        notification: SettlementNotification,
    ) -> Result<(), NotificationError> {
        info!(
            tx_id = %notification.transfer_id,
            signature = %notification.signature,
            sender = %notification.sender,
            recipient = %notification.recipient,
            amount = notification.amount,
            "transfer settled"
        );
        Ok(())
    }
}

/// Posts a [`WebhookNotification`] envelope to a configured URL.
#[derive(Debug, Clone)]
pub struct WebhookSettlementNotifier {
    client: Client,
    url: String,
}

impl WebhookSettlementNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self, NotificationError> {
        let url = url.into();
        reqwest::Url::parse(&url)
            .map_err(|e| NotificationError::Configuration(format!("{url}: {e}")))?;
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .map_err(|e| NotificationError::Configuration(e.to_string()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl SettlementNotifier for WebhookSettlementNotifier {
    async fn notify_settled(
        &self,
        notification: SettlementNotification,
    ) -> Result<(), NotificationError> {
        let envelope = WebhookNotification::new(TRANSFER_SETTLED_EVENT.to_string(), notification);
        let response = self
            .client
            .post(&self.url)
            .json(&envelope)
            .send()
            .await
            .map_err(|e| NotificationError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::UnexpectedStatus(response.status().as_u16()));
        }

        info!(
            tx_id = %envelope.payload.transfer_id,
            notification_id = %envelope.id,
            "settlement webhook delivered"
        );
        Ok(())
    }
}

/// Notifier selected at startup.
#[derive(Debug, Clone)]
pub enum NotifierService {
    Log(LogSettlementNotifier),
    Webhook(WebhookSettlementNotifier),
}

impl NotifierService {
    /// Webhook when a URL is configured, log otherwise.
    pub fn from_webhook_url(url: Option<&str>) -> Result<Self, NotificationError> {
        match url {
            Some(url) => Ok(NotifierService::Webhook(WebhookSettlementNotifier::new(url)?)),
            None => Ok(NotifierService::Log(LogSettlementNotifier)),
        }
    }
}

#[async_trait]
impl SettlementNotifier for NotifierService {
    async fn notify_settled(
        &self,
        notification: SettlementNotification,
    ) -> Result<(), NotificationError> {
        match self {
            NotifierService::Log(notifier) => notifier.notify_settled(notification).await,
            NotifierService::Webhook(notifier) => notifier.notify_settled(notification).await,
        }
    }
}
