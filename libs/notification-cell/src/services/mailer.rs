// libs/notification-cell/src/services/mailer.rs
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::models::{BookingConfirmation, MailMessage, NotificationError};

/// Client for the transactional mail HTTP API. Built once at startup and shared
/// across requests. Sending is best effort: callers only learn whether it worked.
pub struct MailClient {
    client: Option<Client>,
    api_url: String,
    api_key: String,
    from: String,
}

impl MailClient {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        let client = if config.is_mail_configured() {
            let client = Client::builder()
                .timeout(Duration::from_secs(config.mail_timeout_secs))
                .build()
                .map_err(|e| NotificationError::Transport(e.to_string()))?;
            Some(client)
        } else {
            warn!("Mail API not configured, confirmations will not be sent");
            None
        };

        Ok(Self {
            client,
            api_url: config.mail_api_url.clone(),
            api_key: config.mail_api_key.clone(),
            from: config.mail_from.clone(),
        })
    }

    /// Sends the confirmation email. Returns `false` on any failure; a failed
    /// send never affects the booking itself.
    pub async fn send_booking_confirmation(&self, confirmation: &BookingConfirmation) -> bool {
        let message = MailMessage::booking_confirmation(&self.from, confirmation);

        match self.send(&message).await {
            Ok(()) => {
                info!("Confirmation sent to {}", message.to);
                true
            }
            Err(e) => {
                warn!("Confirmation to {} not sent: {}", message.to, e);
                false
            }
        }
    }

    pub async fn send(&self, message: &MailMessage) -> Result<(), NotificationError> {
        let client = self.client.as_ref().ok_or(NotificationError::NotConfigured)?;

        debug!("Sending mail to {} via {}", message.to, self.api_url);

        let response = client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!("Mail API request failed: {}", e);
                NotificationError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let response_text = response.text().await.unwrap_or_default();
            error!("Mail API rejected message: {} - {}", status, response_text);
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message: response_text,
            });
        }

        Ok(())
    }
}
