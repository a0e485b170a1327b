//! Outbound SMS notifications
//!
//! Reminder messages go out through the Twilio REST API. Delivery is
//! fire-and-forget from the caller's point of view: [`dispatch_in_background`]
//! spawns the send and only logs the outcome.

use crate::core::config::SmsConfig;
use crate::core::error::{CareError, ErrorContext, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Outcome of a send attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the provider, with its message id
    Sent(String),
    /// No provider configured; nothing was sent
    Skipped,
}

/// Something that can deliver a text message to a phone number
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery>;
}

/// Twilio-backed notifier
pub struct TwilioNotifier {
    client: Client,
    config: SmsConfig,
}

#[derive(Debug, Deserialize)]
struct TwilioMessage {
    sid: String,
}

impl TwilioNotifier {
    pub fn new(config: SmsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, config })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

#[async_trait]
impl Notifier for TwilioNotifier {
    async fn send_sms(&self, to: &str, body: &str) -> Result<Delivery> {
        if !self.config.enabled {
            tracing::info!(to = %to, "SMS provider not configured, message not sent");
            return Ok(Delivery::Skipped);
        }

        let params = [
            ("To", to),
            ("From", self.config.from_number.as_str()),
            ("Body", body),
        ];

        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| CareError::NetworkError(format!("SMS request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(CareError::NetworkError(format!(
                "SMS provider returned {}: {}",
                status, detail
            )));
        }

        let message: TwilioMessage = response
            .json()
            .await
            .map_err(|e| CareError::NetworkError(format!("Invalid SMS provider response: {}", e)))?;

        Ok(Delivery::Sent(message.sid))
    }
}

/// Text of a medication reminder SMS
pub fn reminder_message(medication: &str, time: &str, frequency: &str, hospital: &str) -> String {
    format!(
        "Reminder: Take your {} at {} ({}). - {}",
        medication, time, frequency, hospital
    )
}

/// Send an SMS without making the caller wait; failures are logged and dropped.
pub fn dispatch_in_background(notifier: Arc<dyn Notifier>, to: String, body: String) {
    tokio::spawn(async move {
        match notifier.send_sms(&to, &body).await {
            Ok(Delivery::Sent(sid)) => tracing::info!(to = %to, sid = %sid, "Reminder SMS sent"),
            Ok(Delivery::Skipped) => tracing::debug!(to = %to, "Reminder SMS skipped"),
            Err(e) => tracing::warn!(to = %to, error = %e, "Failed to send reminder SMS"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sms_config(enabled: bool) -> SmsConfig {
        SmsConfig {
            enabled,
            account_sid: "AC123".to_string(),
            auth_token: "token".to_string(),
            from_number: "+237600000000".to_string(),
            api_base: "https://api.twilio.com/".to_string(),
            hospital_name: "Douala General Hospital".to_string(),
        }
    }

    #[test]
    fn test_reminder_message() {
        assert_eq!(
            reminder_message("Amoxicillin", "08:00", "daily", "Douala General Hospital"),
            "Reminder: Take your Amoxicillin at 08:00 (daily). - Douala General Hospital"
        );
    }

    #[test]
    fn test_messages_url() {
        let notifier = TwilioNotifier::new(sms_config(true)).unwrap();
        assert_eq!(
            notifier.messages_url(),
            "https://api.twilio.com/2010-04-01/Accounts/AC123/Messages.json"
        );
    }

    #[tokio::test]
    async fn test_disabled_notifier_skips() {
        let notifier = TwilioNotifier::new(sms_config(false)).unwrap();
        let delivery = notifier.send_sms("+237611111111", "hello").await.unwrap();
        assert_eq!(delivery, Delivery::Skipped);
    }
}
