//! # Mail Relay Notifier
//!
//! Posts each message as JSON to an HTTP mail relay with a bearer key.

use crate::config::MailConfig;
use academy_core::{EmailMessage, Notifier, NotifyError, NotifyResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::{error, info, instrument};

pub struct MailRelayNotifier {
    config: MailConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
struct RelayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl MailRelayNotifier {
    pub fn new(config: MailConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NotifyError::Transport(format!("HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables; `Ok(None)` when unconfigured
    pub fn from_env() -> Result<Option<Self>, NotifyError> {
        MailConfig::from_env()?.map(Self::new).transpose()
    }
}

#[async_trait]
impl Notifier for MailRelayNotifier {
    #[instrument(skip(self, message), fields(to = %message.to))]
    async fn send(&self, message: EmailMessage) -> NotifyResult {
        let body = RelayRequest {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!("Mail relay rejected message: status={}, body={}", status, text);
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                message: text,
            });
        }

        info!("Email sent: {}", message.subject);
        Ok(())
    }

    fn transport_name(&self) -> &'static str {
        "relay"
    }
}
