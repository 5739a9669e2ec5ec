use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::AppConfig;
use crate::declare_mailer_plugin;
use crate::errors::{EdulyticsError, Result};
use crate::mail::{MailMessage, Mailer};

declare_mailer_plugin!("http", HttpMailer);

/// 把邮件以 JSON 形式 POST 给邮件中继
pub struct HttpMailer {
    client: Client,
    relay_url: String,
    token: String,
}

impl HttpMailer {
    pub fn new() -> std::result::Result<Self, String> {
        let config = &AppConfig::get().mail;
        if config.relay_url.is_empty() {
            return Err("mail.relay_url is required for the http mail backend".to_string());
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| format!("Failed to build mail HTTP client: {e}"))?;
        Ok(Self {
            client,
            relay_url: config.relay_url.clone(),
            token: config.relay_token.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        let mut request = self.client.post(&self.relay_url).json(message);
        if !self.token.is_empty() {
            request = request.bearer_auth(&self.token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EdulyticsError::mail(format!(
                "Mail relay returned {status}: {body}"
            )));
        }

        debug!("Mail relay accepted message to {}", message.to);
        Ok(())
    }
}
