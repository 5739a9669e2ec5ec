use async_trait::async_trait;
use tracing::info;

use crate::declare_mailer_plugin;
use crate::errors::Result;
use crate::mail::{MailMessage, Mailer};

declare_mailer_plugin!("log", LogMailer);

/// 只把邮件写入日志，开发环境默认使用
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> std::result::Result<Self, String> {
        Ok(Self)
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &MailMessage) -> Result<()> {
        info!(
            from = %message.from,
            to = %message.to,
            subject = %message.subject,
            "Outgoing mail\n{}",
            message.body
        );
        Ok(())
    }
}
