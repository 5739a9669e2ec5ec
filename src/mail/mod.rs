//! 邮件通知
//!
//! 后端通过 `declare_mailer_plugin!` 注册，启动时按 `mail.backend` 创建。
//! `log` 后端只写日志，`http` 后端把邮件以 JSON 形式投递给邮件中继。

pub mod backends;
pub mod register;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::errors::{EdulyticsError, Result};

/// 一封待发送的邮件
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl MailMessage {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            from: AppConfig::get().mail.from.clone(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<()>;
}

/// 群发结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSendReport {
    pub sent: usize,
    pub failed: Vec<String>,
}

impl BulkSendReport {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// 同一封邮件逐个发送，单个失败不影响其他收件人
pub async fn send_bulk(
    mailer: &dyn Mailer,
    recipients: &[String],
    subject: &str,
    body: &str,
) -> BulkSendReport {
    let mut report = BulkSendReport::default();
    for to in recipients.iter().filter(|r| !r.trim().is_empty()) {
        let message = MailMessage::new(to.clone(), subject, body);
        match mailer.send(&message).await {
            Ok(()) => report.sent += 1,
            Err(e) => {
                warn!("Failed to send '{}' to {}: {}", subject, to, e);
                report.failed.push(to.clone());
            }
        }
    }
    info!(
        "Bulk mail '{}': {} sent, {} failed",
        subject,
        report.sent,
        report.failed_count()
    );
    report
}

/// 声明一个邮件后端插件
///
/// 类型需要提供 `fn new() -> Result<Self, String>`。
#[macro_export]
macro_rules! declare_mailer_plugin {
    ($name:expr, $ty:ty) => {
        #[ctor::ctor]
        fn __register_mailer_plugin() {
            $crate::mail::register::register_mailer_plugin(
                $name,
                std::sync::Arc::new(|| {
                    let mailer = <$ty>::new().map_err($crate::errors::EdulyticsError::mail)?;
                    Ok(std::sync::Arc::new(mailer) as std::sync::Arc<dyn $crate::mail::Mailer>)
                }),
            );
        }
    };
}

/// 按配置创建邮件后端，未知后端回退到 log
pub fn create_mailer() -> Result<Arc<dyn Mailer>> {
    let backend = &AppConfig::get().mail.backend;
    if let Some(constructor) = register::get_mailer_plugin(backend) {
        return constructor();
    }
    warn!("Mail backend '{}' not found in registry, falling back to log", backend);
    let constructor = register::get_mailer_plugin("log")
        .ok_or_else(|| EdulyticsError::mail_plugin_not_found(backend.clone()))?;
    constructor()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// 记录发送内容的测试后端，`fail_for` 中的地址发送失败
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<MailMessage>>,
        pub fail_for: Vec<String>,
    }

    impl RecordingMailer {
        pub fn messages(&self) -> Vec<MailMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, message: &MailMessage) -> Result<()> {
            if self.fail_for.contains(&message.to) {
                return Err(EdulyticsError::mail(format!("rejected {}", message.to)));
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingMailer;
    use super::*;

    #[tokio::test]
    async fn test_send_bulk_counts_failures() {
        let mailer = RecordingMailer {
            fail_for: vec!["bad@cca.edu.ph".to_string()],
            ..Default::default()
        };
        let recipients = vec![
            "a@cca.edu.ph".to_string(),
            "bad@cca.edu.ph".to_string(),
            "  ".to_string(),
            "b@cca.edu.ph".to_string(),
        ];
        let report = send_bulk(&mailer, &recipients, "Subject", "Body").await;
        assert_eq!(report.sent, 2);
        assert_eq!(report.failed, vec!["bad@cca.edu.ph".to_string()]);
        assert_eq!(mailer.messages()[1].to, "b@cca.edu.ph");
    }

    #[test]
    fn test_log_backend_is_registered() {
        assert!(register::get_mailer_plugin("log").is_some());
        assert!(register::get_mailer_plugin("http").is_some());
    }
}
