pub mod emails;
pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppResult;
pub use emails::EmailContent;
pub use smtp::SmtpNotifier;

/// 事务性邮件出口
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> AppResult<()>;
}

pub type DynNotifier = Arc<dyn Notifier>;

/// 尽力发送：失败只记日志，绝不影响业务结果
pub async fn send_best_effort(notifier: &DynNotifier, recipient: &str, email: &EmailContent) {
    if let Err(e) = notifier
        .send(recipient, &email.subject, &email.html_body)
        .await
    {
        log::warn!(
            "Failed to send notification `{}` to {recipient}: {e}",
            email.subject
        );
    }
}
