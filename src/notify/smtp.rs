use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::error::{AppError, AppResult};
use crate::notify::Notifier;

/// 托管SMTP中继出口（STARTTLS）
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> AppResult<()> {
        if !self.config.enabled {
            log::info!("SMTP disabled, skipping `{subject}` to {recipient}");
            return Ok(());
        }

        let email = Message::builder()
            .from(
                self.config
                    .from_email
                    .parse::<Mailbox>()
                    .map_err(|e| AppError::SmtpError(format!("bad from address: {e}")))?,
            )
            .to(recipient
                .parse::<Mailbox>()
                .map_err(|e| AppError::SmtpError(format!("bad recipient address: {e}")))?)
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body.to_string())
            .map_err(|e| AppError::SmtpError(format!("failed to build message: {e}")))?;

        let credentials = Credentials::new(
            self.config.username.clone(),
            self.config.password.clone(),
        );

        let mailer = SmtpTransport::starttls_relay(&self.config.host)
            .map_err(|e| AppError::SmtpError(format!("bad relay host: {e}")))?
            .port(self.config.port)
            .credentials(credentials)
            .build();

        mailer
            .send(&email)
            .map_err(|e| AppError::SmtpError(format!("send failed: {e}")))?;

        log::info!("Notification `{subject}` sent to {recipient}");
        Ok(())
    }
}
