/// Outgoing mail
///
/// Password-reset links are delivered by a [`Mailer`] trait object held
/// in the application state. Production uses [`SmtpMailer`] over
/// lettre's async SMTP transport; development and tests use
/// [`LogMailer`], which only logs the message.
///
/// The forgot-password handler treats a dispatch failure as fatal for
/// the issued token: it clears the token again and reports a generic
/// internal error, so no account ends up with a reset token that was
/// never delivered.
use async_trait::async_trait;
use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::MailConfig;

/// Error type for mail dispatch
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// Message could not be constructed (bad address, etc.)
    #[error("Failed to build message: {0}")]
    Build(String),

    /// SMTP transport failure
    #[error("Failed to send message: {0}")]
    Send(String),
}

/// Sends password-reset mail
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a password-reset link to `to`
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), MailError>;
}

/// SMTP-backed mailer using lettre
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Builds an SMTP mailer from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the relay hostname is invalid.
    pub fn new(config: &MailConfig) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| MailError::Build(e.to_string()))?
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| MailError::Build(format!("invalid from address: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| MailError::Build(format!("invalid recipient: {}", e)))?)
            .subject("Reset your TaskMaster password")
            .header(ContentType::TEXT_PLAIN)
            .body(format!(
                "A password reset was requested for your account.\n\n\
                 Follow this link within 24 hours to choose a new password:\n\n\
                 {}\n\n\
                 If you did not request this, you can ignore this message.\n",
                reset_link
            ))
            .map_err(|e| MailError::Build(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;

        Ok(())
    }
}

/// Log-only mailer for development and tests
///
/// Never fails; the reset link ends up in the server log instead of an
/// inbox.
#[derive(Default)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), MailError> {
        info!(recipient = to, reset_link, "Password reset mail (log-only delivery)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer::new();
        let result = mailer
            .send_password_reset("user@example.com", "http://localhost:3000/reset?token=abc")
            .await;
        assert!(result.is_ok());
    }
}
