use crate::{ConfirmationMail, EmailError, Mailer};

/// Writes confirmation codes to the log instead of sending them.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), EmailError> {
        tracing::info!(
            to = %mail.email,
            username = %mail.username,
            code = %mail.code,
            "Confirmation code (not emailed, SMTP disabled)"
        );
        Ok(())
    }
}
