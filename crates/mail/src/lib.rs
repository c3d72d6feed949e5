//! Confirmation-code delivery.
//!
//! Handlers depend on the [`Mailer`] trait only. Three implementations
//! are provided:
//!
//! - [`SmtpMailer`] -- real delivery through `lettre` when SMTP is configured.
//! - [`LogMailer`] -- writes the message to the log; the default for local
//!   development when `SMTP_HOST` is unset.
//! - [`MemoryMailer`] -- keeps every message in an in-memory outbox.

use std::sync::Arc;

pub mod log;
pub mod memory;
pub mod smtp;

pub use log::LogMailer;
pub use memory::MemoryMailer;
pub use smtp::{EmailConfig, SmtpMailer};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A confirmation code addressed to one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMail {
    pub username: String,
    pub email: String,
    pub role: String,
    pub code: String,
}

impl ConfirmationMail {
    pub fn subject(&self) -> String {
        "YaMDb confirmation code".to_string()
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hello, {}!\n\n\
             Your role: {}\n\
             Your confirmation code:\n\n\
             {}\n\n\
             Exchange this code for an access token at /api/v1/auth/token/.",
            self.username, self.role, self.code
        )
    }

    pub fn html_body(&self) -> String {
        format!(
            "<html><body>\
             <p>Hello, <strong>{}</strong>!</p>\
             <p>Your role: <strong>{}</strong></p>\
             <p>Your confirmation code:</p>\
             <p><code style=\"font-size: 1.2em;\">{}</code></p>\
             <p>Exchange this code for an access token at /api/v1/auth/token/.</p>\
             </body></html>",
            self.username, self.role, self.code
        )
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Delivers confirmation codes to users.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), EmailError>;
}

/// Pick a mailer from the environment: SMTP when `SMTP_HOST` is set,
/// otherwise log-only.
pub fn from_env() -> Arc<dyn Mailer> {
    match EmailConfig::from_env() {
        Some(config) => {
            tracing::info!(host = %config.smtp_host, port = config.smtp_port, "SMTP mailer configured");
            Arc::new(SmtpMailer::new(config))
        }
        None => {
            tracing::warn!("SMTP_HOST not set; confirmation codes will be written to the log");
            Arc::new(LogMailer)
        }
    }
}
