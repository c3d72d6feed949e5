//! In-memory outbox.

use std::sync::Mutex;

use crate::{ConfirmationMail, EmailError, Mailer};

/// Records every message instead of sending it.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    outbox: Mutex<Vec<ConfirmationMail>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages sent so far, oldest first.
    pub fn sent(&self) -> Vec<ConfirmationMail> {
        self.outbox.lock().map(|o| o.clone()).unwrap_or_default()
    }

    /// The most recent code sent to `username`, if any.
    pub fn last_code_for(&self, username: &str) -> Option<String> {
        self.sent()
            .into_iter()
            .rev()
            .find(|m| m.username == username)
            .map(|m| m.code)
    }
}

#[async_trait::async_trait]
impl Mailer for MemoryMailer {
    async fn send_confirmation(&self, mail: &ConfirmationMail) -> Result<(), EmailError> {
        let mut outbox = self
            .outbox
            .lock()
            .map_err(|_| EmailError::Build("outbox lock poisoned".into()))?;
        outbox.push(mail.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(username: &str, code: &str) -> ConfirmationMail {
        ConfirmationMail {
            username: username.into(),
            email: format!("{username}@example.com"),
            role: "user".into(),
            code: code.into(),
        }
    }

    #[tokio::test]
    async fn keeps_messages_in_order() {
        let mailer = MemoryMailer::new();
        mailer.send_confirmation(&mail("a", "1")).await.unwrap();
        mailer.send_confirmation(&mail("b", "2")).await.unwrap();
        mailer.send_confirmation(&mail("a", "3")).await.unwrap();

        assert_eq!(mailer.sent().len(), 3);
        assert_eq!(mailer.last_code_for("a").as_deref(), Some("3"));
        assert_eq!(mailer.last_code_for("b").as_deref(), Some("2"));
        assert!(mailer.last_code_for("c").is_none());
    }
}
