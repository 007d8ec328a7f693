/// Outbound notification seam
///
/// Use-cases talk to a [`Notifier`] trait object so delivery (SMTP, push,
/// queue) can be swapped without touching the flows. Notification failures
/// are reported to the caller but never roll back the triggering operation.

use async_trait::async_trait;

use crate::entities::user::UserRole;

/// Errors from a notification backend
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// The channel could not be reached
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    /// The channel refused the message
    #[error("Notification rejected: {0}")]
    Rejected(String),
}

/// Result type for notification operations
pub type NotifyResult<T> = Result<T, NotifyError>;

/// Delivery backend for user-facing notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Welcomes a freshly registered user
    async fn send_welcome_email(&self, to: &str, name: &str, role: UserRole) -> NotifyResult<()>;

    /// Sends a password reset token
    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        reset_token: &str,
    ) -> NotifyResult<()>;

    /// Sends a free-form notification
    async fn send_notification_email(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> NotifyResult<()>;
}

/// Notifier that writes to the log instead of delivering
///
/// The default wiring until a real mail backend is configured. Message
/// bodies are not logged.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_welcome_email(&self, to: &str, name: &str, role: UserRole) -> NotifyResult<()> {
        tracing::info!(to = %to, name = %name, role = %role.as_str(), "Welcome email");
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        name: &str,
        _reset_token: &str,
    ) -> NotifyResult<()> {
        // The token itself stays out of the log
        tracing::info!(to = %to, name = %name, "Password reset email");
        Ok(())
    }

    async fn send_notification_email(
        &self,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> NotifyResult<()> {
        tracing::info!(to = %to, subject = %subject, "Notification email");
        Ok(())
    }
}

/// Records every send for later inspection
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub sent: std::sync::Mutex<Vec<SentEmail>>,
}

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum SentEmail {
    Welcome {
        to: String,
        name: String,
        role: UserRole,
    },
    PasswordReset {
        to: String,
    },
    Notification {
        to: String,
        subject: String,
    },
}

#[cfg(test)]
#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_welcome_email(&self, to: &str, name: &str, role: UserRole) -> NotifyResult<()> {
        self.sent.lock().unwrap().push(SentEmail::Welcome {
            to: to.to_string(),
            name: name.to_string(),
            role,
        });
        Ok(())
    }

    async fn send_password_reset_email(
        &self,
        to: &str,
        _name: &str,
        _reset_token: &str,
    ) -> NotifyResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push(SentEmail::PasswordReset { to: to.to_string() });
        Ok(())
    }

    async fn send_notification_email(
        &self,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> NotifyResult<()> {
        self.sent.lock().unwrap().push(SentEmail::Notification {
            to: to.to_string(),
            subject: subject.to_string(),
        });
        Ok(())
    }
}

/// Fails every send, for exercising failure paths
#[cfg(test)]
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[cfg(test)]
#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_welcome_email(&self, _to: &str, _name: &str, _role: UserRole) -> NotifyResult<()> {
        Err(NotifyError::Unavailable("smtp relay down".to_string()))
    }

    async fn send_password_reset_email(
        &self,
        _to: &str,
        _name: &str,
        _reset_token: &str,
    ) -> NotifyResult<()> {
        Err(NotifyError::Unavailable("smtp relay down".to_string()))
    }

    async fn send_notification_email(
        &self,
        _to: &str,
        _subject: &str,
        _body: &str,
    ) -> NotifyResult<()> {
        Err(NotifyError::Unavailable("smtp relay down".to_string()))
    }
}
