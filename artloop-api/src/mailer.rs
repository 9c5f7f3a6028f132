/// Outgoing mail collaborator
///
/// The only mail the platform sends is the password reset link. The trait
/// keeps delivery swappable; the default implementation just logs the link,
/// which is also what development and test environments want. Delivery
/// failure is non-fatal: the forgot-password endpoint still returns the
/// link in its response.

use async_trait::async_trait;

/// Sends account-related mail
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends a password reset link to the given address
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> anyhow::Result<()>;
}

/// Mailer that writes messages to the log instead of sending them
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_password_reset(&self, to: &str, reset_link: &str) -> anyhow::Result<()> {
        tracing::info!(to, reset_link, "password reset mail");
        Ok(())
    }
}
