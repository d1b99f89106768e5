use super::message::OutgoingMessage;
use crate::error::MailError;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::{info, warn};

/// Mail delivery backend. Implementations own their connection handling.
pub trait MailTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Check that the server is reachable and accepts our credentials.
    fn verify<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>>;

    fn send<'a>(
        &'a self,
        message: &'a OutgoingMessage,
    ) -> Pin<Box<dyn Future<Output = Result<(), MailError>> + Send + 'a>>;
}

/// Verify-then-send, once per submission. No retries.
#[derive(Clone)]
pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    pub async fn dispatch(&self, message: &OutgoingMessage) -> Result<(), MailError> {
        if let Err(error) = self.transport.verify().await {
            warn!(transport = self.transport.name(), error = %error, "mail transport verification failed");
            return Err(match error {
                MailError::Unavailable(_) => error,
                other => MailError::Unavailable(other.to_string()),
            });
        }

        info!(
            transport = self.transport.name(),
            to = %message.to,
            attachments = message.attachments.len(),
            "sending submission"
        );

        self.transport.send(message).await.map_err(|error| {
            warn!(transport = self.transport.name(), error = %error, "mail send failed");
            match error {
                MailError::Send(_) => error,
                other => MailError::Send(other.to_string()),
            }
        })
    }
}

impl std::fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailDispatcher")
            .field("transport", &self.transport.name())
            .finish()
    }
}
