//! Messaging gateway contract.

use async_trait::async_trait;
use tracing::info;

use super::DeliveryError;

/// An outbound text-message channel.
///
/// One call is one delivery attempt. Implementations report failure through
/// [`DeliveryError`]; delivery receipts are not consumed.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Sends `body` from `sender` to the `recipient` handle.
    async fn send_text(&self, sender: &str, recipient: &str, body: &str)
    -> Result<(), DeliveryError>;
}

/// Gateway that writes messages to the log instead of sending them.
///
/// Used when no external messaging channel is wired in.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogGateway;

#[async_trait]
impl MessageGateway for LogGateway {
    async fn send_text(
        &self,
        sender: &str,
        recipient: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        info!(sender, recipient, body, "Outbound message");
        Ok(())
    }
}
