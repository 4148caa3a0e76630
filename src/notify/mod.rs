//! Notification of ledger events.
//!
//! After a ledger write has been committed, the [`NotificationDispatcher`]
//! makes exactly one delivery attempt through a [`MessageGateway`], bounded
//! by the configured timeout. The outcome is reported as a
//! [`DeliveryResult`]; failures are logged and never turned into ledger
//! errors. There is no retry and no queue, so a failed message is lost.

mod gateway;
mod message;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::NotificationSettings;
use crate::models::{ShiftRecord, Worker};

pub use gateway::{LogGateway, MessageGateway};
pub use message::compose_message;

/// A ledger event worth telling someone about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftEvent {
    /// A shift was recorded without an exit time.
    Opened,
    /// A shift received its exit time.
    Closed,
}

impl ShiftEvent {
    /// Heading used in messages.
    pub fn title(self) -> &'static str {
        match self {
            ShiftEvent::Opened => "Shift opened",
            ShiftEvent::Closed => "Shift closed",
        }
    }
}

impl std::fmt::Display for ShiftEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftEvent::Opened => write!(f, "opened"),
            ShiftEvent::Closed => write!(f, "closed"),
        }
    }
}

/// Why a message was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The gateway could not be reached.
    #[error("Messaging gateway unreachable: {message}")]
    Unreachable {
        /// Transport-level detail.
        message: String,
    },

    /// The gateway refused the message.
    #[error("Messaging gateway rejected the message: {message}")]
    Rejected {
        /// Gateway-supplied reason.
        message: String,
    },

    /// The attempt did not finish in time.
    #[error("Message delivery timed out after {after_ms} ms")]
    Timeout {
        /// The timeout that elapsed.
        after_ms: u64,
    },
}

/// Outcome of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The gateway accepted the message.
    Delivered,
    /// Notifications are disabled.
    Skipped,
    /// The attempt failed; the error has been logged.
    Failed(DeliveryError),
}

impl DeliveryResult {
    /// Returns true if the gateway accepted the message.
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered)
    }
}

/// Sends ledger events through a gateway, best-effort.
#[derive(Clone)]
pub struct NotificationDispatcher {
    gateway: Arc<dyn MessageGateway>,
    enabled: bool,
    sender: String,
    recipient: Option<String>,
    timeout: Duration,
}

impl NotificationDispatcher {
    /// Creates a dispatcher from the notification settings.
    pub fn new(gateway: Arc<dyn MessageGateway>, settings: &NotificationSettings) -> Self {
        Self {
            gateway,
            enabled: settings.enabled,
            sender: settings.sender.clone(),
            recipient: settings.recipient.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }

    /// A dispatcher that never sends anything.
    pub fn disabled() -> Self {
        Self::new(
            Arc::new(LogGateway),
            &NotificationSettings {
                enabled: false,
                ..NotificationSettings::default()
            },
        )
    }

    /// Makes one delivery attempt for `event`.
    ///
    /// The message goes to the configured recipient, or to the worker's own
    /// phone when none is configured. Never fails: delivery problems are
    /// logged and returned as [`DeliveryResult::Failed`].
    pub async fn notify(
        &self,
        event: ShiftEvent,
        worker: &Worker,
        shift: &ShiftRecord,
    ) -> DeliveryResult {
        if !self.enabled {
            debug!(shift_id = %shift.id, %event, "Notifications disabled, skipping");
            return DeliveryResult::Skipped;
        }

        let body = compose_message(event, worker, shift);
        let recipient = self.recipient.as_deref().unwrap_or(&worker.phone);

        let outcome = match timeout(
            self.timeout,
            self.gateway.send_text(&self.sender, recipient, &body),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Timeout {
                after_ms: self.timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(()) => {
                info!(
                    shift_id = %shift.id,
                    worker_id = %worker.id,
                    %event,
                    recipient,
                    "Notification delivered"
                );
                DeliveryResult::Delivered
            }
            Err(error) => {
                warn!(
                    shift_id = %shift.id,
                    worker_id = %worker.id,
                    %event,
                    recipient,
                    error = %error,
                    "Notification failed; ledger write kept"
                );
                DeliveryResult::Failed(error)
            }
        }
    }
}
