//! Notification delivery contract.

use quadrant_core::UserId;
use thiserror::Error;

/// Transient delivery failure. Logged and retried on the next natural cycle;
/// never mutates session state.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("transport rejected the message: {0}")]
    Rejected(String),
    #[error("transport unreachable: {0}")]
    Unreachable(String),
}

/// The messaging transport that actually delivers a reminder. At-least-once
/// is not required.
pub trait NotificationSink {
    async fn send(&self, user: UserId, text: &str) -> Result<(), DeliveryError>;
}
