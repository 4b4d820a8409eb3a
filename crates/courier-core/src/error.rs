//! The caller-facing error taxonomy for a dispatch attempt.

use thiserror::Error;

use crate::factory::ResolveError;
use crate::message::MessageType;

/// Why a send failed. The three variants are deliberately distinct: callers
/// can tell a missing registration from a miswired factory from a fault in
/// their own handler code.
#[derive(Debug, Error)]
pub enum SendError {
    /// The factory could not produce a handler for the message type.
    /// Terminal for this call; nothing was acquired, nothing is released.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The factory produced a handler, but the handler's accepted message
    /// type (or declared reply type) does not match the message actually
    /// sent. A registration or factory bug, not a transient condition.
    #[error("handler resolved for message type {0} does not match its runtime type")]
    ContractViolation(MessageType),

    /// The handler's own processing failed. The underlying error is the
    /// handler's, surfaced unchanged.
    #[error(transparent)]
    Handler(#[from] anyhow::Error),
}

impl SendError {
    /// True when the failure happened before any handler ran: the message
    /// never reached application code.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::Resolve(_) | Self::ContractViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    #[test]
    fn handler_faults_display_unchanged() {
        let err = SendError::Handler(anyhow::anyhow!("division by zero"));
        assert_eq!(err.to_string(), "division by zero");
        assert!(!err.is_resolution_failure());
    }

    #[test]
    fn resolution_failures_are_classified() {
        let err = SendError::from(ResolveError::NotRegistered(MessageType::of::<Nothing>()));
        assert!(err.is_resolution_failure());
    }
}
