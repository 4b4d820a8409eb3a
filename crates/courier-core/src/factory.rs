//! The handler factory: the contract the dispatcher consumes.
//!
//! The core resolves handlers through this trait and nothing else. How
//! handlers are stored, scoped, pooled, or constructed is the factory
//! implementation's business; the sender acquires per call, never caches,
//! and returns every acquired handler through [`HandlerFactory::release`].
//! [`HandlerRegistry`](crate::registry::HandlerRegistry) is the in-crate
//! implementation populated by explicit registration.

use std::sync::Arc;

use thiserror::Error;

use crate::handler::{DynCommandHandler, DynRequestHandler};
use crate::message::MessageType;

/// A resolved handler on its way back to the factory.
pub enum HandlerRef {
    Command(Arc<dyn DynCommandHandler>),
    Request(Arc<dyn DynRequestHandler>),
}

impl HandlerRef {
    /// The message type the held handler accepts.
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::Command(handler) => handler.message_type(),
            Self::Request(handler) => handler.message_type(),
        }
    }
}

/// Why resolution failed. Either case is terminal for the call: the sender
/// surfaces it immediately and does not retry.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no handler registered for message type {0}")]
    NotRegistered(MessageType),

    /// Reported by factories whose backing registry can hold more than one
    /// candidate and has no disambiguation rule.
    #[error("multiple handlers registered for message type {0}")]
    Ambiguous(MessageType),
}

/// A failure while returning a handler to its factory. The lower-priority
/// signal: the sender logs it and keeps the in-flight outcome.
#[derive(Debug, Error)]
#[error("handler release failed: {reason}")]
pub struct ReleaseError {
    pub reason: String,
}

/// Maps a message's runtime type to a handler instance and reclaims the
/// instance afterward.
///
/// Implementations own handler lifetime policy (shared singletons, a fresh
/// instance per call, a pool) and their own concurrency safety; the sender
/// treats the factory as opaque and thread-safe. Resolution is keyed by the
/// concrete [`MessageType`] the caller passed, so a factory must hand back a
/// handler whose accepted type matches exactly; anything else surfaces as a
/// contract violation when the handler is invoked.
pub trait HandlerFactory: Send + Sync {
    /// Resolve the handler for a command type.
    fn create_for_command(
        &self,
        message_type: MessageType,
    ) -> Result<Arc<dyn DynCommandHandler>, ResolveError>;

    /// Resolve the handler for a request type.
    fn create_for_request(
        &self,
        message_type: MessageType,
    ) -> Result<Arc<dyn DynRequestHandler>, ResolveError>;

    /// Return a previously resolved handler. Called exactly once per
    /// successful resolution, on every exit path. Must tolerate handlers it
    /// no longer recognizes rather than panicking.
    fn release(&self, handler: HandlerRef) -> Result<(), ReleaseError>;
}
