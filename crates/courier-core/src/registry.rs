//! `HandlerRegistry` - explicit registration of handlers, one per message type.
//!
//! The composition layer builds a registry at startup, registers every
//! handler, then shares it as the [`Sender`](crate::sender::Sender)'s
//! factory. Registration is `&mut self`; once the registry is behind an
//! `Arc` it is immutable and therefore freely shared across tasks.
//!
//! # Usage
//! ```ignore
//! let mut registry = HandlerRegistry::new();
//! registry.register_request::<Ping, _>(PingHandler)?;
//! registry.register_command::<Shutdown, _>(ShutdownHandler)?;
//!
//! let sender = Sender::new(Arc::new(registry));
//! ```

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::factory::{HandlerFactory, HandlerRef, ReleaseError, ResolveError};
use crate::handler::{
    CommandHandler, DynCommandHandler, DynRequestHandler, ErasedCommandHandler,
    ErasedRequestHandler, RequestHandler,
};
use crate::message::{Command, MessageType, Request};

enum Registration {
    Command(Arc<dyn DynCommandHandler>),
    Request(Arc<dyn DynRequestHandler>),
}

impl Registration {
    fn message_type(&self) -> MessageType {
        match self {
            Self::Command(handler) => handler.message_type(),
            Self::Request(handler) => handler.message_type(),
        }
    }
}

/// Registration errors.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A second handler was registered for a message type. The registry
    /// enforces the one-handler-per-message-type cardinality at
    /// registration time, so resolution can never be ambiguous.
    #[error("duplicate handler for message type {0}")]
    DuplicateHandler(MessageType),
}

/// A [`HandlerFactory`] backed by a `TypeId`-keyed map of type-erased
/// handlers, populated by explicit registration calls.
///
/// Handlers are stored once and leased out as shared references, so
/// `release` has nothing to reclaim; it exists to satisfy the factory
/// contract for lifetimes that do (pooling, scope-per-call).
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<TypeId, Registration>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for command type `M`.
    pub fn register_command<M, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        M: Command,
        H: CommandHandler<M> + 'static,
    {
        let erased = Arc::new(ErasedCommandHandler::new(handler));
        self.insert(MessageType::of::<M>(), Registration::Command(erased))
    }

    /// Register the handler for request type `M`.
    pub fn register_request<M, H>(&mut self, handler: H) -> Result<(), RegistryError>
    where
        M: Request,
        H: RequestHandler<M> + 'static,
    {
        let erased = Arc::new(ErasedRequestHandler::new(handler));
        self.insert(MessageType::of::<M>(), Registration::Request(erased))
    }

    /// The message types with a registered handler, in no particular order.
    pub fn registered_types(&self) -> Vec<MessageType> {
        self.handlers.values().map(Registration::message_type).collect()
    }

    fn insert(&mut self, ty: MessageType, registration: Registration) -> Result<(), RegistryError> {
        if self.handlers.contains_key(&ty.id()) {
            return Err(RegistryError::DuplicateHandler(ty));
        }
        self.handlers.insert(ty.id(), registration);
        Ok(())
    }
}

impl HandlerFactory for HandlerRegistry {
    fn create_for_command(
        &self,
        message_type: MessageType,
    ) -> Result<Arc<dyn DynCommandHandler>, ResolveError> {
        match self.handlers.get(&message_type.id()) {
            Some(Registration::Command(handler)) => Ok(Arc::clone(handler)),
            _ => Err(ResolveError::NotRegistered(message_type)),
        }
    }

    fn create_for_request(
        &self,
        message_type: MessageType,
    ) -> Result<Arc<dyn DynRequestHandler>, ResolveError> {
        match self.handlers.get(&message_type.id()) {
            Some(Registration::Request(handler)) => Ok(Arc::clone(handler)),
            _ => Err(ResolveError::NotRegistered(message_type)),
        }
    }

    fn release(&self, _handler: HandlerRef) -> Result<(), ReleaseError> {
        // Shared instances: dropping the lease is the release.
        Ok(())
    }
}
