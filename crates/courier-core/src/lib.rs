//! courier-core
//!
//! In-process dispatch of strongly-typed messages to their handlers.
//!
//! Application code sends a *command* (fire-and-forget) or a *request*
//! (result-bearing) without naming the handler; the [`Sender`] resolves the
//! handler registered for the message's concrete runtime type through a
//! [`HandlerFactory`], invokes it asynchronously, and returns the handler to
//! the factory on every exit path.
//!
//! # Module layout
//! - **message**: `Command` / `Request` markers and `MessageType` identity
//! - **handler**: typed handler traits plus the object-safe erased layer
//! - **factory**: the `HandlerFactory` contract the sender consumes
//! - **registry**: `HandlerRegistry`, the explicit-registration factory
//! - **sender**: the dispatch engine
//! - **error**: `SendError`, the caller-facing failure taxonomy
//!
//! # Example
//! ```ignore
//! struct Ping;
//!
//! impl Request for Ping {
//!     type Reply = Pong;
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_request::<Ping, _>(PingHandler)?;
//!
//! let sender = Sender::new(Arc::new(registry));
//! let pong = sender.request(Ping).await?;
//! ```
//!
//! This is not a message bus: no transport, no durability, no ordering
//! between independent sends. Queuing and retry belong to the caller.

pub mod error;
pub mod factory;
pub mod handler;
pub mod message;
pub mod registry;
pub mod sender;

pub use self::error::SendError;
pub use self::factory::{HandlerFactory, HandlerRef, ReleaseError, ResolveError};
pub use self::handler::{
    CommandHandler, DynCommandHandler, DynRequestHandler, ErasedCommandHandler,
    ErasedRequestHandler, HandlerError, RequestHandler,
};
pub use self::message::{Command, MessageType, Request};
pub use self::registry::{HandlerRegistry, RegistryError};
pub use self::sender::Sender;

// Handlers take this by value; re-exported so implementors need no direct
// tokio-util dependency.
pub use tokio_util::sync::CancellationToken;
