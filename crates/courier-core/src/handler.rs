//! Handler traits and the type-erasure layer between them and the dispatcher.
//!
//! Two layers:
//! - **Typed**: [`CommandHandler<M>`] / [`RequestHandler<M>`], what
//!   application code implements. The message parameter is the concrete
//!   message type, checked at compile time.
//! - **Dyn**: [`DynCommandHandler`] / [`DynRequestHandler`], object-safe,
//!   what the factory hands to the sender. The erasing wrappers bridge the
//!   two: the monomorphized invoke path is captured once, when the wrapper
//!   is built, so dispatch needs no per-call reflection or lookup beyond a
//!   map hit and a downcast.

use std::any::Any;
use std::marker::PhantomData;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::SendError;
use crate::message::{Command, MessageType, Request};

/// Faults raised by handler code itself. Propagated to the sender's caller
/// unchanged; the dispatch core never wraps or reinterprets them.
pub type HandlerError = anyhow::Error;

/// Processes one [`Command`] type, completing with no value.
///
/// One handler type per message type is the intended cardinality; a handler
/// is stateless from the core's point of view but may hold its own
/// dependencies.
///
/// # Usage
/// ```ignore
/// struct ShutdownHandler;
///
/// #[async_trait]
/// impl CommandHandler<Shutdown> for ShutdownHandler {
///     async fn handle(&self, _message: Shutdown, _cancel: CancellationToken) -> Result<(), HandlerError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait CommandHandler<M: Command>: Send + Sync {
    /// Process `message`. The token is advisory: the core forwards it
    /// untouched, and honoring it is the handler's responsibility.
    async fn handle(&self, message: M, cancel: CancellationToken) -> Result<(), HandlerError>;
}

/// Processes one [`Request`] type, producing its declared reply.
#[async_trait]
pub trait RequestHandler<M: Request>: Send + Sync {
    async fn handle(&self, message: M, cancel: CancellationToken)
    -> Result<M::Reply, HandlerError>;
}

/// Object-safe form of [`CommandHandler`], as resolved by a
/// [`HandlerFactory`](crate::factory::HandlerFactory).
///
/// `handle_dyn` takes the message type-erased; rejecting a message whose
/// runtime type does not match the handler's accepted type is a
/// [`SendError::ContractViolation`], signalling a factory bug rather than a
/// handler fault.
#[async_trait]
pub trait DynCommandHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        message: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<(), SendError>;

    /// The message type this handler accepts.
    fn message_type(&self) -> MessageType;
}

/// Object-safe form of [`RequestHandler`]. The reply comes back type-erased
/// and is downcast by the sender to the request's declared reply type.
#[async_trait]
pub trait DynRequestHandler: Send + Sync {
    async fn handle_dyn(
        &self,
        message: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<Box<dyn Any + Send>, SendError>;

    fn message_type(&self) -> MessageType;
}

/// Erases a [`CommandHandler<M>`] into a [`DynCommandHandler`].
pub struct ErasedCommandHandler<M: Command, H: CommandHandler<M>> {
    handler: H,
    _marker: PhantomData<fn(M)>,
}

impl<M: Command, H: CommandHandler<M>> ErasedCommandHandler<M, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<M: Command, H: CommandHandler<M> + 'static> DynCommandHandler for ErasedCommandHandler<M, H> {
    async fn handle_dyn(
        &self,
        message: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<(), SendError> {
        let message = message
            .downcast::<M>()
            .map_err(|_| SendError::ContractViolation(MessageType::of::<M>()))?;
        self.handler
            .handle(*message, cancel)
            .await
            .map_err(SendError::Handler)
    }

    fn message_type(&self) -> MessageType {
        MessageType::of::<M>()
    }
}

/// Erases a [`RequestHandler<M>`] into a [`DynRequestHandler`].
pub struct ErasedRequestHandler<M: Request, H: RequestHandler<M>> {
    handler: H,
    _marker: PhantomData<fn(M)>,
}

impl<M: Request, H: RequestHandler<M>> ErasedRequestHandler<M, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<M: Request, H: RequestHandler<M> + 'static> DynRequestHandler for ErasedRequestHandler<M, H> {
    async fn handle_dyn(
        &self,
        message: Box<dyn Any + Send>,
        cancel: CancellationToken,
    ) -> Result<Box<dyn Any + Send>, SendError> {
        let message = message
            .downcast::<M>()
            .map_err(|_| SendError::ContractViolation(MessageType::of::<M>()))?;
        let reply = self
            .handler
            .handle(*message, cancel)
            .await
            .map_err(SendError::Handler)?;
        Ok(Box::new(reply))
    }

    fn message_type(&self) -> MessageType {
        MessageType::of::<M>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Increment {
        by: i64,
    }

    impl Command for Increment {}

    struct Total;

    impl Request for Total {
        type Reply = i64;
    }

    struct CounterHandler {
        total: std::sync::atomic::AtomicI64,
    }

    #[async_trait]
    impl CommandHandler<Increment> for CounterHandler {
        async fn handle(
            &self,
            message: Increment,
            _cancel: CancellationToken,
        ) -> Result<(), HandlerError> {
            self.total
                .fetch_add(message.by, std::sync::atomic::Ordering::SeqCst);
            Ok(())
        }
    }

    #[async_trait]
    impl RequestHandler<Total> for CounterHandler {
        async fn handle(
            &self,
            _message: Total,
            _cancel: CancellationToken,
        ) -> Result<i64, HandlerError> {
            Ok(self.total.load(std::sync::atomic::Ordering::SeqCst))
        }
    }

    #[tokio::test]
    async fn erased_command_handler_invokes_the_typed_handler() {
        let erased = ErasedCommandHandler::new(CounterHandler {
            total: std::sync::atomic::AtomicI64::new(0),
        });

        erased
            .handle_dyn(Box::new(Increment { by: 3 }), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            erased.handler.total.load(std::sync::atomic::Ordering::SeqCst),
            3
        );
    }

    #[tokio::test]
    async fn erased_request_handler_returns_the_typed_reply() {
        let erased = ErasedRequestHandler::new(CounterHandler {
            total: std::sync::atomic::AtomicI64::new(41),
        });

        let reply = erased
            .handle_dyn(Box::new(Total), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(*reply.downcast::<i64>().unwrap(), 41);
    }

    #[tokio::test]
    async fn mismatched_message_type_is_a_contract_violation() {
        let erased = ErasedCommandHandler::new(CounterHandler {
            total: std::sync::atomic::AtomicI64::new(0),
        });

        let result = erased
            .handle_dyn(Box::new("not an Increment"), CancellationToken::new())
            .await;

        assert!(matches!(result, Err(SendError::ContractViolation(_))));
    }

    #[test]
    fn erased_handlers_report_their_message_type() {
        let erased = ErasedCommandHandler::new(CounterHandler {
            total: std::sync::atomic::AtomicI64::new(0),
        });
        assert_eq!(erased.message_type(), MessageType::of::<Increment>());
    }
}
