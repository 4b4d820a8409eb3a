//! `Sender` - resolves, invokes, and releases a handler per message.
//!
//! Each send is independent: resolve the handler from the factory, invoke
//! it with the message and the cancellation token, await, release. The
//! sender holds no per-call state, so one instance is shared freely across
//! tasks. Resolution results are never cached; handler lifetime stays the
//! factory's decision.
//!
//! Release is scoped, not manual: a guard taken right after resolution
//! returns the handler on drop. Normal completion, a handler fault, and
//! this future being dropped at its await point all release exactly once.
//! A fault during release is logged and discarded rather than allowed to
//! replace the outcome already in flight.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::error::SendError;
use crate::factory::{HandlerFactory, HandlerRef};
use crate::message::{Command, MessageType, Request};

/// The dispatch engine. Cheap to clone; clones share the factory.
#[derive(Clone)]
pub struct Sender {
    factory: Arc<dyn HandlerFactory>,
}

impl Sender {
    pub fn new(factory: Arc<dyn HandlerFactory>) -> Self {
        Self { factory }
    }

    /// The factory this sender resolves handlers from.
    pub fn factory(&self) -> &Arc<dyn HandlerFactory> {
        &self.factory
    }

    /// Send a command with no cancellation in play.
    pub async fn send<M: Command>(&self, message: M) -> Result<(), SendError> {
        self.send_with_cancel(message, CancellationToken::new()).await
    }

    /// Send a command, forwarding `cancel` to the handler.
    ///
    /// The token is advisory context: the sender neither polls it nor
    /// short-circuits on it. Once the handler is invoked, cancellation
    /// response is the handler's responsibility.
    pub async fn send_with_cancel<M: Command>(
        &self,
        message: M,
        cancel: CancellationToken,
    ) -> Result<(), SendError> {
        let handler = self.factory.create_for_command(MessageType::of::<M>())?;
        let _guard = ReleaseGuard::new(
            self.factory.as_ref(),
            HandlerRef::Command(Arc::clone(&handler)),
        );
        handler.handle_dyn(Box::new(message), cancel).await
    }

    /// Send a request and await its reply.
    pub async fn request<M: Request>(&self, message: M) -> Result<M::Reply, SendError> {
        self.request_with_cancel(message, CancellationToken::new())
            .await
    }

    /// Send a request, forwarding `cancel` to the handler.
    pub async fn request_with_cancel<M: Request>(
        &self,
        message: M,
        cancel: CancellationToken,
    ) -> Result<M::Reply, SendError> {
        let handler = self.factory.create_for_request(MessageType::of::<M>())?;
        let guard = ReleaseGuard::new(
            self.factory.as_ref(),
            HandlerRef::Request(Arc::clone(&handler)),
        );
        let outcome = handler.handle_dyn(Box::new(message), cancel).await;

        // Release before surfacing anything, reply downcast included.
        drop(guard);

        let reply = outcome?;
        reply
            .downcast::<M::Reply>()
            .map(|reply| *reply)
            .map_err(|_| SendError::ContractViolation(MessageType::of::<M>()))
    }
}

/// Returns a resolved handler to its factory exactly once, on drop.
struct ReleaseGuard<'a> {
    factory: &'a dyn HandlerFactory,
    handler: Option<HandlerRef>,
}

impl<'a> ReleaseGuard<'a> {
    fn new(factory: &'a dyn HandlerFactory, handler: HandlerRef) -> Self {
        Self {
            factory,
            handler: Some(handler),
        }
    }
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        if let Some(handler) = self.handler.take() {
            let message_type = handler.message_type();
            if let Err(err) = self.factory.release(handler) {
                // The in-flight outcome outranks a release fault.
                warn!(%message_type, error = %err, "handler release failed");
            }
        }
    }
}
