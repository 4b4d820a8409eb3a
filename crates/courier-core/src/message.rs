//! Message markers: the type contracts a dispatchable message satisfies.
//!
//! A message is an immutable value representing intent. Its identity is its
//! runtime type; the dispatch core never mutates or retains one. Two kinds:
//! - [`Command`]: fire-and-forget, completes with no value.
//! - [`Request`]: produces a reply of the associated type.

use std::any::TypeId;
use std::fmt;

/// A fire-and-forget message. Processed by exactly one
/// [`CommandHandler`](crate::handler::CommandHandler) registered for this type.
///
/// # Usage
/// ```ignore
/// struct Shutdown;
///
/// impl Command for Shutdown {}
/// ```
///
/// # Trait bounds
/// - `Send`: the message crosses into the handler's future
/// - `'static`: required for runtime type identity (`TypeId`)
pub trait Command: Send + 'static {}

/// A message that produces a reply of type [`Request::Reply`].
///
/// # Usage
/// ```ignore
/// struct Ping;
///
/// impl Request for Ping {
///     type Reply = Pong;
/// }
/// ```
pub trait Request: Send + 'static {
    /// The value a handler produces when it processes this request.
    type Reply: Send + 'static;
}

/// Runtime identity of a message type: a `TypeId` for lookups plus the type
/// name for diagnostics.
///
/// Registration and resolution are both keyed by this identity, so a handler
/// is always matched against the concrete type the caller actually passed,
/// never against a wider interface.
#[derive(Debug, Clone, Copy)]
pub struct MessageType {
    id: TypeId,
    name: &'static str,
}

impl MessageType {
    /// Identity of the concrete type `M`.
    pub fn of<M: 'static>() -> Self {
        Self {
            id: TypeId::of::<M>(),
            name: std::any::type_name::<M>(),
        }
    }

    /// The `TypeId` this identity is keyed on.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified name of the message type, for error messages.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

// Identity is the TypeId alone; the name is carried for display only.
impl PartialEq for MessageType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MessageType {}

impl std::hash::Hash for MessageType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
