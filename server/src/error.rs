use thiserror::Error;

use tether_shared::{DispatchError, RegistryError, ValidationError, WidgetId, WireError};

/// Errors returned by [`crate::WidgetManager`] operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// A write or constructor argument was rejected; nothing was committed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// An inbound message could not be decoded
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The operation took effect, but some listeners failed
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Widget {widget} is closed")]
    Closed { widget: WidgetId },

    #[error("No widget with id {widget}")]
    NotFound { widget: WidgetId },

    /// A peer tried to open a widget under an id that is already taken
    #[error("A widget with id {widget} already exists")]
    DuplicateId { widget: WidgetId },

    #[error("Widget {widget} is a {found}, expected {expected}")]
    WrongType {
        widget: WidgetId,
        expected: String,
        found: String,
    },
}
