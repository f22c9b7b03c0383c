//! # Tether Server
//! Backend side of tether: owns every live widget, validates and reconciles
//! attribute writes, publishes committed changes to the remote peer, applies
//! the peer's updates and manages widget lifecycles, including links.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod shared {
    pub use tether_shared::{
        constants, AttributeKind, AttributeSpec, AttributeStore, Endpoint, Envelope, LinkDirection,
        Listener, Message, OpenState, Schema, Transport, TypeKey, TypeRegistry, Value, WidgetId,
    };
}

mod error;
mod events;
mod manager_config;
mod widget;
mod widget_manager;
mod widgets;

pub use error::WidgetError;
pub use events::{AttributeChange, ChangeOrigin, CustomMessage, WidgetEvent};
pub use manager_config::ManagerConfig;
pub use widget::WidgetRef;
pub use widget_manager::WidgetManager;
pub use widgets::{models, register_builtin_types, BuiltinWidgetsPlugin, CLICK_EVENT};
