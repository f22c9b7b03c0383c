//! # Tether Shared
//! Widget model shared by the tether backend and its test peer: identity and
//! type registry, attribute schemas and stores, the validation engine, wire
//! messages, sync channels, callbacks and link rules.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub mod constants;

mod callback;
mod channel;
mod engine;
mod id_generator;
mod link;
mod lookup;
mod registry;
mod schema;
mod store;
mod types;
mod value;
mod wire;

pub use callback::{CallbackDispatcher, DispatchError, Listener, ListenerFailure, ListenerResult};
pub use channel::{Channel, Received, Receiver, Transport};
pub use engine::{
    bounded::{init_scalar, reconcile_scalar, Bound},
    build_store,
    error::ValidationError,
    interval::{init_interval, reconcile_interval},
    plan_write, Change, PendingWrite, WritePlan,
};
pub use id_generator::IdGenerator;
pub use link::{validate_endpoint, Endpoint, LinkDirection, LinkRule};
pub use lookup::{NoWidgets, WidgetLookup};
pub use registry::{RegistryError, RegistryPlugin, TypeRegistry};
pub use schema::{
    color::is_valid_color,
    AttributeKind, AttributeSpec, InitState, Initializer, Reconciler, Schema, SchemaBuilder,
    Validator, IDENTITY_ATTRS,
};
pub use store::AttributeStore;
pub use types::{OpenState, TypeKey, WidgetId};
pub use value::{BufferPath, PathSegment, Value};
pub use wire::{
    error::WireError,
    message::{Envelope, JsonState, Message},
    serialize::{
        decode_reference, deserialize_state, encode_reference, plain_value, serialize_state,
        SerializedState,
    },
};
