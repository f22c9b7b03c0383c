use std::sync::Arc;

use serde_json::Value as JsonValue;

use tether_shared::{AttributeStore, Value, WidgetId};

/// Where a committed change came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOrigin {
    Local,
    Remote,
}

/// Delivered to attribute observers once per changed attribute, after the
/// whole write has been committed
#[derive(Clone, Debug)]
pub struct AttributeChange {
    pub widget: WidgetId,
    pub name: &'static str,
    pub old: Value,
    pub new: Value,
    pub origin: ChangeOrigin,
    /// Committed state of the widget after the write
    pub store: Arc<AttributeStore>,
}

/// A `custom` message received from the peer
#[derive(Clone, Debug, PartialEq)]
pub struct CustomMessage {
    pub widget: WidgetId,
    pub content: JsonValue,
    pub buffers: Vec<Vec<u8>>,
}

/// A named UI event, e.g. a button click
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetEvent {
    pub widget: WidgetId,
    pub event: String,
    pub content: JsonValue,
}
