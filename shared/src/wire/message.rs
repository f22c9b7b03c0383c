use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::{wire::error::WireError, BufferPath, TypeKey, WidgetId};

pub type JsonState = Map<String, JsonValue>;

/// A message on one widget's channel. Encoded as a JSON object whose
/// `method` field selects the variant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Message {
    /// Handshake: type key and full state, always the first message
    Open {
        type_key: TypeKey,
        state: JsonState,
        #[serde(default)]
        buffer_paths: Vec<BufferPath>,
        version: String,
    },
    /// Attribute delta
    Update {
        state: JsonState,
        #[serde(default)]
        buffer_paths: Vec<BufferPath>,
    },
    /// Opaque application payload, optionally with buffers
    Custom { content: JsonValue },
    /// Ask the other side for a full-state update
    RequestState,
    /// Terminal
    Close,
}

impl Message {
    pub fn method(&self) -> &'static str {
        match self {
            Message::Open { .. } => "open",
            Message::Update { .. } => "update",
            Message::Custom { .. } => "custom",
            Message::RequestState => "request_state",
            Message::Close => "close",
        }
    }

    pub fn to_json(&self) -> Result<String, WireError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, WireError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// A message addressed to one widget, with its out-of-band binary buffers
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub widget: WidgetId,
    pub message: Message,
    pub buffers: Vec<Vec<u8>>,
}

impl Envelope {
    pub fn new(widget: WidgetId, message: Message) -> Self {
        Self {
            widget,
            message,
            buffers: Vec::new(),
        }
    }

    pub fn with_buffers(mut self, buffers: Vec<Vec<u8>>) -> Self {
        self.buffers = buffers;
        self
    }
}
