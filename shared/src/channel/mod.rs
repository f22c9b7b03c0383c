//! One logical, ordered, bidirectional message channel per open widget.
//!
//! The hosting environment supplies the [`Transport`]; a channel adds the
//! widget address, the open handshake and the terminal close.

use std::{fmt, sync::Arc};

use log::{debug, warn};

use crate::{
    wire::{
        message::{Envelope, Message},
        serialize::SerializedState,
    },
    TypeKey, WidgetId,
};

/// Outbound side of the hosting environment. Delivery is fire-and-forget and
/// must preserve per-widget order.
pub trait Transport: Send + Sync {
    fn send(&self, envelope: Envelope);
}

/// Raw consumer of inbound messages, replacing default handling
pub type Receiver = Box<dyn FnMut(&Message, &[Vec<u8>]) + Send>;

/// Outcome of delivering an inbound message to a channel
#[derive(Debug, PartialEq)]
pub enum Received {
    /// Consumed by the installed receiver
    Handled,
    /// No receiver installed; the caller applies default handling
    Unhandled(Message, Vec<Vec<u8>>),
    /// The channel is closed
    Dropped,
}

pub struct Channel {
    widget: WidgetId,
    transport: Arc<dyn Transport>,
    closed: bool,
    receiver: Option<Receiver>,
}

impl Channel {
    pub fn new(widget: WidgetId, transport: Arc<dyn Transport>) -> Self {
        Self {
            widget,
            transport,
            closed: false,
            receiver: None,
        }
    }

    pub fn widget(&self) -> &WidgetId {
        &self.widget
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Sends the open handshake: type key plus full state
    pub fn open(&self, type_key: &TypeKey, state: SerializedState, version: &str) {
        self.send(
            Message::Open {
                type_key: type_key.clone(),
                state: state.state,
                buffer_paths: state.buffer_paths,
                version: version.to_string(),
            },
            state.buffers,
        );
    }

    /// Returns false if the message was dropped because the channel is closed
    pub fn send(&self, message: Message, buffers: Vec<Vec<u8>>) -> bool {
        if self.closed {
            debug!(
                "Dropping `{}` for closed widget {}",
                message.method(),
                self.widget
            );
            return false;
        }
        self.transport
            .send(Envelope::new(self.widget.clone(), message).with_buffers(buffers));
        true
    }

    /// Installs the inbound consumer, replacing any previous one. `None`
    /// restores default handling.
    pub fn on_receive(&mut self, receiver: Option<Receiver>) {
        self.receiver = receiver;
    }

    pub fn receive(&mut self, message: Message, buffers: Vec<Vec<u8>>) -> Received {
        if self.closed {
            warn!(
                "Dropping inbound `{}` for closed widget {}",
                message.method(),
                self.widget
            );
            return Received::Dropped;
        }
        match self.receiver.as_mut() {
            Some(receiver) => {
                receiver(&message, &buffers);
                Received::Handled
            }
            None => Received::Unhandled(message, buffers),
        }
    }

    /// Closes the channel and tells the peer. Idempotent.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.send(Message::Close, Vec::new());
        self.close_silently();
    }

    /// Closes the channel without notifying the peer, for peer-initiated closes
    pub fn close_silently(&mut self) {
        self.closed = true;
        self.receiver = None;
    }
}

impl fmt::Debug for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Channel")
            .field("widget", &self.widget)
            .field("closed", &self.closed)
            .field("receiver", &self.receiver.is_some())
            .finish()
    }
}
