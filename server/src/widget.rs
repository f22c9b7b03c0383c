use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use tether_shared::{
    AttributeStore, CallbackDispatcher, Channel, OpenState, Schema, TypeKey, Value, WidgetId,
};

use crate::events::{AttributeChange, CustomMessage, WidgetEvent};

// Widget

pub(crate) struct Widget {
    pub(crate) id: WidgetId,
    pub(crate) schema: Arc<Schema>,
    pub(crate) store: Arc<AttributeStore>,
    pub(crate) state: OpenState,
    pub(crate) channel: Channel,
    /// Links that reference this widget and must close with it
    pub(crate) dependents: HashSet<WidgetId>,
    pub(crate) observers: HashMap<&'static str, CallbackDispatcher<AttributeChange>>,
    pub(crate) all_observers: CallbackDispatcher<AttributeChange>,
    pub(crate) message_listeners: CallbackDispatcher<CustomMessage>,
    pub(crate) event_listeners: HashMap<String, CallbackDispatcher<WidgetEvent>>,
    pub(crate) hold_depth: usize,
    /// Synchronized attributes changed while held, in first-change order
    pub(crate) held: Vec<&'static str>,
}

impl Widget {
    pub(crate) fn new(id: WidgetId, store: AttributeStore, channel: Channel) -> Self {
        Self {
            id,
            schema: store.schema().clone(),
            store: Arc::new(store),
            state: OpenState::Open,
            channel,
            dependents: HashSet::new(),
            observers: HashMap::new(),
            all_observers: CallbackDispatcher::new(),
            message_listeners: CallbackDispatcher::new(),
            event_listeners: HashMap::new(),
            hold_depth: 0,
            held: Vec::new(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.state == OpenState::Open
    }

    pub(crate) fn clear_listeners(&mut self) {
        self.observers.clear();
        self.all_observers.clear();
        self.message_listeners.clear();
        self.event_listeners.clear();
    }
}

// WidgetRef

/// Read access to one widget
pub struct WidgetRef<'s> {
    widget: &'s Widget,
}

impl<'s> WidgetRef<'s> {
    pub(crate) fn new(widget: &'s Widget) -> Self {
        Self { widget }
    }

    pub fn id(&self) -> &WidgetId {
        &self.widget.id
    }

    pub fn type_key(&self) -> &TypeKey {
        self.widget.schema.type_key()
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.widget.schema
    }

    pub fn state(&self) -> OpenState {
        self.widget.state
    }

    pub fn is_open(&self) -> bool {
        self.widget.is_open()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.widget.store.get(name)
    }

    /// Committed attribute values. The snapshot stays valid after later writes.
    pub fn store(&self) -> Arc<AttributeStore> {
        self.widget.store.clone()
    }

    /// Links that will close when this widget closes
    pub fn dependents(&self) -> impl Iterator<Item = &WidgetId> {
        self.widget.dependents.iter()
    }
}
