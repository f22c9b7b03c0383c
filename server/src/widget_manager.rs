use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::{debug, info, warn};
use serde_json::Value as JsonValue;

use tether_shared::{
    build_store, deserialize_state, plan_write, serialize_state, AttributeStore, BufferPath,
    Channel, DispatchError, Endpoint, Envelope, JsonState, LinkRule, Listener, ListenerFailure,
    Message, OpenState, Received, Receiver, Transport, TypeKey, TypeRegistry, ValidationError,
    Value, WidgetId, WidgetLookup, WritePlan, IDENTITY_ATTRS,
};

use crate::{
    events::{AttributeChange, ChangeOrigin, CustomMessage, WidgetEvent},
    widget::{Widget, WidgetRef},
    ManagerConfig, WidgetError,
};

/// Resolves references against the widgets that are currently open
struct LiveWidgets<'a>(&'a HashMap<WidgetId, Widget>);

impl WidgetLookup for LiveWidgets<'_> {
    fn is_live(&self, id: &WidgetId) -> bool {
        self.0.get(id).is_some_and(Widget::is_open)
    }

    fn attribute_synced(&self, id: &WidgetId, attribute: &str) -> Option<bool> {
        self.0.get(id)?.schema.attribute(attribute).map(|spec| spec.sync)
    }
}

enum Commit {
    Local,
    /// Values as the peer sent them, before validation
    Remote { received: Vec<(&'static str, Value)> },
}

/// Owns every widget of one backend session. Writes are validated and
/// reconciled before they are committed; committed synchronized changes are
/// published on the widget's channel, then observers run.
pub struct WidgetManager {
    config: ManagerConfig,
    registry: Arc<TypeRegistry>,
    transport: Arc<dyn Transport>,
    widgets: HashMap<WidgetId, Widget>,
    /// Open link widgets, by link id
    links: HashMap<WidgetId, LinkRule>,
    /// Endpoints whose change is currently being propagated by a local link
    propagating: HashSet<Endpoint>,
}

impl WidgetManager {
    pub fn new(
        config: ManagerConfig,
        registry: Arc<TypeRegistry>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            registry,
            transport,
            widgets: HashMap::new(),
            links: HashMap::new(),
            propagating: HashSet::new(),
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    // Lifecycle

    /// Constructs a widget of a registered type and sends its open handshake.
    /// Child widgets the schema declares (a button's style) are created first
    /// unless given. If any argument is rejected the widget is not registered
    /// and those children are closed again.
    pub fn create<N: AsRef<str>>(
        &mut self,
        type_key: &TypeKey,
        args: impl IntoIterator<Item = (N, Value)>,
    ) -> Result<WidgetId, WidgetError> {
        let schema = self.registry.lookup(type_key)?;
        let mut args: Vec<(String, Value)> = args
            .into_iter()
            .map(|(name, value)| (name.as_ref().to_string(), value))
            .collect();

        let mut children = Vec::new();
        for (name, child_type) in schema.children() {
            if args.iter().any(|(given, _)| given == *name) {
                continue;
            }
            match self.create(child_type, Vec::<(&str, Value)>::new()) {
                Ok(child) => {
                    args.push((name.to_string(), Value::Widget(child.clone())));
                    children.push(child);
                }
                Err(error) => {
                    self.discard(&children);
                    return Err(error);
                }
            }
        }

        let store = match build_store(schema, args, &LiveWidgets(&self.widgets)) {
            Ok(store) => store,
            Err(error) => {
                self.discard(&children);
                return Err(error.into());
            }
        };

        let id = self.fresh_id();
        let channel = Channel::new(id.clone(), self.transport.clone());
        channel.open(
            type_key,
            serialize_state(store.synced()),
            &self.config.protocol_version,
        );
        self.insert(Widget::new(id.clone(), store, channel));

        info!("Opened widget {} ({})", id, type_key);
        Ok(id)
    }

    /// Closes a widget, every link that references it, and tells the peer.
    /// Closing a closed widget does nothing.
    pub fn close(&mut self, id: &WidgetId) -> Result<(), WidgetError> {
        if !self.widgets.contains_key(id) {
            return Err(WidgetError::NotFound { widget: id.clone() });
        }
        self.close_widget(id, true);
        Ok(())
    }

    pub fn close_all(&mut self) {
        let mut open: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|widget| widget.is_open())
            .map(|widget| widget.id.clone())
            .collect();
        open.sort();
        for id in open {
            self.close_widget(&id, true);
        }
    }

    /// Forgets closed widgets. Their ids then report `NotFound` instead of
    /// `Closed`.
    pub fn prune_closed(&mut self) -> usize {
        let before = self.widgets.len();
        self.widgets.retain(|_, widget| widget.state != OpenState::Closed);
        before - self.widgets.len()
    }

    // Reads

    pub fn widget(&self, id: &WidgetId) -> Result<WidgetRef<'_>, WidgetError> {
        self.widgets
            .get(id)
            .map(WidgetRef::new)
            .ok_or_else(|| WidgetError::NotFound { widget: id.clone() })
    }

    pub fn get(&self, id: &WidgetId, name: &str) -> Result<Value, WidgetError> {
        let widget = self.widget(id)?;
        widget.get(name).cloned().ok_or_else(|| {
            ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            }
            .into()
        })
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn state(&self, id: &WidgetId) -> Option<OpenState> {
        self.widgets.get(id).map(|widget| widget.state)
    }

    pub fn is_open(&self, id: &WidgetId) -> bool {
        self.widgets.get(id).is_some_and(Widget::is_open)
    }

    /// Ids of every open widget, sorted
    pub fn open_widgets(&self) -> Vec<WidgetId> {
        let mut ids: Vec<WidgetId> = self
            .widgets
            .values()
            .filter(|widget| widget.is_open())
            .map(|widget| widget.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Number of widget records, closed ones included
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Propagation rule of an open link widget
    pub fn link_rule(&self, id: &WidgetId) -> Option<&LinkRule> {
        self.links.get(id)
    }

    pub(crate) fn expect_model(&self, id: &WidgetId, models: &[&str]) -> Result<(), WidgetError> {
        let widget = self.widget(id)?;
        let found = &widget.type_key().name;
        if models.contains(&found.as_str()) {
            Ok(())
        } else {
            Err(WidgetError::WrongType {
                widget: id.clone(),
                expected: models.join(" or "),
                found: found.clone(),
            })
        }
    }

    // Writes

    pub fn set(
        &mut self,
        id: &WidgetId,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), WidgetError> {
        self.set_many(id, [(name, value.into())])
    }

    /// Applies several writes as one reconciliation, published as one update.
    /// If the write is rejected nothing changes. If it is accepted but
    /// observers fail, the write stays committed and the failures are
    /// returned as [`WidgetError::Dispatch`].
    pub fn set_many<N: AsRef<str>>(
        &mut self,
        id: &WidgetId,
        writes: impl IntoIterator<Item = (N, Value)>,
    ) -> Result<(), WidgetError> {
        let plan = {
            let widget = self.open_widget(id)?;
            plan_write(&widget.store, writes, &LiveWidgets(&self.widgets))?
        };
        self.commit(id, plan, Commit::Local)
    }

    /// Runs `f` with outbound updates of `id` held back; everything changed
    /// inside goes out as a single update when the outermost hold ends
    pub fn hold_sync<R>(
        &mut self,
        id: &WidgetId,
        f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R, WidgetError> {
        self.open_widget_mut(id)?.hold_depth += 1;
        let result = f(self);
        if let Some(widget) = self.widgets.get_mut(id) {
            widget.hold_depth = widget.hold_depth.saturating_sub(1);
            if widget.hold_depth == 0 {
                let held = std::mem::take(&mut widget.held);
                if widget.is_open() && !held.is_empty() {
                    send_state(widget, &held);
                }
            }
        }
        Ok(result)
    }

    // Listeners

    /// Registers (or with `remove`, unregisters) an observer of one attribute,
    /// or of every attribute when `name` is `None`
    pub fn observe(
        &mut self,
        id: &WidgetId,
        name: Option<&str>,
        listener: &Listener<AttributeChange>,
        remove: bool,
    ) -> Result<(), WidgetError> {
        let widget = self.widget_mut(id)?;
        match name {
            None => widget.all_observers.register(listener, remove),
            Some(name) => {
                let spec = widget.schema.attribute(name).ok_or_else(|| {
                    ValidationError::UnknownAttribute {
                        attribute: name.to_string(),
                    }
                })?;
                widget
                    .observers
                    .entry(spec.name)
                    .or_default()
                    .register(listener, remove);
            }
        }
        Ok(())
    }

    pub fn on_msg(
        &mut self,
        id: &WidgetId,
        listener: &Listener<CustomMessage>,
        remove: bool,
    ) -> Result<(), WidgetError> {
        self.widget_mut(id)?
            .message_listeners
            .register(listener, remove);
        Ok(())
    }

    pub fn on_event(
        &mut self,
        id: &WidgetId,
        event: &str,
        listener: &Listener<WidgetEvent>,
        remove: bool,
    ) -> Result<(), WidgetError> {
        self.widget_mut(id)?
            .event_listeners
            .entry(event.to_string())
            .or_default()
            .register(listener, remove);
        Ok(())
    }

    /// Fires the listeners of a named event as if the peer had sent it
    pub fn fire_event(
        &mut self,
        id: &WidgetId,
        event: &str,
        content: JsonValue,
    ) -> Result<(), WidgetError> {
        let widget = self.open_widget(id)?;
        fire_event(widget, event, content).map_err(WidgetError::from)
    }

    /// Installs a raw consumer for the widget's inbound messages, replacing
    /// default handling. `None` restores it.
    pub fn on_receive(
        &mut self,
        id: &WidgetId,
        receiver: Option<Receiver>,
    ) -> Result<(), WidgetError> {
        self.open_widget_mut(id)?.channel.on_receive(receiver);
        Ok(())
    }

    pub fn send_custom(
        &mut self,
        id: &WidgetId,
        content: JsonValue,
        buffers: Vec<Vec<u8>>,
    ) -> Result<(), WidgetError> {
        self.open_widget(id)?
            .channel
            .send(Message::Custom { content }, buffers);
        Ok(())
    }

    // Inbound

    /// Routes one message from the peer
    pub fn receive(&mut self, envelope: Envelope) -> Result<(), WidgetError> {
        let Envelope {
            widget: id,
            message,
            buffers,
        } = envelope;

        let message = match message {
            Message::Open {
                type_key,
                state,
                buffer_paths,
                ..
            } => return self.open_remote(id, &type_key, &state, &buffer_paths, &buffers),
            message => message,
        };

        let Some(widget) = self.widgets.get_mut(&id) else {
            warn!("Dropping `{}` for unknown widget {}", message.method(), id);
            return Err(WidgetError::NotFound { widget: id });
        };
        match widget.channel.receive(message, buffers) {
            Received::Handled | Received::Dropped => Ok(()),
            Received::Unhandled(message, buffers) => self.handle(&id, message, buffers),
        }
    }

    fn handle(
        &mut self,
        id: &WidgetId,
        message: Message,
        buffers: Vec<Vec<u8>>,
    ) -> Result<(), WidgetError> {
        match message {
            Message::Update {
                state,
                buffer_paths,
            } => self.apply_remote(id, &state, &buffer_paths, &buffers),
            Message::RequestState => {
                let widget = self.open_widget(id)?;
                let names: Vec<&'static str> = widget
                    .schema
                    .synced_attributes()
                    .map(|spec| spec.name)
                    .collect();
                send_state(widget, &names);
                Ok(())
            }
            Message::Custom { content } => self.dispatch_custom(id, content, buffers),
            Message::Close => {
                info!("Peer closed widget {}", id);
                self.close_widget(id, false);
                Ok(())
            }
            Message::Open { .. } => Err(WidgetError::DuplicateId { widget: id.clone() }),
        }
    }

    fn apply_remote(
        &mut self,
        id: &WidgetId,
        state: &JsonState,
        buffer_paths: &[BufferPath],
        buffers: &[Vec<u8>],
    ) -> Result<(), WidgetError> {
        let (plan, received) = {
            let lookup = LiveWidgets(&self.widgets);
            let widget = self.open_widget(id)?;
            let received: Vec<(&'static str, Value)> =
                deserialize_state(&widget.schema, state, buffer_paths, buffers, &lookup)?
                    .into_iter()
                    .filter(|(name, value)| !is_unchanged_read_only(widget, name, value))
                    .collect();
            let plan = plan_write(&widget.store, received.iter().cloned(), &lookup)?;
            (plan, received)
        };
        debug!("Applying update to {} from peer", id);
        self.commit(id, plan, Commit::Remote { received })
    }

    fn open_remote(
        &mut self,
        id: WidgetId,
        type_key: &TypeKey,
        state: &JsonState,
        buffer_paths: &[BufferPath],
        buffers: &[Vec<u8>],
    ) -> Result<(), WidgetError> {
        if self.widgets.contains_key(&id) {
            return Err(WidgetError::DuplicateId { widget: id });
        }
        let schema = self.registry.lookup(type_key)?;
        let (store, altered) = {
            let lookup = LiveWidgets(&self.widgets);
            let received: Vec<(&'static str, Value)> =
                deserialize_state(&schema, state, buffer_paths, buffers, &lookup)?
                    .into_iter()
                    .filter(|(name, _)| !IDENTITY_ATTRS.contains(name))
                    .collect();
            let store = build_store(schema, received.iter().cloned(), &lookup)?;
            // Tell the peer about values construction clamped or normalized
            let altered: Vec<&'static str> = received
                .iter()
                .filter(|(name, value)| {
                    store.is_synced(name) == Some(true) && peer_is_stale(&store, *name, value)
                })
                .map(|(name, _)| *name)
                .collect();
            (store, altered)
        };

        let channel = Channel::new(id.clone(), self.transport.clone());
        let widget = Widget::new(id.clone(), store, channel);
        if !altered.is_empty() {
            send_state(&widget, &altered);
        }
        self.insert(widget);

        info!("Peer opened widget {} ({})", id, type_key);
        Ok(())
    }

    fn dispatch_custom(
        &mut self,
        id: &WidgetId,
        content: JsonValue,
        buffers: Vec<Vec<u8>>,
    ) -> Result<(), WidgetError> {
        let widget = self.open_widget(id)?;
        let event = content
            .get("event")
            .and_then(JsonValue::as_str)
            .map(str::to_string);

        let mut result = widget.message_listeners.fire(&CustomMessage {
            widget: id.clone(),
            content: content.clone(),
            buffers,
        });
        if let Some(event) = event {
            DispatchError::accumulate(&mut result, fire_event(widget, &event, content));
        }
        result.map_err(WidgetError::from)
    }

    // Internals

    fn fresh_id(&self) -> WidgetId {
        loop {
            let id = self.registry.assign_id();
            if !self.widgets.contains_key(&id) {
                return id;
            }
            warn!("Widget id {} already taken, drawing another", id);
        }
    }

    /// Closes children created for a widget that was then rejected
    fn discard(&mut self, children: &[WidgetId]) {
        for child in children {
            debug!("Closing {}, its parent was rejected", child);
            self.close_widget(child, true);
        }
    }

    fn insert(&mut self, widget: Widget) {
        let id = widget.id.clone();
        let rule = LinkRule::from_store(&widget.store);
        self.widgets.insert(id.clone(), widget);

        if let Some(rule) = rule {
            for endpoint in [&rule.source, &rule.target] {
                if let Some(end) = self.widgets.get_mut(&endpoint.widget) {
                    end.dependents.insert(id.clone());
                }
            }
            debug!("Link {} ties {} to {}", id, rule.source, rule.target);
            self.links.insert(id, rule);
        }
    }

    fn widget_mut(&mut self, id: &WidgetId) -> Result<&mut Widget, WidgetError> {
        self.widgets
            .get_mut(id)
            .ok_or_else(|| WidgetError::NotFound { widget: id.clone() })
    }

    fn open_widget(&self, id: &WidgetId) -> Result<&Widget, WidgetError> {
        match self.widgets.get(id) {
            Some(widget) if widget.is_open() => Ok(widget),
            Some(_) => Err(WidgetError::Closed { widget: id.clone() }),
            None => Err(WidgetError::NotFound { widget: id.clone() }),
        }
    }

    fn open_widget_mut(&mut self, id: &WidgetId) -> Result<&mut Widget, WidgetError> {
        match self.widgets.get_mut(id) {
            Some(widget) if widget.is_open() => Ok(widget),
            Some(_) => Err(WidgetError::Closed { widget: id.clone() }),
            None => Err(WidgetError::NotFound { widget: id.clone() }),
        }
    }

    fn commit(&mut self, id: &WidgetId, plan: WritePlan, commit: Commit) -> Result<(), WidgetError> {
        let echo_updates = self.config.echo_updates;
        let widget = self.widget_mut(id)?;
        Arc::make_mut(&mut widget.store).apply(&plan);

        let (outbound, origin): (Vec<&'static str>, ChangeOrigin) = match &commit {
            Commit::Local => (
                plan.synced().map(|change| change.name).collect(),
                ChangeOrigin::Local,
            ),
            Commit::Remote { received } => {
                // The peer already holds what it sent. Send back every
                // received value the store ended up disagreeing with, even
                // when the store itself did not change
                let mut outbound: Vec<&'static str> = received
                    .iter()
                    .filter(|(name, value)| {
                        echo_updates || peer_is_stale(&widget.store, *name, value)
                    })
                    .filter(|(name, _)| widget.store.is_synced(name) == Some(true))
                    .map(|(name, _)| *name)
                    .collect();
                for change in plan.synced() {
                    let was_received = received.iter().any(|(name, _)| *name == change.name);
                    if !was_received && !outbound.contains(&change.name) {
                        outbound.push(change.name);
                    }
                }
                (outbound, ChangeOrigin::Remote)
            }
        };
        publish(widget, outbound);

        let store = widget.store.clone();
        let mut result = Ok(());
        for change in plan.changes() {
            let event = AttributeChange {
                widget: id.clone(),
                name: change.name,
                old: change.old.clone(),
                new: change.new.clone(),
                origin,
                store: store.clone(),
            };
            if let Some(observers) = widget.observers.get(change.name) {
                DispatchError::accumulate(&mut result, observers.fire(&event));
            }
            DispatchError::accumulate(&mut result, widget.all_observers.fire(&event));
        }

        if self.config.evaluate_links_locally {
            DispatchError::accumulate(&mut result, self.propagate_links(id, &plan));
        }

        result.map_err(WidgetError::from)
    }

    /// Pushes committed changes through local link rules. A target that
    /// rejects the value is reported as a failure of the origin write,
    /// which stays committed.
    fn propagate_links(&mut self, id: &WidgetId, plan: &WritePlan) -> Result<(), DispatchError> {
        let mut result = Ok(());
        for change in plan.changes() {
            let origin = Endpoint::new(id.clone(), change.name);
            let targets: Vec<Endpoint> = self
                .links
                .values()
                .filter_map(|rule| rule.propagation(&origin))
                .filter(|target| !self.propagating.contains(*target))
                .cloned()
                .collect();
            if targets.is_empty() {
                continue;
            }

            self.propagating.insert(origin.clone());
            for (index, target) in targets.into_iter().enumerate() {
                debug!("Propagating {} to {}", origin, target);
                let outcome = match self.set(&target.widget, &target.attribute, change.new.clone()) {
                    Ok(()) => Ok(()),
                    Err(WidgetError::Dispatch(error)) => Err(error),
                    Err(error) => {
                        warn!("Link from {} to {} failed: {}", origin, target, error);
                        Err(DispatchError {
                            failures: vec![ListenerFailure {
                                index,
                                message: format!("link {} -> {}: {}", origin, target, error),
                            }],
                            total: 1,
                        })
                    }
                };
                DispatchError::accumulate(&mut result, outcome);
            }
            self.propagating.remove(&origin);
        }
        result
    }

    fn close_widget(&mut self, id: &WidgetId, notify_peer: bool) {
        let mut dependents: Vec<WidgetId> = match self.widgets.get_mut(id) {
            Some(widget) if widget.is_open() => {
                widget.state = OpenState::Closing;
                widget.dependents.drain().collect()
            }
            _ => return,
        };
        dependents.sort();

        if let Some(rule) = self.links.remove(id) {
            for endpoint in [&rule.source, &rule.target] {
                if let Some(end) = self.widgets.get_mut(&endpoint.widget) {
                    end.dependents.remove(id);
                }
            }
            info!("Unlinked {} from {}", rule.source, rule.target);
        }

        for dependent in dependents {
            self.close_widget(&dependent, true);
        }

        if let Some(widget) = self.widgets.get_mut(id) {
            let released = Arc::make_mut(&mut widget.store).release_references();
            if !released.is_empty() {
                debug!("Released references of {}: {:?}", id, released);
            }
            if notify_peer {
                widget.channel.close();
            } else {
                widget.channel.close_silently();
            }
            widget.clear_listeners();
            widget.held.clear();
            widget.state = OpenState::Closed;
            info!("Closed widget {}", id);
        }
    }
}

impl Drop for WidgetManager {
    fn drop(&mut self) {
        self.close_all();
    }
}

/// Whether the store disagrees with a value the peer sent for `name`. A
/// value that only differs in representation, like `3.0` for an int, is
/// not stale.
fn peer_is_stale(store: &AttributeStore, name: &'static str, received: &Value) -> bool {
    let stored = store.value(name);
    if stored == received {
        return false;
    }
    match store.schema().attribute(name) {
        Some(spec) => spec
            .kind
            .coerce(name, received.clone())
            .map_or(true, |coerced| &coerced != stored),
        None => false,
    }
}

fn is_unchanged_read_only(widget: &Widget, name: &str, value: &Value) -> bool {
    widget
        .schema
        .attribute(name)
        .is_some_and(|spec| spec.read_only)
        && widget.store.value(name) == value
}

fn fire_event(widget: &Widget, event: &str, content: JsonValue) -> Result<(), DispatchError> {
    match widget.event_listeners.get(event) {
        Some(listeners) => listeners.fire(&WidgetEvent {
            widget: widget.id.clone(),
            event: event.to_string(),
            content,
        }),
        None => {
            if !widget.schema.has_event(event) {
                debug!("Widget {} has no `{}` event", widget.id, event);
            }
            Ok(())
        }
    }
}

fn publish(widget: &mut Widget, names: Vec<&'static str>) {
    if names.is_empty() {
        return;
    }
    if widget.hold_depth > 0 {
        for name in names {
            if !widget.held.contains(&name) {
                widget.held.push(name);
            }
        }
        return;
    }
    send_state(widget, &names);
}

fn send_state(widget: &Widget, names: &[&'static str]) {
    let serialized = serialize_state(names.iter().filter_map(|name| {
        widget
            .schema
            .attribute(name)
            .map(|spec| (spec, widget.store.value(name)))
    }));
    debug!("Sending update for {}: {:?}", widget.id, names);
    widget.channel.send(
        Message::Update {
            state: serialized.state,
            buffer_paths: serialized.buffer_paths,
        },
        serialized.buffers,
    );
}
