use std::sync::Arc;

use tether_server::{register_builtin_types, ManagerConfig, WidgetError, WidgetManager};
use tether_shared::{Schema, TypeKey, TypeRegistry, Value, WidgetId};

use crate::{LocalTransport, MirrorPeer};

/// Rounds of message exchange before `pump` gives up on a chatty pair
const MAX_PUMP_ROUNDS: usize = 64;

/// A backend manager wired to a mirror peer through an in-memory transport
pub struct Session {
    pub manager: WidgetManager,
    pub transport: Arc<LocalTransport>,
    pub peer: MirrorPeer,
}

impl Session {
    pub fn new() -> Self {
        Self::with_types(ManagerConfig::default(), Vec::new())
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self::with_types(config, Vec::new())
    }

    /// A session whose registry also knows `extra` types
    pub fn with_types(config: ManagerConfig, extra: Vec<Schema>) -> Self {
        let registry = TypeRegistry::with_seed(42);
        register_builtin_types(&registry).unwrap();
        for schema in extra {
            registry.register(schema).unwrap();
        }
        registry.lock().unwrap();

        let transport = LocalTransport::new();
        let manager = WidgetManager::new(config, Arc::new(registry), transport.clone());

        Self {
            manager,
            transport,
            peer: MirrorPeer::new(),
        }
    }

    /// Creates a built-in controls widget
    pub fn create<N: AsRef<str>>(
        &mut self,
        model: &str,
        args: impl IntoIterator<Item = (N, Value)>,
    ) -> Result<WidgetId, WidgetError> {
        self.manager.create(&TypeKey::controls(model), args)
    }

    /// Delivers messages both ways until neither side has anything left to
    /// say. Returns the errors the backend reported for inbound messages.
    pub fn pump(&mut self) -> Vec<WidgetError> {
        let mut errors = Vec::new();
        for _ in 0..MAX_PUMP_ROUNDS {
            let outbound = self.transport.drain();
            for envelope in outbound.iter().cloned() {
                self.peer.receive(envelope);
            }
            let inbound = self.peer.take_outbox();
            if outbound.is_empty() && inbound.is_empty() {
                return errors;
            }
            for envelope in inbound {
                if let Err(error) = self.manager.receive(envelope) {
                    errors.push(error);
                }
            }
        }
        panic!("session did not settle after {} rounds", MAX_PUMP_ROUNDS);
    }

    /// Pumps and fails the test on any backend error
    pub fn settle(&mut self) {
        let errors = self.pump();
        assert!(errors.is_empty(), "backend reported errors: {:?}", errors);
    }

    pub fn get(&self, widget: &WidgetId, name: &str) -> Value {
        self.manager.get(widget, name).unwrap()
    }
}

/// Constructor arguments for a widget built entirely from defaults
pub fn no_args() -> Vec<(&'static str, Value)> {
    Vec::new()
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
