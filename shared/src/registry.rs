use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, OnceLock, RwLock,
    },
};

use log::{info, warn};

use crate::{IdGenerator, Schema, TypeKey, WidgetId};

pub mod error;
pub use error::RegistryError;

// Registry Plugin
pub trait RegistryPlugin {
    fn build(&self, registry: &TypeRegistry) -> Result<(), RegistryError>;
}

/// Process-wide table of reconstructable widget types, keyed by
/// `(module, version, name)`. Read-mostly: lookups may run concurrently with
/// registration.
pub struct TypeRegistry {
    types: RwLock<HashMap<TypeKey, Arc<Schema>>>,
    ids: Mutex<IdGenerator>,
    locked: AtomicBool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::with_id_generator(IdGenerator::new())
    }

    /// A registry whose assigned ids follow a deterministic sequence
    pub fn with_seed(seed: u64) -> Self {
        Self::with_id_generator(IdGenerator::with_seed(seed))
    }

    fn with_id_generator(ids: IdGenerator) -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            ids: Mutex::new(ids),
            locked: AtomicBool::new(false),
        }
    }

    /// The process-wide registry
    pub fn global() -> Arc<TypeRegistry> {
        static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(TypeRegistry::new())).clone()
    }

    pub fn add_plugin<P: RegistryPlugin>(&self, plugin: P) -> Result<&Self, RegistryError> {
        self.try_check_lock()?;
        plugin.build(self)?;
        Ok(self)
    }

    /// Registers a widget type. Registering an existing key replaces it.
    pub fn register(&self, schema: Schema) -> Result<Arc<Schema>, RegistryError> {
        self.try_check_lock()?;

        let schema = Arc::new(schema);
        let type_key = schema.type_key().clone();
        let mut types = self.types.write().unwrap_or_else(|e| e.into_inner());
        if types.insert(type_key.clone(), schema.clone()).is_some() {
            warn!("Widget type {} registered twice, replacing previous schema", type_key);
        }
        Ok(schema)
    }

    pub fn lookup(&self, type_key: &TypeKey) -> Result<Arc<Schema>, RegistryError> {
        self.types
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(type_key)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownType {
                type_key: type_key.clone(),
            })
    }

    pub fn contains(&self, type_key: &TypeKey) -> bool {
        self.types
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(type_key)
    }

    pub fn len(&self) -> usize {
        self.types.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A fresh id. Uniqueness against the live set is checked by the caller,
    /// who knows which widgets are alive.
    pub fn assign_id(&self) -> WidgetId {
        self.ids.lock().unwrap_or_else(|e| e.into_inner()).generate()
    }

    /// Ends the registration phase
    pub fn lock(&self) -> Result<(), RegistryError> {
        self.try_check_lock()?;
        self.locked.store(true, Ordering::Release);
        info!("Type registry locked with {} widget types", self.len());
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Acquire)
    }

    /// Returns Err if the registry is locked
    pub fn try_check_lock(&self) -> Result<(), RegistryError> {
        if self.is_locked() {
            Err(RegistryError::AlreadyLocked)
        } else {
            Ok(())
        }
    }
}
