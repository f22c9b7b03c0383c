use thiserror::Error;

use crate::TypeKey;

/// Errors that can occur during type registry operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// No constructor is registered under this type key
    #[error("Unknown widget type {type_key}. Register it with TypeRegistry::register() before use")]
    UnknownType { type_key: TypeKey },

    /// Registry is locked and cannot be modified
    #[error("Type registry is already locked and cannot be modified. TypeRegistry.lock() has been called and no further registrations are allowed")]
    AlreadyLocked,
}
