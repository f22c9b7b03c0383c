use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BASE_MODULE, BASE_MODULE_VERSION, CONTROLS_MODULE, CONTROLS_MODULE_VERSION};

/// Opaque, stable identifier of a widget instance
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifies a reconstructable widget type: the module that exports it, the
/// module version, and the exported name
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    pub module: String,
    pub version: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(module: impl Into<String>, version: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            version: version.into(),
            name: name.into(),
        }
    }

    /// A model or view exported by the controls module
    pub fn controls(name: impl Into<String>) -> Self {
        Self::new(CONTROLS_MODULE, CONTROLS_MODULE_VERSION, name)
    }

    /// A model or view exported by the base module
    pub fn base(name: impl Into<String>) -> Self {
        Self::new(BASE_MODULE, BASE_MODULE_VERSION, name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}::{}", self.module, self.version, self.name)
    }
}

/// Lifecycle of a widget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpenState {
    Open,
    Closing,
    Closed,
}

impl OpenState {
    pub fn name(&self) -> &'static str {
        match self {
            OpenState::Open => "Open",
            OpenState::Closing => "Closing",
            OpenState::Closed => "Closed",
        }
    }
}
