//! Explicit per-type attribute tables.
//!
//! A [`Schema`] lists every attribute of a widget type together with its kind,
//! default, sync flag and validator, plus the optional reconciler that keeps
//! interdependent attributes consistent and the initializer that applies the
//! type's construction-time policy.

use std::collections::{HashMap, HashSet};

use crate::{
    constants::{
        MODEL_MODULE_ATTR, MODEL_MODULE_VERSION_ATTR, MODEL_NAME_ATTR, VIEW_MODULE_ATTR,
        VIEW_MODULE_VERSION_ATTR, VIEW_NAME_ATTR,
    },
    engine::{error::ValidationError, PendingWrite},
    AttributeStore, TypeKey, Value,
};

pub mod attribute;
pub mod color;

pub use attribute::{AttributeKind, AttributeSpec, Validator};

/// Attributes that carry the widget's type identity
pub const IDENTITY_ATTRS: [&str; 6] = [
    MODEL_MODULE_ATTR,
    MODEL_MODULE_VERSION_ATTR,
    MODEL_NAME_ATTR,
    VIEW_MODULE_ATTR,
    VIEW_MODULE_VERSION_ATTR,
    VIEW_NAME_ATTR,
];

/// Multi-attribute reconciliation pass. Receives the committed store and the
/// validated proposal, returns the complete ordered list of values to publish.
pub type Reconciler =
    fn(store: &AttributeStore, pending: &PendingWrite) -> Result<Vec<(&'static str, Value)>, ValidationError>;

/// Construction-time policy, run once over defaults overlaid with the
/// explicit constructor arguments
pub type Initializer = fn(init: &mut InitState) -> Result<(), ValidationError>;

pub struct Schema {
    type_key: TypeKey,
    view: Option<TypeKey>,
    attributes: Vec<AttributeSpec>,
    index: HashMap<&'static str, usize>,
    reconciler: Option<Reconciler>,
    initializer: Option<Initializer>,
    events: Vec<&'static str>,
    children: Vec<(&'static str, TypeKey)>,
}

impl Schema {
    pub fn builder(type_key: TypeKey) -> SchemaBuilder {
        SchemaBuilder {
            type_key,
            view: None,
            attributes: Vec::new(),
            reconciler: None,
            initializer: None,
            events: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn type_key(&self) -> &TypeKey {
        &self.type_key
    }

    pub fn view_key(&self) -> Option<&TypeKey> {
        self.view.as_ref()
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.index.get(name).map(|i| &self.attributes[*i])
    }

    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    pub fn synced_attributes(&self) -> impl Iterator<Item = &AttributeSpec> {
        self.attributes.iter().filter(|spec| spec.sync)
    }

    pub fn reconciler(&self) -> Option<Reconciler> {
        self.reconciler
    }

    pub fn initializer(&self) -> Option<Initializer> {
        self.initializer
    }

    /// Names of the UI events this type reacts to (e.g. `click`)
    pub fn events(&self) -> &[&'static str] {
        &self.events
    }

    pub fn has_event(&self, event: &str) -> bool {
        self.events.iter().any(|e| *e == event)
    }

    /// Reference attributes that get a freshly created widget of the given
    /// type when construction leaves them unset
    pub fn children(&self) -> &[(&'static str, TypeKey)] {
        &self.children
    }
}

pub struct SchemaBuilder {
    type_key: TypeKey,
    view: Option<TypeKey>,
    attributes: Vec<AttributeSpec>,
    reconciler: Option<Reconciler>,
    initializer: Option<Initializer>,
    events: Vec<&'static str>,
    children: Vec<(&'static str, TypeKey)>,
}

impl SchemaBuilder {
    pub fn view(mut self, view: TypeKey) -> Self {
        self.view = Some(view);
        self
    }

    /// Adds an attribute, replacing any earlier one of the same name
    pub fn attribute(mut self, spec: AttributeSpec) -> Self {
        match self.attributes.iter_mut().find(|existing| existing.name == spec.name) {
            Some(existing) => *existing = spec,
            None => self.attributes.push(spec),
        }
        self
    }

    pub fn attributes(self, specs: impl IntoIterator<Item = AttributeSpec>) -> Self {
        specs.into_iter().fold(self, SchemaBuilder::attribute)
    }

    pub fn reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = Some(reconciler);
        self
    }

    pub fn initializer(mut self, initializer: Initializer) -> Self {
        self.initializer = Some(initializer);
        self
    }

    pub fn event(mut self, event: &'static str) -> Self {
        if !self.events.contains(&event) {
            self.events.push(event);
        }
        self
    }

    /// Declares `name` as owning a child widget of `type_key`. `name` must
    /// also be added as a nullable [`AttributeKind::WidgetRef`] attribute.
    pub fn child(mut self, name: &'static str, type_key: TypeKey) -> Self {
        self.children.retain(|(existing, _)| *existing != name);
        self.children.push((name, type_key));
        self
    }

    pub fn build(self) -> Schema {
        let identity = |name: &'static str, value: Option<&str>| {
            AttributeSpec::synced(name, AttributeKind::Str, value.map_or(Value::Null, Value::from))
                .nullable()
                .read_only()
        };
        let view = self.view.as_ref();

        let mut attributes = vec![
            identity(MODEL_MODULE_ATTR, Some(self.type_key.module.as_str())),
            identity(MODEL_MODULE_VERSION_ATTR, Some(self.type_key.version.as_str())),
            identity(MODEL_NAME_ATTR, Some(self.type_key.name.as_str())),
            identity(VIEW_MODULE_ATTR, view.map(|v| v.module.as_str())),
            identity(VIEW_MODULE_VERSION_ATTR, view.map(|v| v.version.as_str())),
            identity(VIEW_NAME_ATTR, view.map(|v| v.name.as_str())),
        ];
        attributes.extend(
            self.attributes
                .into_iter()
                .filter(|spec| !IDENTITY_ATTRS.contains(&spec.name)),
        );

        let index = attributes
            .iter()
            .enumerate()
            .map(|(i, spec)| (spec.name, i))
            .collect();

        Schema {
            type_key: self.type_key,
            view: self.view,
            attributes,
            index,
            reconciler: self.reconciler,
            initializer: self.initializer,
            events: self.events,
            children: self.children,
        }
    }
}

/// Staged attribute values of a widget under construction
pub struct InitState {
    values: HashMap<&'static str, Value>,
    explicit: HashSet<&'static str>,
}

impl InitState {
    pub(crate) fn new(values: HashMap<&'static str, Value>, explicit: HashSet<&'static str>) -> Self {
        Self { values, explicit }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Whether the constructor was given this attribute
    pub fn is_explicit(&self, name: &str) -> bool {
        self.explicit.contains(name)
    }

    pub fn set(&mut self, name: &'static str, value: Value) {
        self.values.insert(name, value);
    }

    pub(crate) fn into_values(self) -> HashMap<&'static str, Value> {
        self.values
    }
}
