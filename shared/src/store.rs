use std::{collections::HashMap, fmt, sync::Arc};

use crate::{engine::WritePlan, AttributeSpec, Schema, Value};

static NULL: Value = Value::Null;

/// Current attribute values of one widget, shaped by its schema
#[derive(Clone)]
pub struct AttributeStore {
    schema: Arc<Schema>,
    values: HashMap<&'static str, Value>,
}

impl AttributeStore {
    /// A store holding every attribute's default
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema
            .attributes()
            .iter()
            .map(|spec| (spec.name, spec.default.clone()))
            .collect();
        Self { schema, values }
    }

    pub(crate) fn from_values(schema: Arc<Schema>, mut values: HashMap<&'static str, Value>) -> Self {
        for spec in schema.attributes() {
            values.entry(spec.name).or_insert_with(|| spec.default.clone());
        }
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The attribute's value, `Null` if the schema has no such attribute
    pub fn value(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn i64(&self, name: &str) -> Option<i64> {
        self.value(name).as_i64()
    }

    pub fn f64(&self, name: &str) -> Option<f64> {
        self.value(name).as_f64()
    }

    /// Every attribute with its value, in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&AttributeSpec, &Value)> {
        self.schema
            .attributes()
            .iter()
            .map(move |spec| (spec, self.value(spec.name)))
    }

    /// Synchronized attributes with their values, in schema order
    pub fn synced(&self) -> impl Iterator<Item = (&AttributeSpec, &Value)> {
        self.iter().filter(|(spec, _)| spec.sync)
    }

    pub fn is_synced(&self, name: &str) -> Option<bool> {
        self.schema.attribute(name).map(|spec| spec.sync)
    }

    pub fn sync_flags(&self) -> HashMap<&'static str, bool> {
        self.schema
            .attributes()
            .iter()
            .map(|spec| (spec.name, spec.sync))
            .collect()
    }

    /// Commits a plan produced by [`crate::plan_write`] against this store
    pub fn apply(&mut self, plan: &WritePlan) {
        for change in plan.changes() {
            self.values.insert(change.name, change.new.clone());
        }
    }

    /// Returns every reference-holding attribute to its default, yielding the
    /// names that changed
    pub fn release_references(&mut self) -> Vec<&'static str> {
        let mut released = Vec::new();
        for spec in self.schema.attributes() {
            if !spec.kind.holds_references() || spec.read_only {
                continue;
            }
            if let Some(value) = self.values.get_mut(spec.name) {
                if *value != spec.default {
                    *value = spec.default.clone();
                    released.push(spec.name);
                }
            }
        }
        released
    }
}

impl fmt::Debug for AttributeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeStore")
            .field("type_key", self.schema.type_key())
            .field("values", &self.values)
            .finish()
    }
}
