//! # Validation / constraint engine
//!
//! Every attribute write passes through [`plan_write`] before anything is
//! committed:
//!
//! 1. each proposed value is coerced into its attribute's kind and run through
//!    the attribute's validator;
//! 2. the schema's reconciler (if any) sees the committed store plus the whole
//!    validated proposal and returns the complete, ordered set of values to
//!    publish;
//! 3. values equal to what is already stored are dropped.
//!
//! The resulting [`WritePlan`] is applied in one step, so observers never see
//! a store in which interdependent attributes disagree.

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use log::debug;

use crate::{
    schema::{InitState, IDENTITY_ATTRS},
    AttributeStore, Schema, Value, WidgetLookup,
};

pub mod bounded;
pub mod error;
pub mod interval;

use error::ValidationError;

/// A validated, not yet reconciled, set of proposed writes. Later writes to
/// the same attribute replace earlier ones.
#[derive(Clone, Debug, Default)]
pub struct PendingWrite {
    writes: Vec<(&'static str, Value)>,
}

impl PendingWrite {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.writes
            .iter()
            .find(|(written, _)| *written == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The proposed value if there is one, the committed one otherwise
    pub fn effective<'a>(&'a self, store: &'a AttributeStore, name: &str) -> &'a Value {
        self.get(name).unwrap_or_else(|| store.value(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &(&'static str, Value)> {
        self.writes.iter()
    }

    /// Proposed writes other than `names`, in proposal order
    pub fn others(&self, names: &[&str]) -> Vec<(&'static str, Value)> {
        self.writes
            .iter()
            .filter(|(name, _)| !names.contains(name))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn into_vec(self) -> Vec<(&'static str, Value)> {
        self.writes
    }

    fn insert(&mut self, name: &'static str, value: Value) {
        match self.writes.iter_mut().find(|(written, _)| *written == name) {
            Some((_, existing)) => *existing = value,
            None => self.writes.push((name, value)),
        }
    }
}

/// One attribute whose value a plan changes
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub name: &'static str,
    pub old: Value,
    pub new: Value,
    pub sync: bool,
}

/// The effective changes of one accepted write, in publication order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WritePlan {
    changes: Vec<Change>,
}

impl WritePlan {
    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn synced(&self) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(|change| change.sync)
    }

    pub fn get(&self, name: &str) -> Option<&Change> {
        self.changes.iter().find(|change| change.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Validates and reconciles `writes` against `store` without mutating it
pub fn plan_write<N: AsRef<str>>(
    store: &AttributeStore,
    writes: impl IntoIterator<Item = (N, Value)>,
    lookup: &dyn WidgetLookup,
) -> Result<WritePlan, ValidationError> {
    let schema = store.schema();

    let mut pending = PendingWrite::default();
    for (name, value) in writes {
        let name = name.as_ref();
        let spec = schema
            .attribute(name)
            .ok_or_else(|| ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            })?;
        if spec.read_only {
            return Err(ValidationError::ReadOnly { attribute: spec.name });
        }
        pending.insert(spec.name, spec.check(lookup, value)?);
    }

    let published = match schema.reconciler() {
        Some(reconcile) => reconcile(store, &pending)?,
        None => pending.into_vec(),
    };

    let mut changes: Vec<Change> = Vec::new();
    for (name, new) in published {
        let Some(spec) = schema.attribute(name) else {
            return Err(ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            });
        };
        let old = store.value(name);
        if *old == new || changes.iter().any(|change| change.name == name) {
            continue;
        }
        changes.push(Change {
            name: spec.name,
            old: old.clone(),
            new,
            sync: spec.sync,
        });
    }

    debug!(
        "Planned write on {}: {:?}",
        schema.type_key().name,
        changes.iter().map(|change| change.name).collect::<Vec<_>>()
    );

    Ok(WritePlan { changes })
}

/// Builds the initial store of a new widget: defaults, overlaid with the
/// validated constructor arguments, then the schema's construction policy.
/// Nothing is observable unless every step succeeds.
pub fn build_store<N: AsRef<str>>(
    schema: Arc<Schema>,
    args: impl IntoIterator<Item = (N, Value)>,
    lookup: &dyn WidgetLookup,
) -> Result<AttributeStore, ValidationError> {
    let mut values: HashMap<&'static str, Value> = schema
        .attributes()
        .iter()
        .map(|spec| (spec.name, spec.default.clone()))
        .collect();
    let mut explicit = HashSet::new();

    for (name, value) in args {
        let name = name.as_ref();
        let spec = schema
            .attribute(name)
            .ok_or_else(|| ValidationError::UnknownAttribute {
                attribute: name.to_string(),
            })?;
        if IDENTITY_ATTRS.contains(&spec.name) {
            return Err(ValidationError::ReadOnly { attribute: spec.name });
        }
        values.insert(spec.name, spec.check(lookup, value)?);
        explicit.insert(spec.name);
    }

    let values = match schema.initializer() {
        Some(initialize) => {
            let mut init = InitState::new(values, explicit);
            initialize(&mut init)?;
            init.into_values()
        }
        None => values,
    };

    Ok(AttributeStore::from_values(schema, values))
}
