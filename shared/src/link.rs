//! Propagation rules of link widgets.
//!
//! A link ties `(source widget, attribute)` to `(target widget, attribute)`.
//! The remote peer normally evaluates links; [`LinkRule`] states what
//! evaluation means so every evaluator agrees.

use std::fmt;

use crate::{
    constants::{DIRECTIONAL_LINK_MODEL, LINK_MODEL},
    engine::error::ValidationError,
    AttributeStore, Value, WidgetId, WidgetLookup,
};

/// A `(widget, attribute)` pair
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub widget: WidgetId,
    pub attribute: String,
}

impl Endpoint {
    pub fn new(widget: WidgetId, attribute: impl Into<String>) -> Self {
        Self {
            widget,
            attribute: attribute.into(),
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        let (widget, attribute) = value.as_pair()?;
        Some(Self::new(widget.as_widget()?.clone(), attribute.as_str()?))
    }

    pub fn to_value(&self) -> Value {
        Value::Tuple(vec![
            Value::Widget(self.widget.clone()),
            Value::Str(self.attribute.clone()),
        ])
    }
}

impl From<Endpoint> for Value {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.to_value()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.widget, self.attribute)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkDirection {
    /// Changes flow both ways
    Bidirectional,
    /// Changes flow from source to target only
    Directional,
}

impl LinkDirection {
    pub fn from_model_name(name: &str) -> Option<Self> {
        match name {
            LINK_MODEL => Some(LinkDirection::Bidirectional),
            DIRECTIONAL_LINK_MODEL => Some(LinkDirection::Directional),
            _ => None,
        }
    }

    pub fn model_name(&self) -> &'static str {
        match self {
            LinkDirection::Bidirectional => LINK_MODEL,
            LinkDirection::Directional => DIRECTIONAL_LINK_MODEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LinkRule {
    pub source: Endpoint,
    pub target: Endpoint,
    pub direction: LinkDirection,
}

impl LinkRule {
    pub fn new(source: Endpoint, target: Endpoint, direction: LinkDirection) -> Self {
        Self {
            source,
            target,
            direction,
        }
    }

    /// Reads a rule out of a link widget's attributes
    pub fn from_store(store: &AttributeStore) -> Option<Self> {
        let direction = LinkDirection::from_model_name(&store.schema().type_key().name)?;
        Some(Self::new(
            Endpoint::from_value(store.value("source"))?,
            Endpoint::from_value(store.value("target"))?,
            direction,
        ))
    }

    pub fn involves(&self, widget: &WidgetId) -> bool {
        self.source.widget == *widget || self.target.widget == *widget
    }

    /// Where a change of `changed` must be copied, if anywhere
    pub fn propagation(&self, changed: &Endpoint) -> Option<&Endpoint> {
        if *changed == self.source {
            Some(&self.target)
        } else if *changed == self.target && self.direction == LinkDirection::Bidirectional {
            Some(&self.source)
        } else {
            None
        }
    }
}

/// Validator for link endpoints: the widget must be live and the attribute
/// must exist and be synchronized
pub fn validate_endpoint(
    lookup: &dyn WidgetLookup,
    attribute: &'static str,
    value: Value,
) -> Result<Value, ValidationError> {
    let endpoint = Endpoint::from_value(&value).ok_or(ValidationError::TypeMismatch {
        attribute,
        expected: "(widget, attribute) pair",
        found: value.type_name(),
    })?;
    let invalid = |reason| ValidationError::InvalidAttribute {
        widget: endpoint.widget.clone(),
        attribute: endpoint.attribute.clone(),
        reason,
    };

    if !lookup.is_live(&endpoint.widget) {
        return Err(invalid("widget is not open"));
    }
    match lookup.attribute_synced(&endpoint.widget, &endpoint.attribute) {
        None => Err(invalid("no such attribute")),
        Some(false) => Err(invalid("attribute is not synchronized")),
        Some(true) => Ok(value),
    }
}
