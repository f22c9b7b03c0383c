use std::fmt;

use crate::{engine::error::ValidationError, schema::color::is_valid_color, Value, WidgetLookup};

/// Per-attribute validator, run after kind coercion. May rewrite the value.
pub type Validator =
    fn(lookup: &dyn WidgetLookup, attribute: &'static str, value: Value) -> Result<Value, ValidationError>;

/// Semantic type of an attribute
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeKind {
    /// Anything; opaque to the engine
    Any,
    Bool,
    Int,
    Float,
    Str,
    /// One of a fixed set of strings, matched case-insensitively
    Enum(&'static [&'static str]),
    Color,
    IntPair,
    FloatPair,
    /// Binary data, carried as an out-of-band buffer
    Bytes,
    /// Reference to another widget
    WidgetRef,
    /// Ordered references to other widgets
    WidgetRefs,
    /// A `(widget, attribute name)` pair
    Endpoint,
}

impl AttributeKind {
    pub fn name(&self) -> &'static str {
        match self {
            AttributeKind::Any => "any value",
            AttributeKind::Bool => "bool",
            AttributeKind::Int => "int",
            AttributeKind::Float => "float",
            AttributeKind::Str => "str",
            AttributeKind::Enum(_) => "enumerated str",
            AttributeKind::Color => "color",
            AttributeKind::IntPair => "pair of ints",
            AttributeKind::FloatPair => "pair of floats",
            AttributeKind::Bytes => "bytes",
            AttributeKind::WidgetRef => "widget",
            AttributeKind::WidgetRefs => "tuple of widgets",
            AttributeKind::Endpoint => "(widget, attribute) pair",
        }
    }

    /// Whether values of this kind serialize as widget references
    pub fn holds_references(&self) -> bool {
        matches!(
            self,
            AttributeKind::WidgetRef | AttributeKind::WidgetRefs | AttributeKind::Endpoint
        )
    }

    /// Casts `value` into this kind, following the usual numeric casts:
    /// ints accept bools and floats (truncated), floats accept ints
    pub fn coerce(&self, attribute: &'static str, value: Value) -> Result<Value, ValidationError> {
        let mismatch = |found: &Value| ValidationError::TypeMismatch {
            attribute,
            expected: self.name(),
            found: found.type_name(),
        };

        match (self, value) {
            (AttributeKind::Any, value) => Ok(value),
            (AttributeKind::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
            (AttributeKind::Int, Value::Int(i)) => Ok(Value::Int(i)),
            (AttributeKind::Int, Value::Bool(b)) => Ok(Value::Int(i64::from(b))),
            (AttributeKind::Int, Value::Float(f)) => finite(attribute, f).map(|f| Value::Int(f as i64)),
            (AttributeKind::Float, Value::Float(f)) => not_nan(attribute, f).map(Value::Float),
            (AttributeKind::Float, Value::Int(i)) => Ok(Value::Float(i as f64)),
            (AttributeKind::Str, Value::Str(s)) => Ok(Value::Str(s)),
            (AttributeKind::Enum(options), Value::Str(s)) => options
                .iter()
                .find(|option| option.eq_ignore_ascii_case(&s))
                .map(|option| Value::Str(option.to_string()))
                .ok_or_else(|| ValidationError::InvalidValue {
                    attribute,
                    reason: format!("`{}` is not one of {:?}", s, options),
                }),
            (AttributeKind::Color, Value::Str(s)) => {
                if is_valid_color(&s) {
                    Ok(Value::Str(s))
                } else {
                    Err(ValidationError::InvalidValue {
                        attribute,
                        reason: format!("`{}` is not a valid color", s),
                    })
                }
            }
            (AttributeKind::IntPair, Value::Tuple(items)) if items.len() == 2 => items
                .into_iter()
                .map(|item| AttributeKind::Int.coerce(attribute, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple),
            (AttributeKind::FloatPair, Value::Tuple(items)) if items.len() == 2 => items
                .into_iter()
                .map(|item| AttributeKind::Float.coerce(attribute, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Tuple),
            (AttributeKind::Bytes, Value::Bytes(b)) => Ok(Value::Bytes(b)),
            (AttributeKind::WidgetRef, Value::Widget(id)) => Ok(Value::Widget(id)),
            (AttributeKind::WidgetRefs, Value::Tuple(items))
                if items.iter().all(|item| matches!(item, Value::Widget(_))) =>
            {
                Ok(Value::Tuple(items))
            }
            (AttributeKind::Endpoint, Value::Tuple(items))
                if matches!(items.as_slice(), [Value::Widget(_), Value::Str(_)]) =>
            {
                Ok(Value::Tuple(items))
            }
            (_, other) => Err(mismatch(&other)),
        }
    }
}

fn finite(attribute: &'static str, f: f64) -> Result<f64, ValidationError> {
    if f.is_finite() {
        Ok(f)
    } else {
        Err(ValidationError::InvalidValue {
            attribute,
            reason: format!("{} cannot be cast to int", f),
        })
    }
}

fn not_nan(attribute: &'static str, f: f64) -> Result<f64, ValidationError> {
    if f.is_nan() {
        Err(ValidationError::InvalidValue {
            attribute,
            reason: "NaN is not a valid number".to_string(),
        })
    } else {
        Ok(f)
    }
}

/// One row of a widget type's schema
#[derive(Clone)]
pub struct AttributeSpec {
    pub name: &'static str,
    pub kind: AttributeKind,
    pub default: Value,
    /// Mirrored to the remote peer
    pub sync: bool,
    /// Set at construction only
    pub read_only: bool,
    pub nullable: bool,
    pub validator: Option<Validator>,
}

impl AttributeSpec {
    /// An attribute mirrored to the remote peer
    pub fn synced(name: &'static str, kind: AttributeKind, default: impl Into<Value>) -> Self {
        Self {
            name,
            kind,
            default: default.into(),
            sync: true,
            read_only: false,
            nullable: false,
            validator: None,
        }
    }

    /// A backend-only attribute
    pub fn local(name: &'static str, kind: AttributeKind, default: impl Into<Value>) -> Self {
        Self {
            sync: false,
            ..Self::synced(name, kind, default)
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Coerces and validates a proposed value
    pub fn check(&self, lookup: &dyn WidgetLookup, value: Value) -> Result<Value, ValidationError> {
        if value.is_null() && self.nullable {
            return Ok(Value::Null);
        }
        let value = self.kind.coerce(self.name, value)?;
        match self.validator {
            Some(validator) => validator(lookup, self.name, value),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for AttributeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeSpec")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("sync", &self.sync)
            .field("read_only", &self.read_only)
            .field("nullable", &self.nullable)
            .field("validator", &self.validator.is_some())
            .finish()
    }
}
