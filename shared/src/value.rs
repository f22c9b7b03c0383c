use serde::{Deserialize, Serialize};

use crate::WidgetId;

/// The value of a single widget attribute
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Tuple(Vec<Value>),
    Widget(WidgetId),
    /// Opaque structured data (style and layout dictionaries and the like)
    Json(serde_json::Value),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Tuple(_) => "tuple",
            Value::Widget(_) => "widget",
            Value::Json(_) => "json",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Ints widen to floats
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_widget(&self) -> Option<&WidgetId> {
        match self {
            Value::Widget(id) => Some(id),
            _ => None,
        }
    }

    /// Two-element tuple as a pair
    pub fn as_pair(&self) -> Option<(&Value, &Value)> {
        match self.as_tuple()? {
            [a, b] => Some((a, b)),
            _ => None,
        }
    }

    /// Every widget this value refers to, in order
    pub fn referenced_widgets(&self) -> Vec<&WidgetId> {
        match self {
            Value::Widget(id) => vec![id],
            Value::Tuple(items) => items.iter().flat_map(Value::referenced_widgets).collect(),
            _ => Vec::new(),
        }
    }

    /// Replaces the element addressed by `path`. Returns false if the path does
    /// not address an existing element.
    pub fn set_path(&mut self, path: &[PathSegment], value: Value) -> bool {
        let Some((head, rest)) = path.split_first() else {
            *self = value;
            return true;
        };
        match (self, head) {
            (Value::Tuple(items), PathSegment::Index(index)) => match items.get_mut(*index) {
                Some(item) => item.set_path(rest, value),
                None => false,
            },
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<WidgetId> for Value {
    fn from(id: WidgetId) -> Self {
        Value::Widget(id)
    }
}

impl From<&WidgetId> for Value {
    fn from(id: &WidgetId) -> Self {
        Value::Widget(id.clone())
    }
}

impl From<Vec<WidgetId>> for Value {
    fn from(ids: Vec<WidgetId>) -> Self {
        Value::Tuple(ids.into_iter().map(Value::Widget).collect())
    }
}

impl<A: Into<Value>, B: Into<Value>> From<(A, B)> for Value {
    fn from((a, b): (A, B)) -> Self {
        Value::Tuple(vec![a.into(), b.into()])
    }
}

/// One step of a buffer path: an attribute name at the top level, an index
/// inside tuples
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

pub type BufferPath = Vec<PathSegment>;
