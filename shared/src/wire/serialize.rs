//! Conversion between attribute values and their JSON wire form.
//!
//! Widget references travel as `"IPY_MODEL_<id>"` strings. Binary values are
//! pulled out of the JSON state into a separate buffer list, each buffer
//! addressed by a path: a top-level bytes attribute is removed from the state
//! entirely, a bytes element inside a tuple is left as `null`.

use log::warn;
use serde_json::{Number, Value as JsonValue};

use crate::{
    constants::MODEL_REF_PREFIX,
    wire::{error::WireError, message::JsonState},
    AttributeKind, AttributeSpec, BufferPath, PathSegment, Schema, Value, WidgetId, WidgetLookup,
};

/// A JSON state map with its extracted binary buffers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SerializedState {
    pub state: JsonState,
    pub buffer_paths: Vec<BufferPath>,
    pub buffers: Vec<Vec<u8>>,
}

pub fn encode_reference(id: &WidgetId) -> String {
    format!("{}{}", MODEL_REF_PREFIX, id)
}

pub fn decode_reference(text: &str) -> Option<WidgetId> {
    text.strip_prefix(MODEL_REF_PREFIX)
        .filter(|id| !id.is_empty())
        .map(WidgetId::from)
}

pub fn serialize_state<'a>(
    attributes: impl IntoIterator<Item = (&'a AttributeSpec, &'a Value)>,
) -> SerializedState {
    let mut out = SerializedState::default();
    for (spec, value) in attributes {
        let mut path = vec![PathSegment::Key(spec.name.to_string())];
        if let Value::Bytes(bytes) = value {
            out.buffer_paths.push(path);
            out.buffers.push(bytes.clone());
            continue;
        }
        let encoded = encode_value(value, &mut path, &mut out);
        out.state.insert(spec.name.to_string(), encoded);
    }
    out
}

fn encode_value(value: &Value, path: &mut BufferPath, out: &mut SerializedState) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Str(s) => JsonValue::String(s.clone()),
        Value::Bytes(bytes) => {
            out.buffer_paths.push(path.clone());
            out.buffers.push(bytes.clone());
            JsonValue::Null
        }
        Value::Tuple(items) => JsonValue::Array(
            items
                .iter()
                .enumerate()
                .map(|(index, item)| {
                    path.push(PathSegment::Index(index));
                    let encoded = encode_value(item, path, out);
                    path.pop();
                    encoded
                })
                .collect(),
        ),
        Value::Widget(id) => JsonValue::String(encode_reference(id)),
        Value::Json(json) => json.clone(),
    }
}

/// Decodes an inbound state map against `schema`. Attributes the schema does
/// not know are skipped; references must resolve to live widgets in `lookup`.
pub fn deserialize_state(
    schema: &Schema,
    state: &JsonState,
    buffer_paths: &[BufferPath],
    buffers: &[Vec<u8>],
    lookup: &dyn WidgetLookup,
) -> Result<Vec<(&'static str, Value)>, WireError> {
    if buffer_paths.len() != buffers.len() {
        return Err(WireError::BufferCountMismatch {
            paths: buffer_paths.len(),
            buffers: buffers.len(),
        });
    }

    let mut decoded: Vec<(&'static str, Value)> = Vec::new();
    for (name, json) in state {
        let Some(spec) = schema.attribute(name) else {
            warn!(
                "Ignoring unknown attribute `{}` in state for {}",
                name,
                schema.type_key()
            );
            continue;
        };
        decoded.push((spec.name, decode_value(spec, json, lookup)?));
    }

    for (path, buffer) in buffer_paths.iter().zip(buffers) {
        let invalid = || WireError::InvalidBufferPath {
            path: format!("{:?}", path),
        };
        let Some((PathSegment::Key(name), rest)) = path.split_first() else {
            return Err(invalid());
        };
        let Some(spec) = schema.attribute(name) else {
            warn!(
                "Ignoring buffer for unknown attribute `{}` of {}",
                name,
                schema.type_key()
            );
            continue;
        };
        let buffer = Value::Bytes(buffer.clone());
        match decoded.iter().position(|(decoded_name, _)| *decoded_name == spec.name) {
            Some(index) => {
                if !decoded[index].1.set_path(rest, buffer) {
                    return Err(invalid());
                }
            }
            None if rest.is_empty() => decoded.push((spec.name, buffer)),
            None => return Err(invalid()),
        }
    }

    Ok(decoded)
}

fn decode_value(spec: &AttributeSpec, json: &JsonValue, lookup: &dyn WidgetLookup) -> Result<Value, WireError> {
    let malformed = |reason: &str| WireError::Malformed {
        attribute: spec.name.to_string(),
        reason: reason.to_string(),
    };

    match (spec.kind, json) {
        (_, JsonValue::Null) => Ok(Value::Null),
        (AttributeKind::WidgetRef, JsonValue::String(text)) => resolve(spec, text, lookup),
        (AttributeKind::WidgetRef, _) => Err(malformed("expected a widget reference")),
        (AttributeKind::WidgetRefs, JsonValue::Array(items)) => items
            .iter()
            .map(|item| match item {
                JsonValue::String(text) => resolve(spec, text, lookup),
                _ => Err(malformed("expected a list of widget references")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Tuple),
        (AttributeKind::WidgetRefs, _) => Err(malformed("expected a list of widget references")),
        (AttributeKind::Endpoint, JsonValue::Array(items)) => match items.as_slice() {
            [JsonValue::String(reference), JsonValue::String(attribute)] => Ok(Value::Tuple(vec![
                resolve(spec, reference, lookup)?,
                Value::Str(attribute.clone()),
            ])),
            _ => Err(malformed("expected a [reference, attribute] pair")),
        },
        (AttributeKind::Endpoint, _) => Err(malformed("expected a [reference, attribute] pair")),
        (_, json) => Ok(plain_value(json)),
    }
}

fn resolve(spec: &AttributeSpec, text: &str, lookup: &dyn WidgetLookup) -> Result<Value, WireError> {
    let id = decode_reference(text).ok_or_else(|| WireError::Malformed {
        attribute: spec.name.to_string(),
        reason: format!("`{}` is not a widget reference", text),
    })?;
    if !lookup.is_live(&id) {
        return Err(WireError::UnresolvedReference { widget: id });
    }
    Ok(Value::Widget(id))
}

/// Structural JSON to value conversion, for attributes that hold no references
pub fn plain_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        JsonValue::String(s) => Value::Str(s.clone()),
        JsonValue::Array(items) => Value::Tuple(items.iter().map(plain_value).collect()),
        JsonValue::Object(_) => Value::Json(json.clone()),
    }
}
