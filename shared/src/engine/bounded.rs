use std::fmt::Debug;

use crate::{
    engine::{error::ValidationError, PendingWrite},
    schema::InitState,
    AttributeStore, Value,
};

/// Numeric type a bounded widget is generic over
pub trait Bound: Copy + PartialOrd + Debug {
    fn from_value(value: &Value) -> Option<Self>;
    fn into_value(self) -> Value;
    /// Weighted sum `a * wa + b * wb`
    fn blend(a: Self, wa: f64, b: Self, wb: f64) -> Self;
    fn is_finite(self) -> bool;
}

impl Bound for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }

    fn blend(a: Self, wa: f64, b: Self, wb: f64) -> Self {
        (a as f64 * wa + b as f64 * wb) as i64
    }

    fn is_finite(self) -> bool {
        true
    }
}

impl Bound for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }

    fn blend(a: Self, wa: f64, b: Self, wb: f64) -> Self {
        a * wa + b * wb
    }

    fn is_finite(self) -> bool {
        f64::is_finite(self)
    }
}

pub(crate) fn read<N: Bound>(value: &Value, attribute: &'static str) -> Result<N, ValidationError> {
    N::from_value(value).ok_or_else(|| ValidationError::InvalidValue {
        attribute,
        reason: format!("expected a number, got {}", value.type_name()),
    })
}

/// Reads `min` or `max`. Infinite limits would blend into NaN defaults.
pub(crate) fn read_limit<N: Bound>(
    value: &Value,
    attribute: &'static str,
) -> Result<N, ValidationError> {
    let limit: N = read(value, attribute)?;
    if !limit.is_finite() {
        return Err(ValidationError::InvalidValue {
            attribute,
            reason: format!("bound must be finite, got {:?}", limit),
        });
    }
    Ok(limit)
}

pub(crate) fn clamp<N: Bound>(value: N, min: N, max: N) -> N {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

pub(crate) fn bounds_error<N: Bound>(attribute: &'static str, min: N, max: N) -> ValidationError {
    ValidationError::InvalidBounds {
        attribute,
        reason: format!("min ({:?}) must not exceed max ({:?})", min, max),
    }
}

/// Reconciler for `{value, min, max}` widgets. Out-of-range values clamp
/// silently; moving a bound past the value drags the value along.
pub fn reconcile_scalar<N: Bound>(
    store: &AttributeStore,
    pending: &PendingWrite,
) -> Result<Vec<(&'static str, Value)>, ValidationError> {
    let min: N = read_limit(pending.effective(store, "min"), "min")?;
    let max: N = read_limit(pending.effective(store, "max"), "max")?;
    if min > max {
        let culprit = if pending.contains("min") { "min" } else { "max" };
        return Err(bounds_error(culprit, min, max));
    }

    let value: N = read(pending.effective(store, "value"), "value")?;

    let mut published = vec![("value", clamp(value, min, max).into_value())];
    if pending.contains("min") {
        published.push(("min", min.into_value()));
    }
    if pending.contains("max") {
        published.push(("max", max.into_value()));
    }
    published.extend(pending.others(&["value", "min", "max"]));
    Ok(published)
}

/// Construction policy for `{value, min, max}` widgets
pub fn init_scalar<N: Bound>(init: &mut InitState) -> Result<(), ValidationError> {
    let min: N = read_limit(init.get("min").unwrap_or(&Value::Null), "min")?;
    let max: N = read_limit(init.get("max").unwrap_or(&Value::Null), "max")?;
    if min > max {
        return Err(bounds_error("min", min, max));
    }
    let value: N = read(init.get("value").unwrap_or(&Value::Null), "value")?;
    init.set("value", clamp(value, min, max).into_value());
    Ok(())
}
