//! Reconciliation for `{lower, upper, min, max, value = (lower, upper)}`
//! widgets.
//!
//! `lower` and `upper` are published in whichever order keeps
//! `lower <= upper` true after each step. If the new `upper` is below the old
//! `lower`, `lower` goes first; otherwise `upper` goes first. One of the two
//! orders is always safe: when the new upper is below the old lower we have
//! `new_lower <= new_upper < old_lower <= old_upper`, so moving `lower` first
//! yields `(new_lower, old_upper)` which is ordered. In every other case
//! `new_upper >= old_lower`, so moving `upper` first yields
//! `(old_lower, new_upper)` which is ordered too.

use crate::{
    engine::{
        bounded::{bounds_error, clamp, read, read_limit, Bound},
        error::ValidationError,
        PendingWrite,
    },
    schema::InitState,
    AttributeStore, Value,
};

fn read_pair<N: Bound>(value: &Value, attribute: &'static str) -> Result<(N, N), ValidationError> {
    let Some((a, b)) = value.as_pair() else {
        return Err(ValidationError::InvalidValue {
            attribute,
            reason: format!("expected a pair, got {}", value.type_name()),
        });
    };
    Ok((read(a, attribute)?, read(b, attribute)?))
}

fn ordered<N: Bound>((a, b): (N, N)) -> (N, N) {
    if a > b {
        (b, a)
    } else {
        (a, b)
    }
}

fn pair_value<N: Bound>(lower: N, upper: N) -> Value {
    Value::Tuple(vec![lower.into_value(), upper.into_value()])
}

/// Reconciler for bounded interval widgets
pub fn reconcile_interval<N: Bound>(
    store: &AttributeStore,
    pending: &PendingWrite,
) -> Result<Vec<(&'static str, Value)>, ValidationError> {
    let value_written = pending.contains("value");
    let lower_written = pending.contains("lower");
    let upper_written = pending.contains("upper");
    if value_written && (lower_written || upper_written) {
        return Err(ValidationError::Configuration {
            reason: "`value` cannot be set together with `lower` or `upper`".to_string(),
        });
    }

    let min: N = read_limit(pending.effective(store, "min"), "min")?;
    let max: N = read_limit(pending.effective(store, "max"), "max")?;
    if min > max {
        let culprit = if pending.contains("min") { "min" } else { "max" };
        return Err(bounds_error(culprit, min, max));
    }

    let old_lower: N = read(store.value("lower"), "lower")?;
    let old_upper: N = read(store.value("upper"), "upper")?;

    let (lower, upper) = if value_written {
        ordered(read_pair(pending.effective(store, "value"), "value")?)
    } else if lower_written && upper_written {
        ordered((
            read(pending.effective(store, "lower"), "lower")?,
            read(pending.effective(store, "upper"), "upper")?,
        ))
    } else if lower_written {
        let lower: N = read(pending.effective(store, "lower"), "lower")?;
        if lower > old_upper {
            return Err(ValidationError::InvalidBounds {
                attribute: "lower",
                reason: format!("lower ({:?}) must not exceed upper ({:?})", lower, old_upper),
            });
        }
        (lower, old_upper)
    } else if upper_written {
        let upper: N = read(pending.effective(store, "upper"), "upper")?;
        if upper < old_lower {
            return Err(ValidationError::InvalidBounds {
                attribute: "upper",
                reason: format!("upper ({:?}) must not be below lower ({:?})", upper, old_lower),
            });
        }
        (old_lower, upper)
    } else {
        (old_lower, old_upper)
    };

    let lower = clamp(lower, min, max);
    let upper = clamp(upper, min, max);

    let mut published = if upper < old_lower {
        vec![("lower", lower.into_value()), ("upper", upper.into_value())]
    } else {
        vec![("upper", upper.into_value()), ("lower", lower.into_value())]
    };
    published.push(("value", pair_value(lower, upper)));
    if pending.contains("min") {
        published.push(("min", min.into_value()));
    }
    if pending.contains("max") {
        published.push(("max", max.into_value()));
    }
    published.extend(pending.others(&["lower", "upper", "value", "min", "max"]));
    Ok(published)
}

/// Construction policy for bounded interval widgets. Without an explicit
/// value the interval covers the middle half of `[min, max]`.
pub fn init_interval<N: Bound>(init: &mut InitState) -> Result<(), ValidationError> {
    let value_explicit = init.is_explicit("value");
    let lower_explicit = init.is_explicit("lower");
    let upper_explicit = init.is_explicit("upper");
    if value_explicit && (lower_explicit || upper_explicit) {
        return Err(ValidationError::Configuration {
            reason: "`value` cannot be given together with `lower` or `upper`".to_string(),
        });
    }
    if lower_explicit != upper_explicit {
        return Err(ValidationError::Configuration {
            reason: "`lower` and `upper` must be given together".to_string(),
        });
    }

    let min: N = read_limit(init.get("min").unwrap_or(&Value::Null), "min")?;
    let max: N = read_limit(init.get("max").unwrap_or(&Value::Null), "max")?;
    if min > max {
        return Err(bounds_error("min", min, max));
    }

    let (lower, upper) = if value_explicit {
        ordered(read_pair(init.get("value").unwrap_or(&Value::Null), "value")?)
    } else if lower_explicit {
        ordered((
            read(init.get("lower").unwrap_or(&Value::Null), "lower")?,
            read(init.get("upper").unwrap_or(&Value::Null), "upper")?,
        ))
    } else {
        (N::blend(min, 0.75, max, 0.25), N::blend(min, 0.25, max, 0.75))
    };

    let lower = clamp(lower, min, max);
    let upper = clamp(upper, min, max);
    init.set("lower", lower.into_value());
    init.set("upper", upper.into_value());
    init.set("value", pair_value(lower, upper));
    Ok(())
}
