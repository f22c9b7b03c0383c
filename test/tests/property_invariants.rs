//! Property-based tests: bounded widgets keep their invariants under any
//! sequence of writes, accepted or rejected.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;

use tether_server::{models, AttributeChange};
use tether_shared::{Listener, Value};
use tether_test::{no_args, Session};

#[derive(Clone, Debug)]
enum ScalarWrite {
    Value(i64),
    Min(i64),
    Max(i64),
    All(i64, i64, i64),
}

#[derive(Clone, Debug)]
enum IntervalWrite {
    Value(i64, i64),
    Lower(i64),
    Upper(i64),
    LowerUpper(i64, i64),
    Min(i64),
    Max(i64),
}

#[derive(Clone, Debug)]
enum FloatIntervalWrite {
    Value(f64, f64),
    Min(f64),
    Max(f64),
}

fn bound() -> impl Strategy<Value = i64> {
    -150i64..250i64
}

fn float_bound() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -150.0f64..250.0f64,
        1 => Just(f64::INFINITY),
        1 => Just(f64::NEG_INFINITY),
    ]
}

fn float_interval_write_strategy() -> impl Strategy<Value = FloatIntervalWrite> {
    prop_oneof![
        (float_bound(), float_bound()).prop_map(|(a, b)| FloatIntervalWrite::Value(a, b)),
        float_bound().prop_map(FloatIntervalWrite::Min),
        float_bound().prop_map(FloatIntervalWrite::Max),
    ]
}

fn scalar_write_strategy() -> impl Strategy<Value = ScalarWrite> {
    prop_oneof![
        bound().prop_map(ScalarWrite::Value),
        bound().prop_map(ScalarWrite::Min),
        bound().prop_map(ScalarWrite::Max),
        (bound(), bound(), bound()).prop_map(|(v, lo, hi)| ScalarWrite::All(v, lo, hi)),
    ]
}

fn interval_write_strategy() -> impl Strategy<Value = IntervalWrite> {
    prop_oneof![
        (bound(), bound()).prop_map(|(a, b)| IntervalWrite::Value(a, b)),
        bound().prop_map(IntervalWrite::Lower),
        bound().prop_map(IntervalWrite::Upper),
        (bound(), bound()).prop_map(|(a, b)| IntervalWrite::LowerUpper(a, b)),
        bound().prop_map(IntervalWrite::Min),
        bound().prop_map(IntervalWrite::Max),
    ]
}

fn scalar_writes(write: &ScalarWrite) -> Vec<(&'static str, Value)> {
    match *write {
        ScalarWrite::Value(v) => vec![("value", Value::Int(v))],
        ScalarWrite::Min(v) => vec![("min", Value::Int(v))],
        ScalarWrite::Max(v) => vec![("max", Value::Int(v))],
        ScalarWrite::All(v, lo, hi) => vec![
            ("value", Value::Int(v)),
            ("min", Value::Int(lo)),
            ("max", Value::Int(hi)),
        ],
    }
}

fn interval_writes(write: &IntervalWrite) -> Vec<(&'static str, Value)> {
    match *write {
        IntervalWrite::Value(a, b) => vec![("value", Value::from((a, b)))],
        IntervalWrite::Lower(v) => vec![("lower", Value::Int(v))],
        IntervalWrite::Upper(v) => vec![("upper", Value::Int(v))],
        IntervalWrite::LowerUpper(a, b) => {
            vec![("lower", Value::Int(a)), ("upper", Value::Int(b))]
        }
        IntervalWrite::Min(v) => vec![("min", Value::Int(v))],
        IntervalWrite::Max(v) => vec![("max", Value::Int(v))],
    }
}

fn float_interval_writes(write: &FloatIntervalWrite) -> Vec<(&'static str, Value)> {
    match *write {
        FloatIntervalWrite::Value(a, b) => vec![("value", Value::from((a, b)))],
        FloatIntervalWrite::Min(v) => vec![("min", Value::Float(v))],
        FloatIntervalWrite::Max(v) => vec![("max", Value::Float(v))],
    }
}

fn float_interval_violation(lookup: impl Fn(&str) -> Value) -> Option<String> {
    let float = |name: &str| lookup(name).as_f64().unwrap();
    let (min, lower, upper, max) = (float("min"), float("lower"), float("upper"), float("max"));
    if [min, lower, upper, max].iter().any(|f| !f.is_finite()) {
        return Some(format!("non-finite in {} {} {} {}", min, lower, upper, max));
    }
    if !(min <= lower && lower <= upper && upper <= max) {
        return Some(format!("{} <= {} <= {} <= {} violated", min, lower, upper, max));
    }
    if lookup("value") != Value::from((lower, upper)) {
        return Some(format!("value {:?} != ({}, {})", lookup("value"), lower, upper));
    }
    None
}

fn interval_violation(lookup: impl Fn(&str) -> Value) -> Option<String> {
    let int = |name: &str| lookup(name).as_i64().unwrap();
    let (min, lower, upper, max) = (int("min"), int("lower"), int("upper"), int("max"));
    let value = lookup("value");
    if !(min <= lower && lower <= upper && upper <= max) {
        return Some(format!("{} <= {} <= {} <= {} violated", min, lower, upper, max));
    }
    if value != Value::from((lower, upper)) {
        return Some(format!("value {:?} != ({}, {})", value, lower, upper));
    }
    None
}

proptest! {
    /// min <= value <= max after every write to a bounded scalar
    #[test]
    fn prop_scalar_stays_within_bounds(
        writes in prop::collection::vec(scalar_write_strategy(), 1..24)
    ) {
        let mut session = Session::new();
        let slider = session.create(models::INT_SLIDER, no_args()).unwrap();

        for write in &writes {
            let _ = session.manager.set_many(&slider, scalar_writes(write));
            let int = |name: &str| session.get(&slider, name).as_i64().unwrap();
            let (min, value, max) = (int("min"), int("value"), int("max"));
            prop_assert!(min <= value && value <= max, "after {:?}: {} <= {} <= {}", write, min, value, max);
        }
    }

    /// min <= lower <= upper <= max and value == (lower, upper) after every
    /// write, also as seen from inside observers during the write
    #[test]
    fn prop_interval_stays_ordered(
        writes in prop::collection::vec(interval_write_strategy(), 1..24)
    ) {
        let mut session = Session::new();
        let range = session.create(models::INT_RANGE_SLIDER, no_args()).unwrap();

        let violations = Arc::new(Mutex::new(Vec::new()));
        let sink = violations.clone();
        let listener = Listener::infallible(move |change: &AttributeChange| {
            let store = change.store.clone();
            if let Some(violation) = interval_violation(|name| store.value(name).clone()) {
                sink.lock().unwrap().push(violation);
            }
        });
        session.manager.observe(&range, None, &listener, false).unwrap();

        for write in &writes {
            let _ = session.manager.set_many(&range, interval_writes(write));
            let violation = interval_violation(|name| session.get(&range, name));
            prop_assert!(violation.is_none(), "after {:?}: {:?}", write, violation);
        }
        let seen = violations.lock().unwrap();
        prop_assert!(seen.is_empty(), "observed inside listeners: {:?}", *seen);
    }

    /// Rejected writes leave the widget exactly as it was
    #[test]
    fn prop_rejected_writes_change_nothing(
        writes in prop::collection::vec(interval_write_strategy(), 1..16)
    ) {
        let mut session = Session::new();
        let range = session.create(models::INT_RANGE_SLIDER, no_args()).unwrap();

        for write in &writes {
            let before = session.manager.widget(&range).unwrap().store();
            if session.manager.set_many(&range, interval_writes(write)).is_err() {
                let after = session.manager.widget(&range).unwrap().store();
                for name in ["value", "lower", "upper", "min", "max"] {
                    prop_assert_eq!(before.value(name), after.value(name));
                }
            }
        }
    }

    /// Float intervals stay finite and ordered, whatever bounds they are
    /// built with or later given
    #[test]
    fn prop_float_interval_stays_finite_and_ordered(
        min in float_bound(),
        max in float_bound(),
        writes in prop::collection::vec(float_interval_write_strategy(), 0..16)
    ) {
        let mut session = Session::new();
        let args = vec![("min", Value::Float(min)), ("max", Value::Float(max))];
        let range = match session.create(models::FLOAT_RANGE_SLIDER, args) {
            Ok(range) => range,
            Err(_) => {
                prop_assert!(!min.is_finite() || !max.is_finite() || min > max);
                return Ok(());
            }
        };
        let violation = float_interval_violation(|name| session.get(&range, name));
        prop_assert!(violation.is_none(), "after construction: {:?}", violation);

        for write in &writes {
            let _ = session.manager.set_many(&range, float_interval_writes(write));
            let violation = float_interval_violation(|name| session.get(&range, name));
            prop_assert!(violation.is_none(), "after {:?}: {:?}", write, violation);
        }
    }
}
