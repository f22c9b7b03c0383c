use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};

use serde_json::json;

use tether_server::{models, AttributeChange, CustomMessage, WidgetError, WidgetEvent};
use tether_shared::{CallbackDispatcher, Listener, Message, Value};
use tether_test::{init_logging, no_args, Session};

fn counter() -> (Arc<AtomicUsize>, Listener<AttributeChange>) {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = count.clone();
    let listener = Listener::infallible(move |_: &AttributeChange| {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    (count, listener)
}

#[test]
fn register_then_remove_leaves_no_listeners() {
    let count = Arc::new(AtomicUsize::new(0));
    let handle = count.clone();
    let listener = Listener::infallible(move |_: &u32| {
        handle.fetch_add(1, Ordering::SeqCst);
    });

    let mut dispatcher = CallbackDispatcher::new();
    dispatcher.register(&listener, false);
    dispatcher.register(&listener, true);

    assert!(dispatcher.is_empty());
    dispatcher.fire(&7).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn removed_observer_is_not_called() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();
    let (count, listener) = counter();

    session.manager.observe(&slider, Some("value"), &listener, false).unwrap();
    session.manager.observe(&slider, Some("value"), &listener, true).unwrap();
    session.manager.set(&slider, "value", 5).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[test]
fn registering_twice_calls_once() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();
    let (count, listener) = counter();

    session.manager.observe(&slider, Some("value"), &listener, false).unwrap();
    session.manager.observe(&slider, Some("value"), &listener.clone(), false).unwrap();
    session.manager.set(&slider, "value", 5).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn observers_fire_only_for_changes() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();
    let (count, listener) = counter();
    session.manager.observe(&slider, None, &listener, false).unwrap();

    session.manager.set(&slider, "value", 0).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 0);

    // value is dragged along with max: two changes
    session.manager.set(&slider, "value", 80).unwrap();
    session.manager.set(&slider, "max", 50).unwrap();
    assert_eq!(count.load(Ordering::SeqCst), 3);
}

#[test]
fn observing_unknown_attribute_fails() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();
    let (_, listener) = counter();
    assert!(matches!(
        session.manager.observe(&slider, Some("nope"), &listener, false),
        Err(WidgetError::Validation(_))
    ));
}

#[test]
fn failing_listener_keeps_the_write_and_the_rest_still_run() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();

    let failing = Listener::new(|_: &AttributeChange| Err("observer exploded".into()));
    let (count, counting) = counter();
    session.manager.observe(&slider, Some("value"), &failing, false).unwrap();
    session.manager.observe(&slider, Some("value"), &counting, false).unwrap();

    let result = session.manager.set(&slider, "value", 12);
    match result {
        Err(WidgetError::Dispatch(error)) => {
            assert_eq!(error.total, 2);
            assert_eq!(error.failures.len(), 1);
            assert_eq!(error.failures[0].message, "observer exploded");
        }
        other => panic!("Expected a dispatch error, got {:?}", other),
    }
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(session.get(&slider, "value"), Value::Int(12));
}

#[test]
fn peer_changes_reach_observers_as_remote() {
    init_logging();
    let mut session = Session::new();
    let text = session.create(models::INT_TEXT, no_args()).unwrap();
    session.settle();

    let origins = Arc::new(Mutex::new(Vec::new()));
    let sink = origins.clone();
    let listener = Listener::infallible(move |change: &AttributeChange| {
        sink.lock().unwrap().push((change.name, change.origin));
    });
    session.manager.observe(&text, None, &listener, false).unwrap();

    session.peer.set(&text, "value", json!(3));
    session.settle();

    assert_eq!(
        *origins.lock().unwrap(),
        vec![("value", tether_server::ChangeOrigin::Remote)]
    );
}

#[test]
fn clicks_reach_click_and_message_listeners() {
    init_logging();
    let mut session = Session::new();
    let button = session.create(models::BUTTON, no_args()).unwrap();
    session.settle();

    let clicks = Arc::new(AtomicUsize::new(0));
    let handle = clicks.clone();
    let on_click = Listener::infallible(move |event: &WidgetEvent| {
        assert_eq!(event.event, "click");
        handle.fetch_add(1, Ordering::SeqCst);
    });
    session.manager.on_click(&button, &on_click, false).unwrap();

    let messages = Arc::new(Mutex::new(Vec::new()));
    let sink = messages.clone();
    let on_msg = Listener::infallible(move |message: &CustomMessage| {
        sink.lock().unwrap().push(message.content.clone());
    });
    session.manager.on_msg(&button, &on_msg, false).unwrap();

    session.peer.click(&button);
    session.settle();
    session.manager.click(&button).unwrap();

    assert_eq!(clicks.load(Ordering::SeqCst), 2);
    assert_eq!(*messages.lock().unwrap(), vec![json!({ "event": "click" })]);
}

#[test]
fn on_click_requires_a_button() {
    init_logging();
    let mut session = Session::new();
    let slider = session.create(models::INT_SLIDER, no_args()).unwrap();
    let listener = Listener::infallible(|_: &WidgetEvent| {});
    assert!(matches!(
        session.manager.on_click(&slider, &listener, false),
        Err(WidgetError::WrongType { .. })
    ));
}

#[test]
fn closing_drops_every_listener() {
    init_logging();
    let mut session = Session::new();
    let button = session.create(models::BUTTON, no_args()).unwrap();
    let clicks = Arc::new(AtomicUsize::new(0));
    let handle = clicks.clone();
    let on_click = Listener::infallible(move |_: &WidgetEvent| {
        handle.fetch_add(1, Ordering::SeqCst);
    });
    session.manager.on_click(&button, &on_click, false).unwrap();

    session.manager.close(&button).unwrap();

    assert!(matches!(
        session.manager.click(&button),
        Err(WidgetError::Closed { .. })
    ));
    assert_eq!(clicks.load(Ordering::SeqCst), 0);
}

#[test]
fn raw_receiver_replaces_default_handling() {
    init_logging();
    let mut session = Session::new();
    let text = session.create(models::INT_TEXT, no_args()).unwrap();
    session.settle();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    session
        .manager
        .on_receive(
            &text,
            Some(Box::new(move |message: &Message, _: &[Vec<u8>]| {
                sink.lock().unwrap().push(message.method());
            })),
        )
        .unwrap();

    session.peer.set(&text, "value", json!(9));
    session.settle();
    assert_eq!(*seen.lock().unwrap(), vec!["update"]);
    assert_eq!(session.get(&text, "value"), Value::Int(0));

    session.manager.on_receive(&text, None).unwrap();
    session.peer.set(&text, "value", json!(10));
    session.settle();
    assert_eq!(session.get(&text, "value"), Value::Int(10));
}
