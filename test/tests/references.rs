use serde_json::json;

use tether_server::{models, ManagerConfig, WidgetError};
use tether_shared::{
    deserialize_state, encode_reference, serialize_state, AttributeKind, AttributeSpec, Envelope,
    JsonState, Message, PathSegment, Schema, TypeKey, Value, WidgetId, WidgetLookup, WireError,
};
use tether_test::{init_logging, no_args, Session};

const BLOB_MODEL: &str = "BlobModel";

fn blob_type() -> TypeKey {
    TypeKey::new("tether-demo", "0.1.0", BLOB_MODEL)
}

fn blob_schema() -> Schema {
    Schema::builder(blob_type())
        .attribute(AttributeSpec::synced("data", AttributeKind::Bytes, Vec::<u8>::new()))
        .attribute(AttributeSpec::synced("frames", AttributeKind::Any, Value::Tuple(Vec::new())))
        .attribute(AttributeSpec::synced("owner", AttributeKind::WidgetRef, Value::Null).nullable())
        .build()
}

fn blob_session() -> Session {
    Session::with_types(ManagerConfig::default(), vec![blob_schema()])
}

/// Knows exactly one live widget
struct Only(WidgetId);

impl WidgetLookup for Only {
    fn is_live(&self, id: &WidgetId) -> bool {
        *id == self.0
    }

    fn attribute_synced(&self, _: &WidgetId, _: &str) -> Option<bool> {
        None
    }
}

#[test]
fn reference_round_trip_resolves_to_the_same_widget() {
    let schema = blob_schema();
    let owner = WidgetId::new("0f1e2d3c");
    let spec = schema.attribute("owner").unwrap();
    let value = Value::Widget(owner.clone());

    let serialized = serialize_state([(spec, &value)]);
    assert_eq!(
        serialized.state.get("owner"),
        Some(&json!(encode_reference(&owner)))
    );

    let decoded = deserialize_state(
        &schema,
        &serialized.state,
        &serialized.buffer_paths,
        &serialized.buffers,
        &Only(owner.clone()),
    )
    .unwrap();
    assert_eq!(decoded, vec![("owner", Value::Widget(owner.clone()))]);

    let missing = deserialize_state(
        &schema,
        &serialized.state,
        &serialized.buffer_paths,
        &serialized.buffers,
        &Only(WidgetId::new("someone-else")),
    );
    match missing {
        Err(WireError::UnresolvedReference { widget }) => {
            assert_eq!(widget, owner);
        }
        other => panic!("Expected an unresolved reference, got {:?}", other),
    }
}

#[test]
fn container_children_travel_as_references() {
    init_logging();
    let mut session = Session::new();
    let a = session.create(models::INT_SLIDER, no_args()).unwrap();
    let b = session.create(models::BUTTON, no_args()).unwrap();
    let hbox = session
        .create(models::HBOX, [("children", Value::from(vec![a.clone(), b.clone()]))])
        .unwrap();
    session.settle();

    assert_eq!(
        session.peer.value(&hbox, "children"),
        Some(&json!([encode_reference(&a), encode_reference(&b)]))
    );

    session.peer.set(
        &hbox,
        "children",
        json!([encode_reference(&b), encode_reference(&a)]),
    );
    session.settle();
    assert_eq!(session.manager.children(&hbox).unwrap(), vec![b, a]);
}

#[test]
fn peer_reference_to_unknown_widget_is_rejected() {
    init_logging();
    let mut session = Session::new();
    let a = session.create(models::INT_SLIDER, no_args()).unwrap();
    let vbox = session
        .create(models::VBOX, [("children", Value::from(vec![a.clone()]))])
        .unwrap();
    session.settle();

    session.peer.set(&vbox, "children", json!(["IPY_MODEL_ghost"]));
    let errors = session.pump();

    assert_eq!(
        errors,
        vec![WidgetError::Wire(WireError::UnresolvedReference {
            widget: WidgetId::new("ghost")
        })]
    );
    assert_eq!(session.manager.children(&vbox).unwrap(), vec![a]);
}

#[test]
fn closed_children_are_left_out_of_new_containers() {
    init_logging();
    let mut session = Session::new();
    let a = session.create(models::INT_SLIDER, no_args()).unwrap();
    let b = session.create(models::INT_SLIDER, no_args()).unwrap();
    session.manager.close(&a).unwrap();

    let grid = session
        .create(models::GRID_BOX, [("children", Value::from(vec![a, b.clone()]))])
        .unwrap();
    assert_eq!(session.manager.children(&grid).unwrap(), vec![b]);
}

#[test]
fn bytes_travel_as_buffers() {
    init_logging();
    let mut session = blob_session();
    let blob = session
        .manager
        .create(
            &blob_type(),
            [
                ("data", Value::from(vec![1u8, 2, 3])),
                ("frames", Value::Tuple(vec![Value::from(vec![7u8]), Value::Int(1)])),
            ],
        )
        .unwrap();

    let sent = session.transport.drain();
    match &sent[0].message {
        Message::Open {
            state,
            buffer_paths,
            ..
        } => {
            assert!(!state.contains_key("data"));
            assert_eq!(state.get("frames"), Some(&json!([null, 1])));
            assert_eq!(
                buffer_paths,
                &vec![
                    vec![PathSegment::Key("data".to_string())],
                    vec![PathSegment::Key("frames".to_string()), PathSegment::Index(0)],
                ]
            );
        }
        other => panic!("Expected an open message, got {:?}", other),
    }
    assert_eq!(sent[0].buffers, vec![vec![1, 2, 3], vec![7]]);

    for envelope in sent {
        session.peer.receive(envelope);
    }
    assert_eq!(
        session.peer.model(&blob).unwrap().buffers.get("data"),
        Some(&vec![1, 2, 3])
    );

    let mut state = JsonState::new();
    state.insert("frames".to_string(), json!([null, 2]));
    session.peer.send_raw(
        Envelope::new(
            blob.clone(),
            Message::Update {
                state,
                buffer_paths: vec![
                    vec![PathSegment::Key("data".to_string())],
                    vec![PathSegment::Key("frames".to_string()), PathSegment::Index(0)],
                ],
            },
        )
        .with_buffers(vec![vec![9], vec![8, 8]]),
    );
    session.settle();

    assert_eq!(session.get(&blob, "data"), Value::Bytes(vec![9]));
    assert_eq!(
        session.get(&blob, "frames"),
        Value::Tuple(vec![Value::Bytes(vec![8, 8]), Value::Int(2)])
    );
}

#[test]
fn mismatched_buffer_counts_are_wire_errors() {
    init_logging();
    let mut session = blob_session();
    let blob = session
        .manager
        .create(&blob_type(), Vec::<(&str, Value)>::new())
        .unwrap();
    session.settle();

    session.peer.send_raw(
        Envelope::new(
            blob,
            Message::Update {
                state: JsonState::new(),
                buffer_paths: vec![vec![PathSegment::Key("data".to_string())]],
            },
        )
        .with_buffers(Vec::new()),
    );
    let errors = session.pump();
    assert!(matches!(
        errors.as_slice(),
        [WidgetError::Wire(WireError::BufferCountMismatch { paths: 1, buffers: 0 })]
    ));
}

#[test]
fn closing_a_widget_releases_its_references() {
    init_logging();
    let mut session = blob_session();
    let owner = session.create(models::BUTTON, no_args()).unwrap();
    let blob = session
        .manager
        .create(&blob_type(), [("owner", Value::from(&owner))])
        .unwrap();

    session.manager.close(&blob).unwrap();
    assert_eq!(session.get(&blob, "owner"), Value::Null);
    assert!(session.manager.is_open(&owner));
}
