use std::sync::{Arc, Mutex};

use diagramkit_core::{
    DiagramEvent, EventBus, EventCategory, EventFilter, HistoryEvent, NodeEvent,
};
use diagramkit_designer::{DesignerState, EdgeOverrides, NodeOverrides, ShapeRegistry};

fn state_with(events: Arc<EventBus>) -> DesignerState {
    DesignerState::new(Arc::new(ShapeRegistry::builtin()), events)
}

#[test]
fn test_entity_events_precede_derived_events() {
    let events = EventBus::recording();
    let mut state = state_with(events.clone());
    let a = state
        .create_node("rect", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    let b = state
        .create_node("rect", 200.0, 0.0, NodeOverrides::new())
        .unwrap();
    state.connect(&a.id, &b.id, EdgeOverrides::new()).unwrap();
    state.select_node(&a.id, false).unwrap();
    events.clear_history();

    state.remove_selected().unwrap();
    assert_eq!(
        events.history_names(),
        vec![
            "edge:removed",
            "node:removed",
            "selection:changed",
            "history:changed"
        ]
    );
}

/// Three nodes a -> b -> c, with node `a` and edge `b -> c` selected.
fn chain_with_mixed_selection(events: Arc<EventBus>) -> DesignerState {
    let mut state = state_with(events.clone());
    let a = state
        .create_node("rect", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    let b = state
        .create_node("rect", 200.0, 0.0, NodeOverrides::new())
        .unwrap();
    let c = state
        .create_node("rect", 400.0, 0.0, NodeOverrides::new())
        .unwrap();
    state.connect(&a.id, &b.id, EdgeOverrides::new()).unwrap();
    let bc = state.connect(&b.id, &c.id, EdgeOverrides::new()).unwrap();
    state.select_node(&a.id, false).unwrap();
    state.select_edge(&bc.id, true).unwrap();
    events.clear_history();
    state
}

#[test]
fn test_mixed_delete_announces_selection_once() {
    let events = EventBus::recording();
    let mut state = chain_with_mixed_selection(events.clone());

    assert!(state.remove_selected().unwrap());
    assert_eq!(
        events.history_names(),
        vec![
            "edge:removed",
            "edge:removed",
            "node:removed",
            "selection:changed",
            "history:changed"
        ]
    );
    assert!(state.document().selection().is_empty());
}

#[test]
fn test_mixed_cut_announces_selection_once() {
    let events = EventBus::recording();
    let mut state = chain_with_mixed_selection(events.clone());

    assert!(state.cut().unwrap());
    let names = events.history_names();
    assert_eq!(
        names.iter().filter(|n| **n == "selection:changed").count(),
        1
    );
    assert_eq!(&names[names.len() - 2..], ["selection:changed", "history:changed"]);
}

#[test]
fn test_history_event_reports_availability() {
    let events = Arc::new(EventBus::new());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    events.subscribe(
        EventFilter::Categories(vec![EventCategory::History]),
        move |event| {
            if let DiagramEvent::History(HistoryEvent::Changed { can_undo, can_redo }) = event {
                sink.lock().unwrap().push((can_undo, can_redo));
            }
        },
    );

    let mut state = state_with(events);
    state
        .create_node("rect", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    state.undo().unwrap();
    state.redo().unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(true, false), (false, true), (true, false)]
    );
}

#[tokio::test]
async fn test_async_receiver_sees_node_creation() {
    let events = Arc::new(EventBus::new());
    let mut receiver = events.receiver();
    let mut state = state_with(events);

    let node = state
        .create_node("circle", 10.0, 10.0, NodeOverrides::new())
        .unwrap();

    match receiver.recv().await.unwrap() {
        DiagramEvent::Node(NodeEvent::Created { id }) => assert_eq!(id, node.id),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(receiver.recv().await.unwrap().name(), "history:changed");
}
