use std::sync::Arc;

use diagramkit_core::EventBus;
use diagramkit_designer::{
    CommandHistory, DesignerCommand, DesignerState, Document, Edge, EdgeOverrides, EdgePatch,
    Node, NodeOverrides, NodePatch, RoutingType, ShapeRegistry,
};
use proptest::prelude::*;

fn snapshot(doc: &Document) -> (Vec<Node>, Vec<Edge>) {
    (doc.nodes().cloned().collect(), doc.edges().cloned().collect())
}

#[test]
fn test_redo_branch_is_discarded() {
    let events = Arc::new(EventBus::new());
    let mut doc = Document::new(Arc::new(ShapeRegistry::builtin()), events.clone());
    let mut history = CommandHistory::new(events);

    let first = doc
        .prepare_node("rect", 0.0, 0.0, NodeOverrides::new())
        .unwrap();
    history
        .execute(DesignerCommand::add_node(first.clone()), &mut doc)
        .unwrap();
    assert!(history.undo(&mut doc).unwrap());

    let second = doc
        .prepare_node("circle", 50.0, 50.0, NodeOverrides::new())
        .unwrap();
    history
        .execute(DesignerCommand::add_node(second.clone()), &mut doc)
        .unwrap();

    assert!(!history.can_redo());
    assert!(!history.redo(&mut doc).unwrap());
    assert!(doc.node(&first.id).is_none());
    assert!(doc.node(&second.id).is_some());
}

#[test]
fn test_failed_apply_is_not_recorded() {
    let events = Arc::new(EventBus::new());
    let mut doc = Document::new(Arc::new(ShapeRegistry::builtin()), events.clone());
    let mut history = CommandHistory::new(events);

    let node = doc.create_node("rect", 0.0, 0.0, NodeOverrides::new()).unwrap();
    let mut broken = node.clone();
    broken.width = 0.0;

    assert!(history
        .execute(DesignerCommand::update_node(node.clone(), broken), &mut doc)
        .is_err());
    assert!(!history.can_undo());
    assert_eq!(doc.node(&node.id), Some(&node));
}

#[test]
fn test_depth_limit_drops_oldest() {
    let events = Arc::new(EventBus::new());
    let mut doc = Document::new(Arc::new(ShapeRegistry::builtin()), events.clone());
    let mut history = CommandHistory::with_max_depth(events, 2);

    for i in 0..3 {
        let node = doc
            .prepare_node("rect", i as f64 * 100.0, 0.0, NodeOverrides::new())
            .unwrap();
        history
            .execute(DesignerCommand::add_node(node), &mut doc)
            .unwrap();
    }

    assert_eq!(history.undo_depth(), 2);
    while history.undo(&mut doc).unwrap() {}
    assert_eq!(doc.node_count(), 1);
}

#[derive(Debug, Clone)]
enum Op {
    Create(f64, f64),
    Move(usize, f64, f64),
    Resize(usize, f64, f64),
    Relabel(usize, String),
    Connect(usize, usize),
    Reroute(usize),
    Reverse(usize),
    RemoveNode(usize),
    RemoveEdge(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (-500.0..500.0f64, -500.0..500.0f64).prop_map(|(x, y)| Op::Create(x, y)),
        (0usize..8, -50.0..50.0f64, -50.0..50.0f64).prop_map(|(i, dx, dy)| Op::Move(i, dx, dy)),
        (0usize..8, 1.0..300.0f64, 1.0..300.0f64).prop_map(|(i, w, h)| Op::Resize(i, w, h)),
        (0usize..8, "[a-z]{0,6}").prop_map(|(i, s)| Op::Relabel(i, s)),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Connect(a, b)),
        (0usize..8).prop_map(Op::Reroute),
        (0usize..8).prop_map(Op::Reverse),
        (0usize..8).prop_map(Op::RemoveNode),
        (0usize..8).prop_map(Op::RemoveEdge),
    ]
}

fn run(state: &mut DesignerState, op: Op) {
    let nodes: Vec<_> = state.document().nodes().map(|n| n.id.clone()).collect();
    let edges: Vec<_> = state.document().edges().map(|e| e.id.clone()).collect();
    let node = |i: usize| nodes.get(i % nodes.len().max(1)).cloned();
    let edge = |i: usize| edges.get(i % edges.len().max(1)).cloned();

    // Rejections are fine; they must simply leave no trace.
    let _ = match op {
        Op::Create(x, y) => state
            .create_node("process", x, y, NodeOverrides::new())
            .map(|_| ()),
        Op::Move(i, dx, dy) => match node(i) {
            Some(id) => state.move_nodes(&[id], dx, dy),
            None => Ok(()),
        },
        Op::Resize(i, w, h) => match node(i) {
            Some(id) => state.update_node(&id, &NodePatch::size(w, h)).map(|_| ()),
            None => Ok(()),
        },
        Op::Relabel(i, label) => match node(i) {
            Some(id) => state.update_node(&id, &NodePatch::label(label)).map(|_| ()),
            None => Ok(()),
        },
        Op::Connect(a, b) => match (node(a), node(b)) {
            (Some(a), Some(b)) => state
                .connect(&a, &b, EdgeOverrides::new().with_ports(Some("bottom"), Some("top")))
                .map(|_| ()),
            _ => Ok(()),
        },
        Op::Reroute(i) => match edge(i) {
            Some(id) => state
                .update_edge(&id, &EdgePatch::routing(RoutingType::Orthogonal))
                .map(|_| ()),
            None => Ok(()),
        },
        Op::Reverse(i) => match edge(i) {
            Some(id) => state.reverse_edge(&id).map(|_| ()),
            None => Ok(()),
        },
        Op::RemoveNode(i) => match node(i) {
            Some(id) => state.remove_node(&id).map(|_| ()),
            None => Ok(()),
        },
        Op::RemoveEdge(i) => match edge(i) {
            Some(id) => state.remove_edge(&id).map(|_| ()),
            None => Ok(()),
        },
    };
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_undo_redo_inverse_law(ops in prop::collection::vec(op(), 1..25)) {
        let mut state =
            DesignerState::new(Arc::new(ShapeRegistry::builtin()), Arc::new(EventBus::new()));
        for i in 0..3 {
            state
                .create_node("rect", i as f64 * 200.0, 0.0, NodeOverrides::new())
                .unwrap();
        }
        let base_depth = state.history().undo_depth();
        let before = snapshot(state.document());

        for op in ops {
            run(&mut state, op);
        }
        let after = snapshot(state.document());
        let k = state.history().undo_depth() - base_depth;

        for _ in 0..k {
            prop_assert!(state.undo().unwrap());
        }
        prop_assert_eq!(snapshot(state.document()), before);

        for _ in 0..k {
            prop_assert!(state.redo().unwrap());
        }
        prop_assert_eq!(snapshot(state.document()), after);
    }
}
