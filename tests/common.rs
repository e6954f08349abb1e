//! Common test utilities for building definition registries, sessions and
//! graph fixtures.
use patchbay::prelude::*;
use std::sync::{Arc, Mutex};

/// Builds the small definition catalogue the tests wire against.
///
/// - `textNode`: one STRING output.
/// - `intNode`: one INTEGER output.
/// - `promptNode`: multi STRING input `segments`, STRING output `prompt`.
/// - `llmNode`: single STRING input `prompt`, enum-tagged `model` input,
///   STRING output `completion`.
/// - `anyNode`: CONVERTIBLE_ANY placeholder input `in_0` and output `out_0`.
/// - `vecNode`: ARRAY output tagged with the `vector` category.
#[allow(dead_code)]
pub fn build_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register(
        NodeDefinition::new("textNode").with_output(SlotInfo::concrete("out", DataType::String)),
    );
    registry.register(
        NodeDefinition::new("intNode").with_output(SlotInfo::concrete("out", DataType::Integer)),
    );
    registry.register(
        NodeDefinition::new("promptNode")
            .with_input(SlotInfo::concrete("segments", DataType::String).with_multi(true))
            .with_output(SlotInfo::concrete("prompt", DataType::String)),
    );
    registry.register(
        NodeDefinition::new("llmNode")
            .with_input(SlotInfo::concrete("prompt", DataType::String))
            .with_input(
                SlotInfo::concrete("model", DataType::String).with_category("enum-option"),
            )
            .with_output(SlotInfo::concrete("completion", DataType::String)),
    );
    registry.register(
        NodeDefinition::new("anyNode")
            .with_input(SlotInfo::placeholder("in_0"))
            .with_output(SlotInfo::placeholder("out_0")),
    );
    registry.register(
        NodeDefinition::new("vecNode")
            .with_output(SlotInfo::concrete("out", DataType::Array).with_category("vector")),
    );
    registry
}

/// A headless session over the shared test registry.
#[allow(dead_code)]
pub fn build_session() -> GraphSession {
    GraphSession::new("test-tab", Arc::new(build_registry()), Box::new(NullView))
}

/// Everything the recording view observed, for assertions.
#[derive(Debug, Default)]
#[allow(dead_code)]
pub struct ViewLog {
    pub node_syncs: usize,
    pub edge_syncs: usize,
    pub viewport_syncs: usize,
    pub internals: Vec<Vec<NodeId>>,
    pub last_nodes: Vec<NodeId>,
    pub last_edges: Vec<EdgeId>,
}

/// View adapter that records every call for later inspection.
#[allow(dead_code)]
pub struct RecordingView {
    pub log: Arc<Mutex<ViewLog>>,
}

#[allow(dead_code)]
impl RecordingView {
    pub fn new() -> (Self, Arc<Mutex<ViewLog>>) {
        let log = Arc::new(Mutex::new(ViewLog::default()));
        (
            Self {
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl ViewSync for RecordingView {
    fn set_nodes(&mut self, nodes: &[Node]) {
        let mut log = self.log.lock().unwrap();
        log.node_syncs += 1;
        log.last_nodes = nodes.iter().map(|n| n.id.clone()).collect();
    }

    fn set_edges(&mut self, edges: &[Edge]) {
        let mut log = self.log.lock().unwrap();
        log.edge_syncs += 1;
        log.last_edges = edges.iter().map(|e| e.id.clone()).collect();
    }

    fn set_viewport(&mut self, _viewport: &Viewport) {
        self.log.lock().unwrap().viewport_syncs += 1;
    }

    fn update_node_internals(&mut self, node_ids: &[NodeId]) {
        self.log.lock().unwrap().internals.push(node_ids.to_vec());
    }
}

/// Adds a node of the given type at the origin, panicking on failure so
/// fixtures stay terse.
#[allow(dead_code)]
pub fn add(session: &mut GraphSession, node_type: &str) -> NodeId {
    session
        .add_node(node_type, Position::default())
        .unwrap_or_else(|| panic!("failed to add node of type '{}'", node_type))
}

/// Connects two endpoints, panicking on rejection.
#[allow(dead_code)]
pub fn wire(
    session: &mut GraphSession,
    source: (&str, &str),
    target: (&str, &str),
) -> EdgeId {
    session
        .connect(
            Endpoint::new(source.0, source.1),
            Endpoint::new(target.0, target.1),
        )
        .unwrap_or_else(|| {
            panic!(
                "failed to connect {}.{} -> {}.{}",
                source.0, source.1, target.0, target.1
            )
        })
}

/// The ordered edge-id list for a multi-input slot.
#[allow(dead_code)]
pub fn order_of(session: &GraphSession, node_id: &str, slot_key: &str) -> Vec<EdgeId> {
    session
        .snapshot()
        .node(node_id)
        .and_then(|n| n.input_orders.get(slot_key))
        .cloned()
        .unwrap_or_default()
}

/// The target handles of the given edges, in edge-list order.
#[allow(dead_code)]
pub fn target_handle(session: &GraphSession, edge_id: &str) -> String {
    session
        .snapshot()
        .edge(edge_id)
        .map(|e| e.target_handle.clone())
        .unwrap_or_else(|| panic!("edge '{}' missing", edge_id))
}
