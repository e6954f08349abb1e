//! Group interface synchronization.
//!
//! Boundary pseudo-nodes do not own their ports: a graph-input node's
//! outputs and a graph-output node's inputs are projections of the
//! workflow-level interface maps. When a dynamic slot on a boundary node is
//! converted, the interface entry is rewritten and a fresh placeholder is
//! allocated in the same map, all inside the enclosing transaction; the
//! boundary nodes are then re-projected from the interface.

use crate::error::GraphError;
use crate::graph::{
    GRAPH_INPUT_NODE, GRAPH_OUTPUT_NODE, GraphSnapshot, InputSlotState, Node, NodeId,
    OutputSlotState, WorkflowData,
};
use crate::slot::{SlotDirection, SlotInfo, SlotKey, successor_key};
use ahash::AHashMap;

/// Rewrites the interface entry for `key` from `peer` and allocates the
/// next `input_<N>`/`output_<N>` CONVERTIBLE_ANY placeholder in the same
/// map.
///
/// `direction` is the workflow-facing side: `Input` addresses
/// `interface_inputs` (exposed by graph-input nodes), `Output` addresses
/// `interface_outputs`. The converted entry keeps `allow_dynamic_type` as
/// declared; placeholder status is carried by the data type alone.
pub fn convert_interface_slot(
    workflow: &mut WorkflowData,
    direction: SlotDirection,
    key: &str,
    peer: &SlotInfo,
) -> Result<(), GraphError> {
    let map = interface_map_mut(workflow, direction);
    let entry = map
        .get_mut(key)
        .ok_or_else(|| GraphError::InterfaceSlotNotFound(key.to_string()))?;
    entry.adopt(peer);

    allocate_placeholder(map, direction, Some(key));
    Ok(())
}

/// Establishes the invariant that each interface map holds exactly one
/// unconsumed CONVERTIBLE_ANY placeholder. Called at session load and after
/// interface edits coming from outside the connection path.
pub fn ensure_placeholder(workflow: &mut WorkflowData) {
    for direction in [SlotDirection::Input, SlotDirection::Output] {
        let map = interface_map_mut(workflow, direction);
        if !map.values().any(|slot| slot.is_placeholder()) {
            allocate_placeholder(map, direction, None);
        }
    }
}

fn interface_map_mut(
    workflow: &mut WorkflowData,
    direction: SlotDirection,
) -> &mut AHashMap<SlotKey, SlotInfo> {
    match direction {
        SlotDirection::Input => &mut workflow.interface_inputs,
        SlotDirection::Output => &mut workflow.interface_outputs,
    }
}

fn allocate_placeholder(
    map: &mut AHashMap<SlotKey, SlotInfo>,
    direction: SlotDirection,
    consumed: Option<&str>,
) {
    let series = match direction {
        SlotDirection::Input => "input_0",
        SlotDirection::Output => "output_0",
    };
    let key = successor_key(map.keys(), consumed.unwrap_or(series));
    map.insert(key.clone(), SlotInfo::placeholder(key));
}

/// Re-projects every boundary pseudo-node's slot map from the workflow
/// interface, returning the ids of the nodes that were refreshed.
///
/// Existing literal values and order lists on graph-output inputs are
/// carried over by key, so re-projection never drops connection state.
pub fn sync_boundary_nodes(snapshot: &mut GraphSnapshot) -> Vec<NodeId> {
    let workflow = snapshot.workflow.clone();
    let mut touched = Vec::new();
    for node in &mut snapshot.nodes {
        match node.node_type.as_str() {
            GRAPH_INPUT_NODE => {
                project_outputs(node, &workflow.interface_inputs);
                touched.push(node.id.clone());
            }
            GRAPH_OUTPUT_NODE => {
                project_inputs(node, &workflow.interface_outputs);
                touched.push(node.id.clone());
            }
            _ => {}
        }
    }
    touched
}

fn project_outputs(node: &mut Node, interface: &AHashMap<SlotKey, SlotInfo>) {
    node.outputs = interface
        .iter()
        .map(|(key, slot)| (key.clone(), OutputSlotState::new(slot.clone())))
        .collect();
}

fn project_inputs(node: &mut Node, interface: &AHashMap<SlotKey, SlotInfo>) {
    let mut previous = std::mem::take(&mut node.inputs);
    node.inputs = interface
        .iter()
        .map(|(key, slot)| {
            let values = previous
                .remove(key)
                .map(|state| state.values)
                .unwrap_or_default();
            (
                key.clone(),
                InputSlotState {
                    slot: slot.clone(),
                    values,
                },
            )
        })
        .collect();
}
