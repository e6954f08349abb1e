//! Dynamic type propagation for CONVERTIBLE_ANY placeholders.
//!
//! Fires when a connection touches a slot that is still in placeholder
//! state. The placeholder becomes a semantic clone of its concrete peer;
//! where it lives decides who allocates the follow-up placeholder: the
//! workflow interface (boundary nodes), the node's own interface mirror
//! (group references) or nobody beyond the local slot map's successor
//! entry.

use crate::error::GraphError;
use crate::graph::{GraphSnapshot, InputSlotState, NodeId, OutputSlotState, SlotRef};
use crate::interface;
use crate::slot::{SlotDirection, SlotInfo, SlotOrigin, successor_key};

pub(crate) struct PropagationOutcome {
    /// Nodes whose slot maps changed and need their internals refreshed.
    pub touched: Vec<NodeId>,
}

impl PropagationOutcome {
    fn untouched() -> Self {
        Self {
            touched: Vec::new(),
        }
    }
}

/// Applies dynamic type propagation for a connection between two resolved
/// slots.
///
/// No-op unless exactly one side is still a CONVERTIBLE_ANY placeholder and
/// the peer carries a concrete, non-wildcard type; converting an
/// already-concrete slot again is the idempotence check, not an error.
pub(crate) fn propagate(
    snapshot: &mut GraphSnapshot,
    source: &SlotRef,
    target: &SlotRef,
) -> Result<PropagationOutcome, GraphError> {
    let (placeholder, peer) = match (source.info.is_placeholder(), target.info.is_placeholder()) {
        (true, false) => (source, target),
        (false, true) => (target, source),
        // Both placeholders: neither has a concrete type to offer yet.
        // Neither: nothing left to convert.
        _ => return Ok(PropagationOutcome::untouched()),
    };
    if peer.info.data_type.is_behavioral() {
        return Ok(PropagationOutcome::untouched());
    }

    let touched = match placeholder.origin {
        SlotOrigin::WorkflowInterface => {
            // A graph-input node's outputs mirror the workflow's inputs.
            let interface_side = match placeholder.direction {
                SlotDirection::Output => SlotDirection::Input,
                SlotDirection::Input => SlotDirection::Output,
            };
            interface::convert_interface_slot(
                &mut snapshot.workflow,
                interface_side,
                &placeholder.key,
                &peer.info,
            )?;
            interface::sync_boundary_nodes(snapshot)
        }
        SlotOrigin::GroupInterface => {
            convert_group_mirror_slot(snapshot, placeholder, &peer.info)?;
            vec![placeholder.node_id.clone()]
        }
        SlotOrigin::Node => {
            convert_node_slot(snapshot, placeholder, &peer.info)?;
            vec![placeholder.node_id.clone()]
        }
    };

    Ok(PropagationOutcome { touched })
}

/// Converts a slot owned by an ordinary node and synthesizes the successor
/// placeholder in the same slot map (`in_0` consumed -> `in_1` appears).
fn convert_node_slot(
    snapshot: &mut GraphSnapshot,
    placeholder: &SlotRef,
    peer: &SlotInfo,
) -> Result<(), GraphError> {
    let node = snapshot.require_node_mut(&placeholder.node_id)?;
    let missing = || GraphError::SlotNotFound {
        node_id: placeholder.node_id.clone(),
        slot_key: placeholder.key.clone(),
    };

    match placeholder.direction {
        SlotDirection::Input => {
            let state = node.inputs.get_mut(&placeholder.key).ok_or_else(missing)?;
            let multi = state.slot.multi;
            state.slot.adopt(peer);
            state.slot.allow_dynamic_type = false;

            let next = successor_key(node.inputs.keys(), &placeholder.key);
            let slot = SlotInfo::placeholder(next.clone()).with_multi(multi);
            node.inputs.insert(next, InputSlotState::new(slot));
        }
        SlotDirection::Output => {
            let state = node.outputs.get_mut(&placeholder.key).ok_or_else(missing)?;
            state.slot.adopt(peer);
            state.slot.allow_dynamic_type = false;

            let next = successor_key(node.outputs.keys(), &placeholder.key);
            let slot = SlotInfo::placeholder(next.clone());
            node.outputs.insert(next, OutputSlotState::new(slot));
        }
    }
    Ok(())
}

/// Converts a slot in a group-reference node's interface mirror and
/// allocates the next `input_conv_<N>`/`output_conv_<N>` placeholder there.
/// The external workflow interface is never touched on this path.
fn convert_group_mirror_slot(
    snapshot: &mut GraphSnapshot,
    placeholder: &SlotRef,
    peer: &SlotInfo,
) -> Result<(), GraphError> {
    let node = snapshot.require_node_mut(&placeholder.node_id)?;
    let missing = || GraphError::SlotNotFound {
        node_id: placeholder.node_id.clone(),
        slot_key: placeholder.key.clone(),
    };
    let mirror = node.group_interface.as_mut().ok_or_else(missing)?;
    let map = match placeholder.direction {
        SlotDirection::Input => &mut mirror.inputs,
        SlotDirection::Output => &mut mirror.outputs,
    };

    let entry = map.get_mut(&placeholder.key).ok_or_else(missing)?;
    entry.adopt(peer);
    entry.allow_dynamic_type = false;

    let series = match placeholder.direction {
        SlotDirection::Input => "input_conv_0",
        SlotDirection::Output => "output_conv_0",
    };
    let consumed = if placeholder.key.starts_with("input_conv_")
        || placeholder.key.starts_with("output_conv_")
    {
        placeholder.key.as_str()
    } else {
        series
    };
    let next = successor_key(map.keys(), consumed);
    map.insert(next.clone(), SlotInfo::placeholder(next));
    Ok(())
}
