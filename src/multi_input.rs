//! Ordered multi-input connection management.
//!
//! Every multi-input slot key owns an ordered list of edge ids. The view
//! layer addresses drop targets by positional sub-handle, not by edge
//! identity, so after every mutation each listed edge's `target_handle` is
//! rewritten to `"<key>__<position>"` and the slot's literal-fallback
//! `values` array is resized to match.

use crate::error::GraphError;
use crate::graph::{GraphSnapshot, handle};
use itertools::Itertools;

/// Inserts `edge_id` into the order list at `at_index`, shifting subsequent
/// entries. The index is clamped into `[0, len]`; the clamped position is
/// returned.
pub fn insert(
    snapshot: &mut GraphSnapshot,
    node_id: &str,
    slot_key: &str,
    edge_id: &str,
    at_index: usize,
) -> Result<usize, GraphError> {
    ensure_multi(snapshot, node_id, slot_key)?;
    let node = snapshot.require_node_mut(node_id)?;
    let order = node.input_orders.entry(slot_key.to_string()).or_default();
    let position = at_index.min(order.len());
    order.insert(position, edge_id.to_string());

    if let Some(state) = node.inputs.get_mut(slot_key) {
        state.values.insert(position.min(state.values.len()), None);
    }

    reindex(snapshot, node_id, slot_key)?;
    Ok(position)
}

/// Removes `edge_id` from the order list and re-indexes the remainder so
/// positions stay contiguous from 0.
pub fn remove(
    snapshot: &mut GraphSnapshot,
    node_id: &str,
    slot_key: &str,
    edge_id: &str,
) -> Result<(), GraphError> {
    let node = snapshot.require_node_mut(node_id)?;
    let order = node
        .input_orders
        .get_mut(slot_key)
        .ok_or_else(|| GraphError::SlotNotFound {
            node_id: node_id.to_string(),
            slot_key: slot_key.to_string(),
        })?;
    let position = order
        .iter()
        .position(|id| id == edge_id)
        .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
    order.remove(position);

    if let Some(state) = node.inputs.get_mut(slot_key)
        && position < state.values.len()
    {
        state.values.remove(position);
    }

    reindex(snapshot, node_id, slot_key)
}

/// Replaces the order list with `new_order`, which must be a permutation of
/// the current list (no duplicates, no dangling or missing ids). The
/// `values` array is permuted alongside so literal fallbacks follow their
/// positions.
pub fn reorder(
    snapshot: &mut GraphSnapshot,
    node_id: &str,
    slot_key: &str,
    new_order: Vec<String>,
) -> Result<(), GraphError> {
    let invalid_order = || GraphError::InvalidOrder {
        node_id: node_id.to_string(),
        slot_key: slot_key.to_string(),
    };

    let node = snapshot.require_node_mut(node_id)?;
    let order = node
        .input_orders
        .get_mut(slot_key)
        .ok_or_else(|| GraphError::SlotNotFound {
            node_id: node_id.to_string(),
            slot_key: slot_key.to_string(),
        })?;

    if new_order.len() != order.len() || !new_order.iter().all_unique() {
        return Err(invalid_order());
    }
    let old_positions: Vec<usize> = new_order
        .iter()
        .map(|id| order.iter().position(|cur| cur == id))
        .collect::<Option<_>>()
        .ok_or_else(invalid_order)?;

    *order = new_order;

    if let Some(state) = node.inputs.get_mut(slot_key) {
        let old_values = std::mem::take(&mut state.values);
        state.values = old_positions
            .iter()
            .map(|&pos| old_values.get(pos).cloned().flatten())
            .collect();
    }

    reindex(snapshot, node_id, slot_key)
}

/// Number of entries currently ordered for the slot.
pub fn len(snapshot: &GraphSnapshot, node_id: &str, slot_key: &str) -> usize {
    snapshot
        .node(node_id)
        .and_then(|n| n.input_orders.get(slot_key))
        .map_or(0, Vec::len)
}

fn ensure_multi(snapshot: &GraphSnapshot, node_id: &str, slot_key: &str) -> Result<(), GraphError> {
    let node = snapshot.require_node(node_id)?;
    // Boundary and group-reference slots live in interface maps; their
    // `multi` flag is checked by the caller against the resolved SlotRef.
    if let Some(state) = node.inputs.get(slot_key)
        && !state.slot.multi
    {
        return Err(GraphError::NotMultiInput {
            node_id: node_id.to_string(),
            slot_key: slot_key.to_string(),
        });
    }
    Ok(())
}

/// Rewrites every listed edge's target handle to its array position and
/// pads the `values` array to the order length.
fn reindex(snapshot: &mut GraphSnapshot, node_id: &str, slot_key: &str) -> Result<(), GraphError> {
    let order = snapshot
        .require_node(node_id)?
        .input_orders
        .get(slot_key)
        .cloned()
        .unwrap_or_default();

    for (position, edge_id) in order.iter().enumerate() {
        let edge = snapshot
            .edge_mut(edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound(edge_id.clone()))?;
        edge.target_handle = handle::indexed_handle(slot_key, position);
    }

    let node = snapshot.require_node_mut(node_id)?;
    if let Some(state) = node.inputs.get_mut(slot_key) {
        state.values.resize(order.len(), None);
    }
    Ok(())
}
