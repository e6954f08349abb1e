//! The connection lifecycle controller.
//!
//! Each operation here is one transaction body: it receives the next
//! snapshot (a clone owned by the caller), validates the gesture, applies
//! the full mutation or none of it, and reports a typed effect the session
//! layer turns into a history entry and a view refresh. Nothing in this
//! module performs I/O.

use crate::error::{ConnectError, GraphError};
use crate::graph::handle::Handle;
use crate::graph::{Edge, EdgeId, EdgeStyle, GraphSnapshot, NodeId, resolve_slot};
use crate::multi_input;
use crate::slot::SlotDirection;
use crate::slot::compat;
use itertools::Itertools;

pub(crate) mod propagation;

/// One end of a connection gesture: a node plus the handle the wire
/// touches. The handle may carry a sub-handle index (`"text__1"`) to name a
/// hovered position on a multi-input slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node_id: NodeId,
    pub handle: String,
}

impl Endpoint {
    pub fn new(node_id: impl Into<NodeId>, handle: impl Into<String>) -> Self {
        Self {
            node_id: node_id.into(),
            handle: handle.into(),
        }
    }
}

/// Which end of an existing edge the user grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeEnd {
    Source,
    Target,
}

/// Where a re-drag gesture ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    Slot {
        endpoint: Endpoint,
        /// Explicit insertion position for multi-input targets; falls back
        /// to the endpoint handle's sub-handle index, then to appending.
        index: Option<usize>,
    },
    /// Empty canvas: the edge is deleted rather than left dangling.
    Canvas,
}

#[derive(Debug, Clone)]
pub struct ConnectEffect {
    pub edge_id: EdgeId,
    /// Edge implicitly disconnected by single-input auto-replace.
    pub replaced_edge: Option<EdgeId>,
    pub touched: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub enum MoveEffect {
    Moved { edge_id: EdgeId, touched: Vec<NodeId> },
    Deleted { edge_id: EdgeId, touched: Vec<NodeId> },
}

#[derive(Debug, Clone)]
pub struct DisconnectEffect {
    pub edge: Edge,
    pub touched: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct RemoveNodeEffect {
    pub removed_edges: Vec<EdgeId>,
    pub touched: Vec<NodeId>,
}

/// Creates a fresh connection between an output and an input slot.
///
/// Single-input targets that are already occupied are auto-replaced: the
/// existing edge is removed first and reported in the effect as an implicit
/// disconnect. Multi-input targets insert at the hovered sub-handle
/// position, appending when none is given. Dynamic type propagation runs
/// before the edge is finalized so its style reflects the concrete type.
pub fn create_connection(
    next: &mut GraphSnapshot,
    source: &Endpoint,
    target: &Endpoint,
) -> Result<ConnectEffect, GraphError> {
    if source.node_id == target.node_id {
        return Err(ConnectError::SelfLoop(source.node_id.clone()).into());
    }
    let src = resolve_slot(next, &source.node_id, &source.handle, SlotDirection::Output)?;
    let tgt = resolve_slot(next, &target.node_id, &target.handle, SlotDirection::Input)?;
    if !compat::is_compatible(&src.info, &tgt.info) {
        return Err(ConnectError::Incompatible {
            source_key: src.key.clone(),
            source_type: src.info.data_type,
            target_key: tgt.key.clone(),
            target_type: tgt.info.data_type,
        }
        .into());
    }
    let resolved = compat::resolve_dynamic_type(&src.info, &tgt.info);

    let mut touched = vec![source.node_id.clone(), target.node_id.clone()];
    let mut replaced_edge = None;
    if !tgt.info.multi {
        let existing = next
            .edges_into(&target.node_id, &tgt.key)
            .first()
            .map(|e| e.id.clone());
        if let Some(existing) = existing {
            let effect = disconnect(next, &existing)?;
            touched.extend(effect.touched);
            replaced_edge = Some(existing);
        }
    }

    let outcome = propagation::propagate(next, &src, &tgt)?;
    touched.extend(outcome.touched);

    let edge_id = next.allocate_edge_id();
    next.edges.push(Edge {
        id: edge_id.clone(),
        source: source.node_id.clone(),
        source_handle: src.key.clone(),
        target: target.node_id.clone(),
        target_handle: tgt.key.clone(),
        style: EdgeStyle {
            data_type: resolved.source_type,
        },
    });

    if tgt.info.multi {
        let at = Handle::parse(&target.handle).index.unwrap_or(usize::MAX);
        multi_input::insert(next, &target.node_id, &tgt.key, &edge_id, at)?;
    }

    Ok(ConnectEffect {
        edge_id,
        replaced_edge,
        touched: touched.into_iter().unique().collect(),
    })
}

/// Re-targets an existing edge after the user re-dragged one of its ends.
///
/// Dropping on empty canvas deletes the edge (both for the output end and
/// the unplug-from-input variant). Dropping on an invalid slot — self-loop
/// or incompatible types — also deletes: the wire was already detached
/// visually and must not snap back silently. Dropping on an occupied
/// single-input slot is the one rejection that *keeps* the edge where it
/// was, so a mid-drag slip cannot destroy an unrelated connection.
pub fn move_connection(
    next: &mut GraphSnapshot,
    edge_id: &str,
    grabbed: EdgeEnd,
    drop: DropTarget,
) -> Result<MoveEffect, GraphError> {
    let edge = next.require_edge(edge_id)?.clone();

    let DropTarget::Slot { endpoint, index } = drop else {
        let effect = disconnect(next, edge_id)?;
        return Ok(MoveEffect::Deleted {
            edge_id: edge_id.to_string(),
            touched: effect.touched,
        });
    };

    let delete = |next: &mut GraphSnapshot| -> Result<MoveEffect, GraphError> {
        let effect = disconnect(next, edge_id)?;
        Ok(MoveEffect::Deleted {
            edge_id: edge_id.to_string(),
            touched: effect.touched,
        })
    };

    match grabbed {
        EdgeEnd::Target => {
            if endpoint.node_id == edge.source {
                return delete(next);
            }
            let src = resolve_slot(next, &edge.source, &edge.source_handle, SlotDirection::Output)?;
            let tgt = resolve_slot(next, &endpoint.node_id, &endpoint.handle, SlotDirection::Input)?;
            if !compat::is_compatible(&src.info, &tgt.info) {
                return delete(next);
            }
            if !tgt.info.multi {
                let occupied = next
                    .edges_into(&endpoint.node_id, &tgt.key)
                    .iter()
                    .any(|e| e.id != edge.id);
                if occupied {
                    return Err(ConnectError::TargetOccupied {
                        node_id: endpoint.node_id.clone(),
                        slot_key: tgt.key.clone(),
                    }
                    .into());
                }
            }
            let resolved = compat::resolve_dynamic_type(&src.info, &tgt.info);

            let old_key = edge.target_key();
            if in_order(next, &edge.target, &old_key, edge_id) {
                multi_input::remove(next, &edge.target, &old_key, edge_id)?;
            }

            let stored = next
                .edge_mut(edge_id)
                .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
            stored.target = endpoint.node_id.clone();
            stored.target_handle = tgt.key.clone();
            stored.style = EdgeStyle {
                data_type: resolved.source_type,
            };

            if tgt.info.multi {
                let at = index
                    .or(Handle::parse(&endpoint.handle).index)
                    .unwrap_or(usize::MAX);
                multi_input::insert(next, &endpoint.node_id, &tgt.key, edge_id, at)?;
            }

            let outcome = propagation::propagate(next, &src, &tgt)?;
            let touched = [edge.source.clone(), edge.target.clone(), endpoint.node_id]
                .into_iter()
                .chain(outcome.touched)
                .unique()
                .collect();
            Ok(MoveEffect::Moved {
                edge_id: edge_id.to_string(),
                touched,
            })
        }
        EdgeEnd::Source => {
            if endpoint.node_id == edge.target {
                return delete(next);
            }
            let src =
                resolve_slot(next, &endpoint.node_id, &endpoint.handle, SlotDirection::Output)?;
            let tgt = resolve_slot(next, &edge.target, &edge.target_handle, SlotDirection::Input)?;
            if !compat::is_compatible(&src.info, &tgt.info) {
                return delete(next);
            }
            let resolved = compat::resolve_dynamic_type(&src.info, &tgt.info);

            let stored = next
                .edge_mut(edge_id)
                .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;
            stored.source = endpoint.node_id.clone();
            stored.source_handle = src.key.clone();
            stored.style = EdgeStyle {
                data_type: resolved.source_type,
            };

            let outcome = propagation::propagate(next, &src, &tgt)?;
            let touched = [edge.source.clone(), edge.target.clone(), endpoint.node_id]
                .into_iter()
                .chain(outcome.touched)
                .unique()
                .collect();
            Ok(MoveEffect::Moved {
                edge_id: edge_id.to_string(),
                touched,
            })
        }
    }
}

/// Removes one edge and heals the target's order list when it pointed at a
/// multi-input slot.
pub fn disconnect(
    next: &mut GraphSnapshot,
    edge_id: &str,
) -> Result<DisconnectEffect, GraphError> {
    let edge = next
        .take_edge(edge_id)
        .ok_or_else(|| GraphError::EdgeNotFound(edge_id.to_string()))?;

    let key = edge.target_key();
    if in_order(next, &edge.target, &key, edge_id) {
        multi_input::remove(next, &edge.target, &key, edge_id)?;
    }

    let touched = vec![edge.source.clone(), edge.target.clone()];
    Ok(DisconnectEffect { edge, touched })
}

/// Deletes a node and cascades removal of every edge touching it, healing
/// affected order lists on surviving nodes.
pub fn remove_node(
    next: &mut GraphSnapshot,
    node_id: &str,
) -> Result<RemoveNodeEffect, GraphError> {
    next.require_node(node_id)?;
    let removed_edges: Vec<EdgeId> = next.edges_of(node_id).iter().map(|e| e.id.clone()).collect();

    let mut touched = Vec::new();
    for edge_id in &removed_edges {
        let effect = disconnect(next, edge_id)?;
        touched.extend(effect.touched);
    }

    let pos = next
        .nodes
        .iter()
        .position(|n| n.id == node_id)
        .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
    next.nodes.remove(pos);

    let touched = touched
        .into_iter()
        .filter(|id| id != node_id)
        .unique()
        .collect();
    Ok(RemoveNodeEffect {
        removed_edges,
        touched,
    })
}

fn in_order(snapshot: &GraphSnapshot, node_id: &str, slot_key: &str, edge_id: &str) -> bool {
    snapshot
        .node(node_id)
        .and_then(|n| n.input_orders.get(slot_key))
        .is_some_and(|order| order.iter().any(|id| id == edge_id))
}
