//! The authoritative in-memory graph model.
//!
//! A [`GraphSnapshot`] is a plain value: cloning it is the deep copy the
//! history manager relies on, and every mutation runs against a clone that
//! only becomes live when the transaction commits. The rendering layer is a
//! derived projection of this model and is never read back.

use crate::error::GraphError;
use crate::slot::{SlotDirection, SlotInfo, SlotKey, SlotOrigin};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

pub mod handle;

use handle::Handle;

pub type NodeId = String;
pub type EdgeId = String;

/// Pseudo-node type whose outputs are views onto the workflow's input
/// interface.
pub const GRAPH_INPUT_NODE: &str = "graphInputNode";
/// Pseudo-node type whose inputs are views onto the workflow's output
/// interface.
pub const GRAPH_OUTPUT_NODE: &str = "graphOutputNode";
/// Group-reference node type carrying its own interface mirror.
pub const SUBFLOW_NODE: &str = "subflowNode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Default for Size {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

/// Live state of one input slot on a node instance.
///
/// `values` is the literal-fallback array for multi-input slots: it always
/// has the same length as the slot's connection order list, with `None` at
/// connected positions. Single-input slots use at most one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSlotState {
    pub slot: SlotInfo,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Option<serde_json::Value>>,
}

impl InputSlotState {
    pub fn new(slot: SlotInfo) -> Self {
        Self {
            slot,
            values: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSlotState {
    pub slot: SlotInfo,
}

impl OutputSlotState {
    pub fn new(slot: SlotInfo) -> Self {
        Self { slot }
    }
}

/// Interface mirror carried by group-reference (subflow) nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupInterface {
    pub inputs: AHashMap<SlotKey, SlotInfo>,
    pub outputs: AHashMap<SlotKey, SlotInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub node_type: String,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Size,
    #[serde(default)]
    pub inputs: AHashMap<SlotKey, InputSlotState>,
    #[serde(default)]
    pub outputs: AHashMap<SlotKey, OutputSlotState>,
    /// Ordered edge-id lists, present only for multi-input slot keys.
    /// The skip path goes through the underlying `HashMap`; `AHashMap` only
    /// derefs to `is_empty` and serde calls the path directly.
    #[serde(default, skip_serializing_if = "std::collections::HashMap::is_empty")]
    pub input_orders: AHashMap<SlotKey, Vec<EdgeId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interface: Option<GroupInterface>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, node_type: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            position,
            size: Size::default(),
            inputs: AHashMap::new(),
            outputs: AHashMap::new(),
            input_orders: AHashMap::new(),
            group_interface: None,
        }
    }

    /// True for the graph-input/graph-output pseudo-nodes whose ports are
    /// views onto the workflow interface.
    pub fn is_boundary(&self) -> bool {
        self.node_type == GRAPH_INPUT_NODE || self.node_type == GRAPH_OUTPUT_NODE
    }

    pub fn is_group_reference(&self) -> bool {
        self.node_type == SUBFLOW_NODE
    }
}

/// Derived display metadata for an edge. Not authoritative: recomputed on
/// every connect/reconnect from the resolved endpoint types.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub data_type: crate::slot::DataType,
}

impl Default for EdgeStyle {
    fn default() -> Self {
        Self {
            data_type: crate::slot::DataType::Wildcard,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub source_handle: String,
    pub target: NodeId,
    pub target_handle: String,
    #[serde(default)]
    pub style: EdgeStyle,
}

impl Edge {
    /// Slot key of the target handle, with any sub-handle index stripped.
    pub fn target_key(&self) -> SlotKey {
        Handle::parse(&self.target_handle).key
    }

    /// Slot key of the source handle.
    pub fn source_key(&self) -> SlotKey {
        Handle::parse(&self.source_handle).key
    }
}

/// The externally visible input/output contract of a workflow.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowData {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub interface_inputs: AHashMap<SlotKey, SlotInfo>,
    #[serde(default)]
    pub interface_outputs: AHashMap<SlotKey, SlotInfo>,
}

/// One complete editor state: the single source of truth per session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub viewport: Viewport,
    #[serde(default)]
    pub workflow: WorkflowData,
}

impl GraphSnapshot {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn require_node(&self, id: &str) -> Result<&Node, GraphError> {
        self.node(id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    pub fn require_node_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn edge_mut(&mut self, id: &str) -> Option<&mut Edge> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    pub fn require_edge(&self, id: &str) -> Result<&Edge, GraphError> {
        self.edge(id)
            .ok_or_else(|| GraphError::EdgeNotFound(id.to_string()))
    }

    /// Removes and returns an edge without touching any order list.
    pub(crate) fn take_edge(&mut self, id: &str) -> Option<Edge> {
        let pos = self.edges.iter().position(|e| e.id == id)?;
        Some(self.edges.remove(pos))
    }

    /// Edges whose target is the given slot, regardless of sub-handle index.
    pub fn edges_into(&self, node_id: &str, slot_key: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.target == node_id && e.target_key() == slot_key)
            .collect()
    }

    /// Edges touching the node on either end.
    pub fn edges_of(&self, node_id: &str) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| e.source == node_id || e.target == node_id)
            .collect()
    }

    /// Allocates the next free edge id in the `e<N>` series.
    pub fn allocate_edge_id(&self) -> EdgeId {
        let next = self
            .edges
            .iter()
            .filter_map(|e| e.id.strip_prefix('e')?.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        format!("e{}", next)
    }

    /// Allocates the next free node id in the `n<N>` series.
    pub fn allocate_node_id(&self) -> NodeId {
        let next = self
            .nodes
            .iter()
            .filter_map(|n| n.id.strip_prefix('n')?.parse::<u64>().ok())
            .max()
            .map_or(1, |max| max + 1);
        format!("n{}", next)
    }
}

/// A slot resolved to its owning map.
///
/// `info` is a copy taken at resolve time; mutations go back through the
/// origin discriminant so they land in the authoritative map.
#[derive(Debug, Clone)]
pub struct SlotRef {
    pub node_id: NodeId,
    pub direction: SlotDirection,
    pub origin: SlotOrigin,
    pub key: SlotKey,
    pub info: SlotInfo,
}

/// Resolves a handle on a node to the slot definition it refers to,
/// classifying where that definition lives.
///
/// Boundary pseudo-nodes resolve against the workflow interface (a graph
/// input exposes the workflow's inputs as *outputs*, and vice versa);
/// subflow nodes resolve against their own interface mirror; everything
/// else resolves against the node's local slot maps.
pub fn resolve_slot(
    snapshot: &GraphSnapshot,
    node_id: &str,
    raw_handle: &str,
    direction: SlotDirection,
) -> Result<SlotRef, GraphError> {
    let node = snapshot.require_node(node_id)?;
    let key = Handle::parse(raw_handle).key;
    let missing = || GraphError::SlotNotFound {
        node_id: node_id.to_string(),
        slot_key: key.clone(),
    };

    let (origin, info) = match (node.node_type.as_str(), direction) {
        (GRAPH_INPUT_NODE, SlotDirection::Output) => (
            SlotOrigin::WorkflowInterface,
            snapshot
                .workflow
                .interface_inputs
                .get(&key)
                .ok_or_else(missing)?
                .clone(),
        ),
        (GRAPH_OUTPUT_NODE, SlotDirection::Input) => (
            SlotOrigin::WorkflowInterface,
            snapshot
                .workflow
                .interface_outputs
                .get(&key)
                .ok_or_else(missing)?
                .clone(),
        ),
        (SUBFLOW_NODE, _) => {
            let mirror = node.group_interface.as_ref().ok_or_else(missing)?;
            let map = match direction {
                SlotDirection::Input => &mirror.inputs,
                SlotDirection::Output => &mirror.outputs,
            };
            (
                SlotOrigin::GroupInterface,
                map.get(&key).ok_or_else(missing)?.clone(),
            )
        }
        _ => match direction {
            SlotDirection::Input => (
                SlotOrigin::Node,
                node.inputs.get(&key).ok_or_else(missing)?.slot.clone(),
            ),
            SlotDirection::Output => (
                SlotOrigin::Node,
                node.outputs.get(&key).ok_or_else(missing)?.slot.clone(),
            ),
        },
    };

    Ok(SlotRef {
        node_id: node_id.to_string(),
        direction,
        origin,
        key,
        info,
    })
}
