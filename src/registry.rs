//! Node definition registry.
//!
//! Definitions come from an external catalogue keyed by node type string;
//! this crate only consumes the slot maps and flags, it never loads or
//! validates the catalogue itself. Boundary pseudo-types and subflow
//! references are built in, since their ports come from interface maps
//! rather than from a definition.

use crate::error::GraphError;
use crate::graph::{
    GRAPH_INPUT_NODE, GRAPH_OUTPUT_NODE, GroupInterface, InputSlotState, Node, OutputSlotState,
    Position, SUBFLOW_NODE,
};
use crate::slot::SlotInfo;
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Slot contract of one node type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDefinition {
    pub node_type: String,
    pub inputs: Vec<SlotInfo>,
    pub outputs: Vec<SlotInfo>,
}

impl NodeDefinition {
    pub fn new(node_type: impl Into<String>) -> Self {
        Self {
            node_type: node_type.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn with_input(mut self, slot: SlotInfo) -> Self {
        self.inputs.push(slot);
        self
    }

    pub fn with_output(mut self, slot: SlotInfo) -> Self {
        self.outputs.push(slot);
        self
    }
}

/// Registry of node definitions keyed by type string.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    definitions: AHashMap<String, NodeDefinition>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, definition: NodeDefinition) {
        self.definitions
            .insert(definition.node_type.clone(), definition);
    }

    pub fn get(&self, node_type: &str) -> Option<&NodeDefinition> {
        self.definitions.get(node_type)
    }

    /// Builds a fresh node instance of the given type.
    ///
    /// Boundary pseudo-nodes start with empty slot maps (they are projected
    /// from the workflow interface afterwards); subflow nodes start with an
    /// interface mirror seeded with one placeholder per side.
    pub fn instantiate(
        &self,
        node_type: &str,
        id: impl Into<String>,
        position: Position,
    ) -> Result<Node, GraphError> {
        let mut node = Node::new(id, node_type, position);
        match node_type {
            GRAPH_INPUT_NODE | GRAPH_OUTPUT_NODE => {}
            SUBFLOW_NODE => {
                let mut mirror = GroupInterface::default();
                mirror
                    .inputs
                    .insert("input_conv_0".into(), SlotInfo::placeholder("input_conv_0"));
                mirror.outputs.insert(
                    "output_conv_0".into(),
                    SlotInfo::placeholder("output_conv_0"),
                );
                node.group_interface = Some(mirror);
            }
            _ => {
                let definition = self
                    .definitions
                    .get(node_type)
                    .ok_or_else(|| GraphError::UnknownNodeType(node_type.to_string()))?;
                for slot in &definition.inputs {
                    node.inputs
                        .insert(slot.key.clone(), InputSlotState::new(slot.clone()));
                }
                for slot in &definition.outputs {
                    node.outputs
                        .insert(slot.key.clone(), OutputSlotState::new(slot.clone()));
                }
            }
        }
        Ok(node)
    }
}
