//! Prelude module for convenient imports
//!
//! Re-exports the most commonly used types from the patchbay crate. Import
//! this module to get access to the core functionality without having to
//! import each type individually.

// Sessions and their boundaries
pub use crate::session::{
    GraphSession, NullView, SessionId, SessionRegistry, StoredWorkflow, ViewSync,
};

// Connection gestures
pub use crate::connection::{DropTarget, EdgeEnd, Endpoint};

// Graph data model
pub use crate::graph::{
    Edge, EdgeId, GraphSnapshot, Node, NodeId, Position, Size, Viewport, WorkflowData,
};
pub use crate::graph::{GRAPH_INPUT_NODE, GRAPH_OUTPUT_NODE, SUBFLOW_NODE};

// Slot model and compatibility engine
pub use crate::slot::compat::{is_compatible, resolve_dynamic_type};
pub use crate::slot::{DataType, SlotConfig, SlotDirection, SlotInfo, SlotKey};

// Node definitions
pub use crate::registry::{NodeDefinition, NodeRegistry};

// History
pub use crate::history::{ActionKind, History, HistoryEntry, Restore};

// Error types
pub use crate::error::{ConnectError, GraphError};
