use crate::slot::DataType;
use thiserror::Error;

/// Rejections raised while validating a connection gesture.
///
/// These are expected outcomes of direct-manipulation input, not faults:
/// the session layer logs them at debug level and leaves the snapshot
/// untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConnectError {
    #[error("connection from node '{0}' back to itself is not allowed")]
    SelfLoop(String),

    #[error(
        "slot '{source_key}' ({source_type}) cannot connect to slot '{target_key}' ({target_type})"
    )]
    Incompatible {
        source_key: String,
        source_type: DataType,
        target_key: String,
        target_type: DataType,
    },

    #[error("single-input slot '{slot_key}' on node '{node_id}' is already occupied")]
    TargetOccupied { node_id: String, slot_key: String },
}

/// Errors raised while resolving or mutating graph state.
///
/// Lookup failures abort the single mutation attempt before any side effect
/// is committed; they never escape a high-level session action.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("node '{0}' not found in the current snapshot")]
    NodeNotFound(String),

    #[error("edge '{0}' not found in the current snapshot")]
    EdgeNotFound(String),

    #[error("slot '{slot_key}' not found on node '{node_id}'")]
    SlotNotFound { node_id: String, slot_key: String },

    #[error("workflow interface has no entry for slot '{0}'")]
    InterfaceSlotNotFound(String),

    #[error("node type '{0}' is not present in the definition registry")]
    UnknownNodeType(String),

    #[error("slot '{slot_key}' on node '{node_id}' does not accept multiple connections")]
    NotMultiInput { node_id: String, slot_key: String },

    #[error(
        "requested order for slot '{slot_key}' on node '{node_id}' is not a permutation of its current connections"
    )]
    InvalidOrder { node_id: String, slot_key: String },

    #[error(transparent)]
    Rejected(#[from] ConnectError),
}
