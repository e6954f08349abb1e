//! Editor sessions: one [`GraphSession`] per editor tab, owning its
//! snapshot, history and view adapter.
//!
//! Every mutation follows the same pipeline: clone the live snapshot, run
//! the transaction body against the clone, then either commit (swap in the
//! clone, record history, notify the view) or drop the clone and log. There
//! is no suspension point between read and commit, and rejected gestures
//! leave the snapshot bit-identical.

use crate::connection::{self, DropTarget, EdgeEnd, Endpoint, MoveEffect};
use crate::error::GraphError;
use crate::graph::{Edge, EdgeId, GraphSnapshot, Node, NodeId, Position, Viewport, WorkflowData};
use crate::history::{ActionKind, History, HistoryEntry, Restore};
use crate::interface;
use crate::multi_input;
use crate::registry::NodeRegistry;
use crate::slot::{SlotInfo, SlotKey};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, warn};

pub type SessionId = String;

/// Adapter the session calls to re-sync the derived rendering layer after
/// every committed mutation or history navigation. The view is disposable
/// and never read back as a source of truth.
pub trait ViewSync {
    fn set_nodes(&mut self, nodes: &[Node]);
    fn set_edges(&mut self, edges: &[Edge]);
    fn set_viewport(&mut self, viewport: &Viewport);
    fn update_node_internals(&mut self, node_ids: &[NodeId]);
}

/// No-op adapter for headless use and tests.
#[derive(Debug, Default)]
pub struct NullView;

impl ViewSync for NullView {
    fn set_nodes(&mut self, _nodes: &[Node]) {}
    fn set_edges(&mut self, _edges: &[Edge]) {}
    fn set_viewport(&mut self, _viewport: &Viewport) {}
    fn update_node_internals(&mut self, _node_ids: &[NodeId]) {}
}

/// Transport-agnostic persistence shape exchanged with an external storage
/// collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWorkflow {
    #[serde(default)]
    pub name: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub interface_inputs: AHashMap<SlotKey, SlotInfo>,
    #[serde(default)]
    pub interface_outputs: AHashMap<SlotKey, SlotInfo>,
    #[serde(default)]
    pub viewport: Viewport,
}

/// One editor tab: the authoritative snapshot plus its history and view.
pub struct GraphSession {
    id: SessionId,
    snapshot: GraphSnapshot,
    history: History,
    view: Box<dyn ViewSync>,
    registry: Arc<NodeRegistry>,
}

impl GraphSession {
    pub fn new(
        id: impl Into<SessionId>,
        registry: Arc<NodeRegistry>,
        view: Box<dyn ViewSync>,
    ) -> Self {
        Self {
            id: id.into(),
            snapshot: GraphSnapshot::default(),
            history: History::default(),
            view,
            registry,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Creates a connection between two slots. Returns the new edge id, or
    /// `None` when the gesture was rejected or aborted (the snapshot is
    /// untouched in both cases).
    pub fn connect(&mut self, source: Endpoint, target: Endpoint) -> Option<EdgeId> {
        let mut next = self.snapshot.clone();
        match connection::create_connection(&mut next, &source, &target) {
            Ok(effect) => {
                let label = format!(
                    "connect {}.{} -> {}.{}",
                    source.node_id, source.handle, target.node_id, target.handle
                );
                self.commit(HistoryEntry::new(ActionKind::Connect, label), next, &effect.touched);
                Some(effect.edge_id)
            }
            Err(err) => {
                self.reject("connect", err);
                None
            }
        }
    }

    /// Re-drags one end of an existing edge. Returns `true` when the
    /// gesture mutated the graph (a move *or* a deletion — dropping on
    /// empty canvas records a delete entry rather than leaving a stale
    /// visual link).
    pub fn reconnect(&mut self, edge_id: &str, grabbed: EdgeEnd, drop: DropTarget) -> bool {
        let mut next = self.snapshot.clone();
        match connection::move_connection(&mut next, edge_id, grabbed, drop) {
            Ok(MoveEffect::Moved { edge_id, touched }) => {
                let label = format!("reconnect edge {}", edge_id);
                self.commit(HistoryEntry::new(ActionKind::Reconnect, label), next, &touched);
                true
            }
            Ok(MoveEffect::Deleted { edge_id, touched }) => {
                let label = format!("delete edge {}", edge_id);
                self.commit(HistoryEntry::new(ActionKind::Delete, label), next, &touched);
                true
            }
            Err(err) => {
                self.reject("reconnect", err);
                false
            }
        }
    }

    /// Removes one edge.
    pub fn disconnect(&mut self, edge_id: &str) -> bool {
        let mut next = self.snapshot.clone();
        match connection::disconnect(&mut next, edge_id) {
            Ok(effect) => {
                let label = format!("delete edge {}", effect.edge.id);
                self.commit(
                    HistoryEntry::new(ActionKind::Delete, label),
                    next,
                    &effect.touched,
                );
                true
            }
            Err(err) => {
                self.reject("disconnect", err);
                false
            }
        }
    }

    /// Applies a new ordering to a multi-input slot's connections.
    pub fn reorder_inputs(
        &mut self,
        node_id: &str,
        slot_key: &str,
        new_order: Vec<EdgeId>,
    ) -> bool {
        let mut next = self.snapshot.clone();
        match multi_input::reorder(&mut next, node_id, slot_key, new_order) {
            Ok(()) => {
                let label = format!("reorder {}.{}", node_id, slot_key);
                let touched = [node_id.to_string()];
                self.commit(HistoryEntry::new(ActionKind::Reorder, label), next, &touched);
                true
            }
            Err(err) => {
                self.reject("reorder", err);
                false
            }
        }
    }

    /// Writes a literal fallback value into an unconnected single-input
    /// slot.
    pub fn set_input_value(
        &mut self,
        node_id: &str,
        slot_key: &str,
        value: serde_json::Value,
    ) -> bool {
        let mut next = self.snapshot.clone();
        let result = (|| -> Result<(), GraphError> {
            let node = next.require_node_mut(node_id)?;
            let state = node
                .inputs
                .get_mut(slot_key)
                .ok_or_else(|| GraphError::SlotNotFound {
                    node_id: node_id.to_string(),
                    slot_key: slot_key.to_string(),
                })?;
            if state.slot.multi {
                return Err(GraphError::NotMultiInput {
                    node_id: node_id.to_string(),
                    slot_key: slot_key.to_string(),
                });
            }
            state.values = vec![Some(value)];
            Ok(())
        })();
        match result {
            Ok(()) => {
                let label = format!("set {}.{}", node_id, slot_key);
                let touched = [node_id.to_string()];
                self.commit(HistoryEntry::new(ActionKind::SetValue, label), next, &touched);
                true
            }
            Err(err) => {
                self.reject("set_input_value", err);
                false
            }
        }
    }

    /// Instantiates a node from the definition registry and adds it to the
    /// graph. Returns the allocated node id.
    pub fn add_node(&mut self, node_type: &str, position: Position) -> Option<NodeId> {
        let mut next = self.snapshot.clone();
        let node_id = next.allocate_node_id();
        let registry = Arc::clone(&self.registry);
        match registry.instantiate(node_type, node_id.clone(), position) {
            Ok(node) => {
                let boundary = node.is_boundary();
                next.nodes.push(node);
                if boundary {
                    interface::ensure_placeholder(&mut next.workflow);
                    interface::sync_boundary_nodes(&mut next);
                }
                let label = format!("add {} ({})", node_id, node_type);
                let touched = [node_id.clone()];
                self.commit(HistoryEntry::new(ActionKind::AddNode, label), next, &touched);
                Some(node_id)
            }
            Err(err) => {
                self.reject("add_node", err);
                None
            }
        }
    }

    /// Deletes a node, cascading removal of all its edges.
    pub fn remove_node(&mut self, node_id: &str) -> bool {
        let mut next = self.snapshot.clone();
        match connection::remove_node(&mut next, node_id) {
            Ok(effect) => {
                let label = format!("remove {}", node_id);
                self.commit(
                    HistoryEntry::new(ActionKind::RemoveNode, label),
                    next,
                    &effect.touched,
                );
                true
            }
            Err(err) => {
                self.reject("remove_node", err);
                false
            }
        }
    }

    /// Updates the viewport. Committed to the snapshot and pushed to the
    /// view, but not recorded in history: panning between edits is not an
    /// undoable action.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.snapshot.viewport = viewport;
        self.view.set_viewport(&self.snapshot.viewport);
    }

    /// Steps the history cursor back and re-applies the restored snapshot.
    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(restore) => {
                self.restore(restore);
                true
            }
            None => false,
        }
    }

    /// Steps the history cursor forward and re-applies the restored
    /// snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(restore) => {
                self.restore(restore);
                true
            }
            None => false,
        }
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    /// Replaces the session state with a stored workflow. History restarts
    /// from the loaded state, which is considered clean.
    pub fn load(&mut self, stored: StoredWorkflow) {
        let mut snapshot = GraphSnapshot {
            nodes: stored.nodes,
            edges: stored.edges,
            viewport: stored.viewport,
            workflow: WorkflowData {
                name: stored.name.clone(),
                interface_inputs: stored.interface_inputs,
                interface_outputs: stored.interface_outputs,
            },
        };
        interface::ensure_placeholder(&mut snapshot.workflow);
        interface::sync_boundary_nodes(&mut snapshot);

        self.snapshot = snapshot;
        self.history = History::default();
        let label = format!("load '{}'", stored.name);
        self.history
            .record(HistoryEntry::new(ActionKind::Load, label), &self.snapshot);
        self.history.mark_saved();
        let touched: Vec<NodeId> = self.snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        self.refresh_view(&touched);
    }

    /// Exports the current state in the persistence shape.
    pub fn save(&self) -> StoredWorkflow {
        StoredWorkflow {
            name: self.snapshot.workflow.name.clone(),
            nodes: self.snapshot.nodes.clone(),
            edges: self.snapshot.edges.clone(),
            interface_inputs: self.snapshot.workflow.interface_inputs.clone(),
            interface_outputs: self.snapshot.workflow.interface_outputs.clone(),
            viewport: self.snapshot.viewport,
        }
    }

    /// Swaps in a snapshot restored by history navigation. Restored states
    /// can carry different slot shapes (an undone placeholder conversion,
    /// for instance), so every surviving node gets its internals refreshed.
    fn restore(&mut self, restore: Restore) {
        self.snapshot = match restore {
            Restore::Snapshot(snapshot) => *snapshot,
            Restore::Empty => GraphSnapshot::default(),
        };
        let touched: Vec<NodeId> = self.snapshot.nodes.iter().map(|n| n.id.clone()).collect();
        self.refresh_view(&touched);
    }

    fn commit(&mut self, entry: HistoryEntry, next: GraphSnapshot, touched: &[NodeId]) {
        self.snapshot = next;
        self.history.record(entry, &self.snapshot);
        self.refresh_view(touched);
    }

    fn refresh_view(&mut self, touched: &[NodeId]) {
        self.view.set_nodes(&self.snapshot.nodes);
        self.view.set_edges(&self.snapshot.edges);
        self.view.set_viewport(&self.snapshot.viewport);
        if !touched.is_empty() {
            self.view.update_node_internals(touched);
        }
    }

    /// Swallow-and-log policy from the error design: validation rejections
    /// are an expected outcome of drag input and logged at debug level;
    /// missing state aborts the attempt with a warning. The caller only
    /// observes that the gesture had no effect.
    fn reject(&self, operation: &str, err: GraphError) {
        match err {
            GraphError::Rejected(reason) => {
                debug!(session = %self.id, %operation, %reason, "gesture rejected");
            }
            other => {
                warn!(session = %self.id, %operation, error = %other, "operation aborted");
            }
        }
    }
}

/// Explicit per-process session registry; sessions are addressed by id and
/// passed around, never reached through ambient singletons.
pub struct SessionRegistry {
    registry: Arc<NodeRegistry>,
    sessions: AHashMap<SessionId, GraphSession>,
}

impl SessionRegistry {
    pub fn new(registry: Arc<NodeRegistry>) -> Self {
        Self {
            registry,
            sessions: AHashMap::new(),
        }
    }

    /// Opens a session for the given id, replacing any previous session
    /// under the same id.
    pub fn open(&mut self, id: impl Into<SessionId>, view: Box<dyn ViewSync>) -> &mut GraphSession {
        let id = id.into();
        let session = GraphSession::new(id.clone(), Arc::clone(&self.registry), view);
        match self.sessions.entry(id) {
            Entry::Occupied(mut occupied) => {
                occupied.insert(session);
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(session),
        }
    }

    pub fn get(&self, id: &str) -> Option<&GraphSession> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut GraphSession> {
        self.sessions.get_mut(id)
    }

    /// Closes a session, dropping its history. Returns whether it existed.
    pub fn close(&mut self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SessionId> {
        self.sessions.keys()
    }
}
