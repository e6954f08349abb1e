//! Snapshot-based undo/redo history.
//!
//! A linear list of `{entry, snapshot}` items with a cursor. Index −1 means
//! "before the first recorded state"; navigating there restores a default,
//! empty snapshot instead of erroring. Recording while undone discards the
//! redo branch — there is no tree history.

use crate::graph::GraphSnapshot;
use serde::{Deserialize, Serialize};

/// Maximum number of retained snapshots per session. Older entries are
/// evicted from the front.
pub const DEFAULT_CAPACITY: usize = 100;

/// Category of a recorded action, used for undo-stack labelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Connect,
    Reconnect,
    Delete,
    Reorder,
    AddNode,
    RemoveNode,
    SetValue,
    Load,
}

/// Metadata describing one recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: ActionKind,
    pub label: String,
}

impl HistoryEntry {
    pub fn new(kind: ActionKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone)]
struct HistoryItem {
    entry: HistoryEntry,
    snapshot: GraphSnapshot,
}

/// What a successful undo/redo step restores.
#[derive(Debug, Clone, PartialEq)]
pub enum Restore {
    Snapshot(Box<GraphSnapshot>),
    /// The cursor moved before the first recorded state; the caller
    /// re-applies its default snapshot.
    Empty,
}

/// Per-session history state machine.
#[derive(Debug)]
pub struct History {
    items: Vec<HistoryItem>,
    /// Cursor into `items`; −1 is the pre-history position.
    current: isize,
    /// Index of the last persisted state; `Some(-1)` means the empty state
    /// was saved, `None` means never saved or the saved point was evicted.
    saved: Option<isize>,
    capacity: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl History {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            current: -1,
            saved: None,
            capacity: capacity.max(1),
        }
    }

    /// Deep-copies the snapshot, discards any redo branch, appends and
    /// advances the cursor. Over capacity, the oldest item is evicted and
    /// the saved mark is shifted down or invalidated.
    pub fn record(&mut self, entry: HistoryEntry, snapshot: &GraphSnapshot) {
        self.items.truncate((self.current + 1) as usize);
        if let Some(saved) = self.saved
            && saved > self.current
        {
            // The saved point sat on the discarded redo branch.
            self.saved = None;
        }

        self.items.push(HistoryItem {
            entry,
            snapshot: snapshot.clone(),
        });
        self.current += 1;

        if self.items.len() > self.capacity {
            self.items.remove(0);
            self.current -= 1;
            self.saved = match self.saved {
                Some(saved) if saved > 0 => Some(saved - 1),
                // Saved point (including the pre-history state) is no
                // longer reachable.
                _ => None,
            };
        }
    }

    /// Moves the cursor one step back. Returns `None` when already at the
    /// pre-history position.
    pub fn undo(&mut self) -> Option<Restore> {
        if self.current < 0 {
            return None;
        }
        self.current -= 1;
        if self.current < 0 {
            Some(Restore::Empty)
        } else {
            let snapshot = self.items[self.current as usize].snapshot.clone();
            Some(Restore::Snapshot(Box::new(snapshot)))
        }
    }

    /// Moves the cursor one step forward. Returns `None` at the newest
    /// recorded state.
    pub fn redo(&mut self) -> Option<Restore> {
        if self.current + 1 >= self.items.len() as isize {
            return None;
        }
        self.current += 1;
        let snapshot = self.items[self.current as usize].snapshot.clone();
        Some(Restore::Snapshot(Box::new(snapshot)))
    }

    pub fn can_undo(&self) -> bool {
        self.current >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.items.len() as isize
    }

    /// Marks the current cursor position as the persisted state.
    pub fn mark_saved(&mut self) {
        self.saved = Some(self.current);
    }

    /// Dirty whenever the cursor is away from the saved mark; a session
    /// that was never saved but has recorded edits counts as dirty.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.saved {
            Some(saved) => saved != self.current,
            None => self.current != -1,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> isize {
        self.current
    }

    /// Entry metadata in recording order, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.items.iter().map(|item| &item.entry)
    }

    /// Entry at the cursor, if the cursor is on a recorded state.
    pub fn current_entry(&self) -> Option<&HistoryEntry> {
        if self.current < 0 {
            return None;
        }
        self.items.get(self.current as usize).map(|item| &item.entry)
    }
}
