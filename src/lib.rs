//! # Patchbay - Graph Connection and History Engine
//!
//! **Patchbay** is the authoritative in-memory graph model behind a visual
//! node-graph workflow editor. Users wire nodes together on a canvas; this
//! crate keeps the graph's structural data, slot typing and edit history
//! consistent across every connection gesture. It owns three tightly
//! coupled pieces:
//!
//! 1. **Slot-type compatibility and dynamic-type propagation** - a pure
//!    rule engine deciding which slots may connect, plus the mutation that
//!    lets CONVERTIBLE_ANY placeholder slots adopt the concrete type of
//!    their first peer.
//! 2. **Ordered multi-input connections** - per-slot ordered edge lists
//!    with synthetic `"<key>__<index>"` sub-handles that never drift out of
//!    step with the edges themselves.
//! 3. **Snapshot-based undo/redo** - full-state history per editor tab
//!    with dirty/saved tracking and capped capacity.
//!
//! Rendering, node execution and persistence transports are external
//! collaborators: the crate talks to them through the [`session::ViewSync`]
//! adapter, the definition registry and the [`session::StoredWorkflow`]
//! shape, and never reaches past those seams.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use patchbay::prelude::*;
//! use std::sync::Arc;
//!
//! fn main() {
//!     // Node definitions come from an external catalogue; here we build a
//!     // tiny one by hand.
//!     let mut definitions = NodeRegistry::new();
//!     definitions.register(
//!         NodeDefinition::new("textNode")
//!             .with_output(SlotInfo::concrete("out", DataType::String)),
//!     );
//!     definitions.register(
//!         NodeDefinition::new("promptNode")
//!             .with_input(SlotInfo::concrete("segments", DataType::String).with_multi(true)),
//!     );
//!
//!     // One session per editor tab. The view adapter would normally drive
//!     // the canvas; NullView keeps this example headless.
//!     let mut session = GraphSession::new("tab-1", Arc::new(definitions), Box::new(NullView));
//!
//!     let text = session
//!         .add_node("textNode", Position { x: 0.0, y: 0.0 })
//!         .unwrap();
//!     let prompt = session
//!         .add_node("promptNode", Position { x: 320.0, y: 0.0 })
//!         .unwrap();
//!
//!     // Wire them up. Rejected gestures simply return None and leave the
//!     // snapshot untouched.
//!     let edge = session.connect(
//!         Endpoint::new(text.clone(), "out"),
//!         Endpoint::new(prompt.clone(), "segments"),
//!     );
//!     assert!(edge.is_some());
//!
//!     // Every committed mutation is one history step.
//!     assert!(session.undo());
//!     assert!(session.redo());
//! }
//! ```

pub mod connection;
pub mod error;
pub mod graph;
pub mod history;
pub mod interface;
pub mod multi_input;
pub mod prelude;
pub mod registry;
pub mod session;
pub mod slot;
