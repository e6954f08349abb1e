//! Tests for connection gestures: create, re-drag, disconnect, node
//! removal and dynamic type propagation.
mod common;
use common::{add, build_session, order_of, target_handle, wire};
use patchbay::prelude::*;

#[test]
fn connects_compatible_slots() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");

    let edge_id = wire(&mut session, (&text, "out"), (&llm, "prompt"));

    let snapshot = session.snapshot();
    let edge = snapshot.edge(&edge_id).unwrap();
    assert_eq!(edge.source, text);
    assert_eq!(edge.source_handle, "out");
    assert_eq!(edge.target, llm);
    assert_eq!(edge.target_handle, "prompt");
    assert_eq!(edge.style.data_type, DataType::String);
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::Connect)
    );
}

#[test]
fn edge_ids_are_allocated_deterministically() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");

    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));
    assert_eq!(e1, "e1");
    assert_eq!(e2, "e2");
}

#[test]
fn rejects_self_loop() {
    let mut session = build_session();
    let llm = add(&mut session, "llmNode");

    let result = session.connect(
        Endpoint::new(llm.clone(), "completion"),
        Endpoint::new(llm.clone(), "prompt"),
    );
    assert_eq!(result, None);
    assert!(session.snapshot().edges.is_empty());
    // The rejection recorded nothing.
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::AddNode)
    );
}

#[test]
fn rejects_incompatible_types() {
    let mut session = build_session();
    let vec = add(&mut session, "vecNode");
    let llm = add(&mut session, "llmNode");

    let result = session.connect(
        Endpoint::new(vec, "out"),
        Endpoint::new(llm, "prompt"),
    );
    assert_eq!(result, None);
    assert!(session.snapshot().edges.is_empty());
}

#[test]
fn widened_connection_is_accepted() {
    // INTEGER widens into a STRING input.
    let mut session = build_session();
    let int = add(&mut session, "intNode");
    let llm = add(&mut session, "llmNode");

    let edge_id = wire(&mut session, (&int, "out"), (&llm, "prompt"));
    assert!(session.snapshot().edge(&edge_id).is_some());
}

#[test]
fn occupied_single_input_is_auto_replaced() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");

    wire(&mut session, (&t1, "out"), (&llm, "prompt"));
    let second = wire(&mut session, (&t2, "out"), (&llm, "prompt"));

    // The occupant was disconnected first; only the new wire survives.
    let snapshot = session.snapshot();
    assert_eq!(snapshot.edges.len(), 1);
    let edge = snapshot.edge(&second).unwrap();
    assert_eq!(edge.source, t2);
}

#[test]
fn multi_input_appends_and_inserts_at_hovered_position() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let t3 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");

    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));
    assert_eq!(order_of(&session, &prompt, "segments"), vec![e1.clone(), e2.clone()]);

    // Dropping on the sub-handle at position 1 inserts between e1 and e2.
    let e3 = wire(&mut session, (&t3, "out"), (&prompt, "segments__1"));
    assert_eq!(
        order_of(&session, &prompt, "segments"),
        vec![e1.clone(), e3.clone(), e2.clone()]
    );
    assert_eq!(target_handle(&session, &e1), "segments__0");
    assert_eq!(target_handle(&session, &e3), "segments__1");
    assert_eq!(target_handle(&session, &e2), "segments__2");
}

#[test]
fn reconnect_to_canvas_deletes_the_edge() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");
    let edge_id = wire(&mut session, (&text, "out"), (&llm, "prompt"));

    assert!(session.reconnect(&edge_id, EdgeEnd::Target, DropTarget::Canvas));
    assert!(session.snapshot().edge(&edge_id).is_none());
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::Delete)
    );
}

#[test]
fn unplugging_the_source_end_to_canvas_deletes_the_edge() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");
    let edge_id = wire(&mut session, (&text, "out"), (&llm, "prompt"));

    assert!(session.reconnect(&edge_id, EdgeEnd::Source, DropTarget::Canvas));
    assert!(session.snapshot().edge(&edge_id).is_none());
    assert!(session.snapshot().edges_into(&llm, "prompt").is_empty());
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::Delete)
    );
}

#[test]
fn reconnect_onto_occupied_single_input_keeps_the_edge() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let l1 = add(&mut session, "llmNode");
    let l2 = add(&mut session, "llmNode");
    let grabbed = wire(&mut session, (&t1, "out"), (&l1, "prompt"));
    wire(&mut session, (&t2, "out"), (&l2, "prompt"));

    let moved = session.reconnect(
        &grabbed,
        EdgeEnd::Target,
        DropTarget::Slot {
            endpoint: Endpoint::new(l2.clone(), "prompt"),
            index: None,
        },
    );
    assert!(!moved);

    // A mid-drag slip must not destroy either connection.
    let edge = session.snapshot().edge(&grabbed).unwrap();
    assert_eq!(edge.target, l1);
    assert_eq!(session.snapshot().edges.len(), 2);
}

#[test]
fn reconnect_onto_incompatible_slot_deletes_the_edge() {
    let mut session = build_session();
    let vec = add(&mut session, "vecNode");
    let text = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");
    // Start with a valid wire from the text source.
    let edge_id = wire(&mut session, (&text, "out"), (&llm, "prompt"));

    // Re-dragging the source end onto the ARRAY output invalidates the
    // pair, and the detached wire is dropped instead of snapping back.
    let mutated = session.reconnect(
        &edge_id,
        EdgeEnd::Source,
        DropTarget::Slot {
            endpoint: Endpoint::new(vec, "out"),
            index: None,
        },
    );
    assert!(mutated);
    assert!(session.snapshot().edge(&edge_id).is_none());
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::Delete)
    );
}

#[test]
fn reconnect_moves_between_multi_positions() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");
    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));

    // Drag e1 from position 0 to the end of the same slot.
    let moved = session.reconnect(
        &e1,
        EdgeEnd::Target,
        DropTarget::Slot {
            endpoint: Endpoint::new(prompt.clone(), "segments"),
            index: Some(1),
        },
    );
    assert!(moved);
    assert_eq!(order_of(&session, &prompt, "segments"), vec![e2.clone(), e1.clone()]);
    assert_eq!(target_handle(&session, &e2), "segments__0");
    assert_eq!(target_handle(&session, &e1), "segments__1");
}

#[test]
fn disconnect_heals_the_order_list() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let t3 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");
    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));
    let e3 = wire(&mut session, (&t3, "out"), (&prompt, "segments"));

    assert!(session.disconnect(&e2));
    assert_eq!(order_of(&session, &prompt, "segments"), vec![e1.clone(), e3.clone()]);
    assert_eq!(target_handle(&session, &e1), "segments__0");
    assert_eq!(target_handle(&session, &e3), "segments__1");
}

#[test]
fn disconnect_unknown_edge_is_a_no_op() {
    let mut session = build_session();
    add(&mut session, "textNode");
    assert!(!session.disconnect("e99"));
}

#[test]
fn remove_node_cascades_edge_removal() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");
    let llm = add(&mut session, "llmNode");
    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));
    let e3 = wire(&mut session, (&prompt, "prompt"), (&llm, "prompt"));

    assert!(session.remove_node(&t1));

    let snapshot = session.snapshot();
    assert!(snapshot.node(&t1).is_none());
    assert!(snapshot.edge(&e1).is_none());
    assert!(snapshot.edge(&e2).is_some());
    assert!(snapshot.edge(&e3).is_some());
    // The surviving order list was re-indexed.
    assert_eq!(order_of(&session, &prompt, "segments"), vec![e2.clone()]);
    assert_eq!(target_handle(&session, &e2), "segments__0");
}

#[test]
fn reorder_inputs_applies_and_records() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let prompt = add(&mut session, "promptNode");
    let e1 = wire(&mut session, (&t1, "out"), (&prompt, "segments"));
    let e2 = wire(&mut session, (&t2, "out"), (&prompt, "segments"));

    assert!(session.reorder_inputs(&prompt, "segments", vec![e2.clone(), e1.clone()]));
    assert_eq!(order_of(&session, &prompt, "segments"), vec![e2, e1]);
    assert_eq!(
        session.history().current_entry().map(|e| e.kind),
        Some(ActionKind::Reorder)
    );

    assert!(!session.reorder_inputs(&prompt, "segments", vec!["e9".into()]));
}

#[test]
fn placeholder_input_adopts_concrete_type_and_grows_successor() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let any = add(&mut session, "anyNode");

    let edge_id = wire(&mut session, (&text, "out"), (&any, "in_0"));

    let snapshot = session.snapshot();
    let node = snapshot.node(&any).unwrap();
    let converted = &node.inputs["in_0"].slot;
    assert_eq!(converted.data_type, DataType::String);
    assert!(!converted.allow_dynamic_type);

    // The next placeholder in the series appeared alongside.
    let successor = &node.inputs["in_1"].slot;
    assert!(successor.is_placeholder());
    assert_eq!(snapshot.edge(&edge_id).unwrap().style.data_type, DataType::String);
}

#[test]
fn placeholder_output_adopts_type_from_its_target() {
    let mut session = build_session();
    let any = add(&mut session, "anyNode");
    let llm = add(&mut session, "llmNode");

    wire(&mut session, (&any, "out_0"), (&llm, "prompt"));

    let node = session.snapshot().node(&any).unwrap();
    assert_eq!(node.outputs["out_0"].slot.data_type, DataType::String);
    assert!(node.outputs["out_1"].slot.is_placeholder());
}

#[test]
fn conversion_happens_at_most_once_per_slot() {
    let mut session = build_session();
    let t1 = add(&mut session, "textNode");
    let t2 = add(&mut session, "textNode");
    let any = add(&mut session, "anyNode");

    wire(&mut session, (&t1, "out"), (&any, "in_0"));
    // Replacing the occupant of the now-concrete slot must not mint
    // another successor.
    wire(&mut session, (&t2, "out"), (&any, "in_0"));

    let node = session.snapshot().node(&any).unwrap();
    assert_eq!(node.inputs.len(), 2);
    assert!(node.inputs.contains_key("in_0"));
    assert!(node.inputs.contains_key("in_1"));
}

#[test]
fn two_placeholders_connect_without_converting() {
    let mut session = build_session();
    let a1 = add(&mut session, "anyNode");
    let a2 = add(&mut session, "anyNode");

    wire(&mut session, (&a1, "out_0"), (&a2, "in_0"));

    let snapshot = session.snapshot();
    assert!(snapshot.node(&a1).unwrap().outputs["out_0"].slot.is_placeholder());
    assert!(snapshot.node(&a2).unwrap().inputs["in_0"].slot.is_placeholder());
    assert_eq!(snapshot.node(&a2).unwrap().inputs.len(), 1);
}

#[test]
fn boundary_connection_converts_the_workflow_interface() {
    let mut session = build_session();
    let input_node = add(&mut session, GRAPH_INPUT_NODE);
    let llm = add(&mut session, "llmNode");

    // The freshly added boundary node projects the interface placeholder.
    {
        let node = session.snapshot().node(&input_node).unwrap();
        assert!(node.outputs["input_0"].slot.is_placeholder());
    }

    wire(&mut session, (&input_node, "input_0"), (&llm, "prompt"));

    let snapshot = session.snapshot();
    let interface = &snapshot.workflow.interface_inputs;
    assert_eq!(interface["input_0"].data_type, DataType::String);
    assert!(interface["input_1"].is_placeholder());

    // The pseudo-node was re-projected from the rewritten interface.
    let node = snapshot.node(&input_node).unwrap();
    assert_eq!(node.outputs["input_0"].slot.data_type, DataType::String);
    assert!(node.outputs["input_1"].slot.is_placeholder());
}

#[test]
fn graph_output_boundary_converts_the_output_interface() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let output_node = add(&mut session, GRAPH_OUTPUT_NODE);

    wire(&mut session, (&text, "out"), (&output_node, "output_0"));

    let snapshot = session.snapshot();
    let interface = &snapshot.workflow.interface_outputs;
    assert_eq!(interface["output_0"].data_type, DataType::String);
    assert!(interface["output_1"].is_placeholder());

    let node = snapshot.node(&output_node).unwrap();
    assert_eq!(node.inputs["output_0"].slot.data_type, DataType::String);
}

#[test]
fn subflow_mirror_converts_without_touching_the_interface() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let group = add(&mut session, SUBFLOW_NODE);

    wire(&mut session, (&text, "out"), (&group, "input_conv_0"));

    let snapshot = session.snapshot();
    let node = snapshot.node(&group).unwrap();
    let mirror = node.group_interface.as_ref().unwrap();
    assert_eq!(mirror.inputs["input_conv_0"].data_type, DataType::String);
    assert!(!mirror.inputs["input_conv_0"].allow_dynamic_type);
    assert!(mirror.inputs["input_conv_1"].is_placeholder());

    // The workflow-level interface is not involved on this path.
    assert!(snapshot.workflow.interface_inputs.is_empty());
    assert!(snapshot.workflow.interface_outputs.is_empty());
}

#[test]
fn enum_tagged_input_accepts_a_string_source() {
    let mut session = build_session();
    let text = add(&mut session, "textNode");
    let llm = add(&mut session, "llmNode");

    let edge_id = wire(&mut session, (&text, "out"), (&llm, "model"));
    assert!(session.snapshot().edge(&edge_id).is_some());
}
