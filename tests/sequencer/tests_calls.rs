//! Rule calls: enter/exit emitters, stack balance and rule-exit draining.

use sequencer::nav::search;
use sequencer::{RcStack, SyntacticRole, UNREACHABLE, render_graph};

use crate::helpers::grammars::{
    call_before_assignment, nested_calls, recursive_optional, single_call,
};
use crate::helpers::walk::{apply_balanced, keywords, walk};

#[test]
fn test_single_call_render() {
    let f = single_call();
    let graph = f.graph("Foo");
    let expected = "\
start -> val=ID
  -> 'x'
  'x' -> >>Bar
  >>Bar -> val=ID
val=ID -> stop
  -> <<Bar
  <<Bar -> 'y'
  'y' -> stop
";
    assert_eq!(render_graph(&f.grammar, &graph), expected);
}

#[test]
fn test_single_call_walk_is_balanced() {
    let f = single_call();
    let graph = f.graph("Foo");
    let legs = walk(&graph, &[Some(f.el("val")), None]);

    let roles: Vec<_> = legs[0].iter().map(|id| graph.role(*id)).collect();
    assert_eq!(
        roles,
        vec![
            SyntacticRole::UnassignedKeyword,
            SyntacticRole::UnassignedParserRuleEnter
        ]
    );
    assert_eq!(keywords(&f.grammar, &graph, &legs[1]), vec!["y"]);
}

#[test]
fn test_nested_calls_drain_in_order() {
    let f = nested_calls();
    let graph = f.graph("Foo");
    let legs = walk(&graph, &[Some(f.el("val")), None]);

    let entered: Vec<_> = legs[0].iter().map(|id| graph.node(*id).element()).collect();
    assert_eq!(entered, vec![Some(f.el("call_bar")), Some(f.el("call_baz"))]);

    let val = graph.absorber_for(f.el("val")).unwrap();
    let into_stop = graph.transition_to(val, None).unwrap();
    assert!(graph.involves_rule_exit(into_stop));
    let exited: Vec<_> = legs[1]
        .iter()
        .filter(|id| graph.role(**id).is_rule_call_exit())
        .map(|id| graph.node(*id).element())
        .collect();
    assert_eq!(exited, vec![Some(f.el("call_baz")), Some(f.el("call_bar"))]);
    assert_eq!(keywords(&f.grammar, &graph, &legs[1]), vec!["y", "z"]);
}

#[test]
fn test_stack_decides_exit_reachability() {
    let f = single_call();
    let graph = f.graph("Foo");
    let val = graph.absorber_for(f.el("val")).unwrap();
    let into_stop = graph.transition_to(val, None).unwrap();

    let open = RcStack::new().push(f.el("call"));
    assert_eq!(graph.distance_to_absorber(into_stop, &open), 2);

    let wrong = RcStack::new().push(f.el("x"));
    assert_eq!(graph.distance_to_absorber(into_stop, &wrong), UNREACHABLE);
    assert_eq!(
        graph.distance_to(into_stop, search::absorber(), search::absorber(), &wrong),
        UNREACHABLE
    );
}

#[test]
fn test_summary_path_is_balanced() {
    let f = nested_calls();
    let graph = f.graph("Foo");
    let into_val = graph.transition_to(graph.start(), Some(f.el("val"))).unwrap();
    let summary = graph.summarize(into_val, &RcStack::new()).unwrap();

    assert_eq!(summary.source, SyntacticRole::Start);
    assert_eq!(summary.target, SyntacticRole::AssignedTerminalRuleCall);
    assert!(
        summary
            .emitters
            .iter()
            .all(|step| step.role == SyntacticRole::UnassignedParserRuleEnter)
    );

    let path = graph
        .shortest_path_to_absorber(into_val, &RcStack::new())
        .unwrap();
    let stack = apply_balanced(&graph, &path, &RcStack::new());
    assert_eq!(stack.len(), 2);
    assert_eq!(stack.peek(), Some(f.el("call_baz")));
}

#[test]
fn test_recursive_optional_terminates() {
    let f = recursive_optional();
    let graph = f.graph("Foo");
    let into_stop = graph.transition_to(graph.start(), None).unwrap();
    let empty = RcStack::new();

    // 'a' then stop, without descending into the recursion
    assert_eq!(graph.distance_to_absorber(into_stop, &empty), 1);
    let path = graph.shortest_path_to_absorber(into_stop, &empty).unwrap();
    assert_eq!(keywords(&f.grammar, &graph, &path), vec!["a"]);

    // inside an open call: 'a' then <<Foo
    let exit_of_call = search::rule_call_exit(f.el("call"));
    let nested = graph.shortest_path_to(
        into_stop,
        exit_of_call,
        search::absorber(),
        &empty.push(f.el("call")),
        true,
    );
    let nested = nested.unwrap();
    let roles: Vec<_> = nested.iter().map(|id| graph.role(*id)).collect();
    assert_eq!(
        roles,
        vec![
            SyntacticRole::UnassignedKeyword,
            SyntacticRole::UnassignedParserRuleExit
        ]
    );
}

// ============================================================================
// CALLS OPENED AND CLOSED WITHIN ONE TRANSITION
// ============================================================================

#[test]
fn test_call_closed_before_next_absorber() {
    let f = call_before_assignment(false);
    let graph = f.graph("Foo");
    let expected = "\
start -> name=ID
  -> 'x'
  'x' -> >>Bar
  >>Bar -> 'b'
  'b' -> <<Bar
  <<Bar -> name=ID
name=ID -> stop
";
    assert_eq!(render_graph(&f.grammar, &graph), expected);

    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    let empty = RcStack::new();
    let path = graph.shortest_path_to_absorber(into_name, &empty).unwrap();
    assert_eq!(path.len(), 4);
    assert_eq!(graph.distance_to_absorber(into_name, &empty), 4);
    assert!(apply_balanced(&graph, &path, &empty).is_empty());

    let summary = graph.summarize(into_name, &empty).unwrap();
    let roles: Vec<_> = summary.emitters.iter().map(|step| step.role).collect();
    assert_eq!(
        roles,
        vec![
            SyntacticRole::UnassignedKeyword,
            SyntacticRole::UnassignedParserRuleEnter,
            SyntacticRole::UnassignedKeyword,
            SyntacticRole::UnassignedParserRuleExit,
        ]
    );
    assert!(!summary.ambiguous);

    let legs = walk(&graph, &[Some(f.el("name")), None]);
    assert_eq!(keywords(&f.grammar, &graph, &legs[0]), vec!["x", "b"]);
    assert!(legs[1].is_empty());
}

#[test]
fn test_exit_of_unopened_call_has_no_path() {
    let f = single_call();
    let graph = f.graph("Foo");
    let val = graph.absorber_for(f.el("val")).unwrap();
    let into_stop = graph.transition_to(val, None).unwrap();

    assert!(graph.shortest_path_to_absorber(into_stop, &RcStack::new()).is_none());
    assert!(graph.summarize(into_stop, &RcStack::new()).is_none());
    let open = RcStack::new().push(f.el("call"));
    let path = graph.shortest_path_to_absorber(into_stop, &open).unwrap();
    assert_eq!(keywords(&f.grammar, &graph, &path), vec!["y"]);
}

#[test]
fn test_nullable_callee_can_be_skipped() {
    let f = call_before_assignment(true);
    let graph = f.graph("Foo");
    let expected = "\
start -> name=ID
  -> 'x'
  'x' -> >>Bar
  >>Bar -> 'b'?, <<Bar
  'b'? -> <<Bar
  <<Bar -> name=ID
name=ID -> stop
";
    assert_eq!(render_graph(&f.grammar, &graph), expected);

    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    let empty = RcStack::new();

    // 'x' >>Bar <<Bar, leaving 'b' out
    let path = graph.shortest_path_to_absorber(into_name, &empty).unwrap();
    let roles: Vec<_> = path.iter().map(|id| graph.role(*id)).collect();
    assert_eq!(
        roles,
        vec![
            SyntacticRole::UnassignedKeyword,
            SyntacticRole::UnassignedParserRuleEnter,
            SyntacticRole::UnassignedParserRuleExit,
        ]
    );
    assert_eq!(graph.distance_to_absorber(into_name, &empty), 3);

    let with_b = graph
        .shortest_path_to_element(into_name, f.el("b"), &empty, true)
        .unwrap();
    assert_eq!(keywords(&f.grammar, &graph, &with_b), vec!["x", "b"]);
    assert!(graph.is_syntactically_ambiguous(into_name));
}
