//! Syntactic ambiguity of transitions.

use rstest::rstest;

use crate::helpers::grammars::{
    Branches, bar_branches, keyword_choice, keyword_sequence, recursive_assigned,
    recursive_optional,
};

#[test]
fn test_alternative_keywords_are_ambiguous() {
    let f = keyword_choice();
    let graph = f.graph("Foo");
    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    assert!(graph.is_syntactically_ambiguous(into_name));
    assert_eq!(graph.ambiguous_transitions(), vec![into_name]);
}

#[test]
fn test_plain_sequence_is_unambiguous() {
    let f = keyword_sequence();
    let graph = f.graph("Foo");
    assert!(graph.ambiguous_transitions().is_empty());
}

#[test]
fn test_recursive_optional_is_ambiguous() {
    // 'a' may be followed by another Foo or end the rule, both reaching STOP
    let f = recursive_optional();
    let graph = f.graph("Foo");
    let into_stop = graph.transition_to(graph.start(), None).unwrap();
    assert!(graph.is_syntactically_ambiguous(into_stop));
}

#[test]
fn test_recursive_assigned_is_unambiguous() {
    let f = recursive_assigned();
    let graph = f.graph("Foo");
    assert!(graph.transition_to(graph.start(), Some(f.el("child"))).is_some());
    assert!(graph.transition_to(graph.start(), None).is_some());
    assert!(graph.ambiguous_transitions().is_empty());
}

#[rstest]
#[case::single(Branches::Single, false)]
#[case::distinct_calls(Branches::DistinctCalls, false)]
#[case::shared_call(Branches::SharedCall, true)]
fn test_return_routes(#[case] branches: Branches, #[case] ambiguous: bool) {
    let f = bar_branches(branches);
    let graph = f.graph("Foo");
    let val = graph.absorber_for(f.el("val")).unwrap();
    let into_name = graph.transition_to(val, Some(f.el("name"))).unwrap();
    assert_eq!(graph.is_syntactically_ambiguous(into_name), ambiguous);
}

#[test]
fn test_entering_either_call_is_ambiguous() {
    let f = bar_branches(Branches::DistinctCalls);
    let graph = f.graph("Foo");
    let into_val = graph.transition_to(graph.start(), Some(f.el("val"))).unwrap();
    assert_eq!(graph.followers(into_val).len(), 2);
    assert!(graph.is_syntactically_ambiguous(into_val));
}
