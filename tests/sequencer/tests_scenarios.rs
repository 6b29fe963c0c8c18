//! Graph shape of rules without rule calls.

use rstest::rstest;
use sequencer::{Cardinality, RcStack, SyntacticRole, render_graph};

use crate::helpers::grammars::{
    Fixture, diamond, keyword_sequence, long_sequence, repeated_keyword, separator_list,
    single_assignment,
};
use crate::helpers::walk::{keywords, walk};

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn test_single_assignment() {
    let f = single_assignment();
    let graph = f.graph("Foo");
    let name = graph.absorber_for(f.el("name")).unwrap();
    let stop = graph.stop().unwrap();

    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    assert_eq!(graph.followers(into_name), &[name]);
    assert!(!graph.has_emitters(into_name));

    let into_stop = graph.transition_to(name, None).unwrap();
    assert_eq!(graph.followers(into_stop), &[stop]);
    assert_eq!(graph.out_transitions(graph.start()).count(), 1);
    assert_eq!(graph.out_transitions(name).count(), 1);
    assert_eq!(graph.out_transitions(stop).count(), 0);
}

#[test]
fn test_keyword_sequence_chains() {
    let f = keyword_sequence();
    let graph = f.graph("Foo");
    let legs = walk(&graph, &[Some(f.el("name")), None]);

    assert_eq!(keywords(&f.grammar, &graph, &legs[0]), vec!["a"]);
    assert_eq!(keywords(&f.grammar, &graph, &legs[1]), vec!["b"]);
}

#[test]
fn test_diamond_shares_emitter() {
    let f = diamond();
    let graph = f.graph("Foo");
    let left = graph.absorber_for(f.el("left")).unwrap();
    let right = graph.absorber_for(f.el("right")).unwrap();

    let from_left = graph.transition_to(left, None).unwrap();
    let from_right = graph.transition_to(right, None).unwrap();
    assert_eq!(graph.followers(from_left), graph.followers(from_right));

    let shared = graph.followers(from_left)[0];
    assert_eq!(graph.node(shared).element(), Some(f.el("x")));
    assert_eq!(graph.role(shared), SyntacticRole::UnassignedKeyword);
    assert_eq!(graph.emitters().count(), 1);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[rstest]
#[case::single(single_assignment(), 1)]
#[case::keywords(keyword_sequence(), 1)]
#[case::diamond(diamond(), 2)]
#[case::long(long_sequence(), 2)]
fn test_one_absorber_per_assigned_element(#[case] f: Fixture, #[case] assigned: usize) {
    let graph = f.graph("Foo");
    let roles: Vec<_> = graph.absorbers().map(|id| graph.role(id)).collect();

    // START, every assigned leaf, STOP
    assert_eq!(roles.len(), assigned + 2);
    assert_eq!(roles.iter().filter(|r| r.is_assigned()).count(), assigned);
    assert_eq!(
        roles.iter().filter(|r| **r == SyntacticRole::Stop).count(),
        1
    );
}

#[test]
fn test_chains_reconstruct_keyword_sequence() {
    let f = long_sequence();
    let graph = f.graph("Foo");
    let legs = walk(&graph, &[Some(f.el("name")), Some(f.el("val")), None]);
    let emitted: Vec<_> = legs
        .iter()
        .map(|leg| keywords(&f.grammar, &graph, leg))
        .collect();

    assert_eq!(
        emitted,
        vec![vec!["a", "b"], vec!["c", "d"], vec!["e"]]
    );
}

#[rstest]
#[case::single(single_assignment())]
#[case::keywords(keyword_sequence())]
#[case::diamond(diamond())]
#[case::long(long_sequence())]
fn test_rebuild_is_structurally_equal(#[case] f: Fixture) {
    let first = f.graph("Foo");
    let second = f.graph("Foo");
    assert_eq!(first.len(), second.len());
    assert_eq!(
        render_graph(&f.grammar, &first),
        render_graph(&f.grammar, &second)
    );
}

#[test]
fn test_distances_between_absorbers() {
    let f = long_sequence();
    let graph = f.graph("Foo");
    let empty = RcStack::new();
    let name = graph.absorber_for(f.el("name")).unwrap();

    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    let into_val = graph.transition_to(name, Some(f.el("val"))).unwrap();
    assert_eq!(graph.distance_to_absorber(into_name, &empty), 2);
    assert_eq!(graph.distance_to_absorber(into_val, &empty), 2);
}

// ============================================================================
// REPETITION
// ============================================================================

#[rstest]
#[case::many(Cardinality::ZeroOrMore, 0, vec![])]
#[case::one_or_more(Cardinality::OneOrMore, 1, vec!["a"])]
fn test_repeated_keyword_before_assignment(
    #[case] cardinality: Cardinality,
    #[case] distance: u32,
    #[case] emitted: Vec<&str>,
) {
    let f = repeated_keyword(cardinality);
    let graph = f.graph("Foo");
    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    let empty = RcStack::new();

    assert_eq!(graph.distance_to_absorber(into_name, &empty), distance);
    let path = graph.shortest_path_to_absorber(into_name, &empty).unwrap();
    assert_eq!(keywords(&f.grammar, &graph, &path), emitted);

    // the keyword loops back into itself
    let a = graph.emitters().next().unwrap();
    assert_eq!(graph.node(a).element(), Some(f.el("a")));
    assert!(graph.followers(a).contains(&a));
    assert!(graph.is_syntactically_ambiguous(into_name));
}

#[test]
fn test_separator_list() {
    let f = separator_list();
    let graph = f.graph("Foo");
    let expected = "\
start -> name=ID
name=ID -> names+=ID
  -> ','
  ',' -> names+=ID
name=ID -> stop
  -> 'end'
  'end' -> stop
names+=ID -> names+=ID
  -> ','
  ',' -> names+=ID
names+=ID -> stop
  -> 'end'
  'end' -> stop
";
    assert_eq!(render_graph(&f.grammar, &graph), expected);

    let names = Some(f.el("names"));
    let legs = walk(&graph, &[Some(f.el("name")), names, names, None]);
    let emitted: Vec<_> = legs
        .iter()
        .map(|leg| keywords(&f.grammar, &graph, leg))
        .collect();
    assert_eq!(
        emitted,
        vec![vec![], vec![","], vec![","], vec!["end"]]
    );
    assert!(graph.ambiguous_transitions().is_empty());
}
