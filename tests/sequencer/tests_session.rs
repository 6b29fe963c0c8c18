//! Grammar sessions: caching, contexts, diagnostics and errors.

use std::sync::Arc;
use std::thread;

use sequencer::{
    Context, GrammarBuilder, GrammarSession, RcStack, SequencerError, SequencerOptions, Severity,
    SyntacticRole,
};

use crate::helpers::grammars::{
    EXPRESSION_SESSION, EXPRESSIONS, keyword_choice, keyword_sequence, unassigned_enum_call,
};

// ============================================================================
// CACHING
// ============================================================================

#[test]
fn test_build_all_covers_every_context() {
    let contexts = EXPRESSION_SESSION.contexts();
    assert_eq!(
        contexts,
        vec![
            Context::Rule(EXPRESSIONS.rule("Expr")),
            Context::Action(EXPRESSIONS.el("action")),
        ]
    );
    let graphs = EXPRESSION_SESSION.build_all().unwrap();
    assert_eq!(graphs.len(), contexts.len());
    assert!(graphs.iter().all(|graph| graph.stop().is_some()));
}

#[test]
fn test_concurrent_requests_share_one_graph() {
    let expr = EXPRESSIONS.rule("Expr");
    let handles: Vec<_> = (0..4)
        .map(|_| thread::spawn(move || EXPRESSION_SESSION.rule_graph(expr).unwrap()))
        .collect();
    let graphs: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    for graph in &graphs {
        assert!(Arc::ptr_eq(graph, &graphs[0]));
    }
}

// ============================================================================
// ACTION CONTEXTS
// ============================================================================

#[test]
fn test_action_graph_returns_through_first_call() {
    let f = &*EXPRESSIONS;
    let graph = EXPRESSION_SESSION.action_graph(f.el("action")).unwrap();
    assert_eq!(graph.context(), Context::Action(f.el("action")));

    let val = graph.absorber_for(f.el("val")).unwrap();
    let into_stop = graph.transition_to(val, None).unwrap();
    let summary = graph
        .summarize(into_stop, &RcStack::new().push(f.el("first")))
        .unwrap();
    let roles: Vec<_> = summary.emitters.iter().map(|step| step.role).collect();
    assert_eq!(roles, vec![SyntacticRole::UnassignedParserRuleExit]);
    assert_eq!(summary.target, SyntacticRole::Stop);

    let right = graph.absorber_for(f.el("right")).unwrap();
    let right_to_stop = graph.transition_to(right, None).unwrap();
    assert!(!graph.has_emitters(right_to_stop));
}

#[test]
fn test_action_absorber_role() {
    let f = &*EXPRESSIONS;
    let graph = EXPRESSION_SESSION.rule_graph(f.rule("Expr")).unwrap();
    let action = graph.absorber_for(f.el("action")).unwrap();
    assert_eq!(graph.role(action), SyntacticRole::AssignedActionCall);
    let into_right = graph.transition_to(action, Some(f.el("right"))).unwrap();
    let path = graph
        .shortest_path_to_element(into_right, f.el("plus"), &RcStack::new(), true)
        .unwrap();
    assert_eq!(path.len(), 1);
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

#[test]
fn test_ambiguity_diagnostics() {
    let f = keyword_choice();
    let session = f.session();
    let diagnostics = session
        .ambiguity_diagnostics(Context::Rule(f.rule("Foo")))
        .unwrap();

    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.severity, Severity::Warning);
    assert_eq!(diagnostic.rule, "Foo");
    assert_eq!(diagnostic.source, "start");
    assert_eq!(diagnostic.target, "name=ID");
    assert!(diagnostic.message.contains("ambiguous"));
}

#[test]
fn test_diagnostic_severity_from_options() {
    let f = keyword_choice();
    let options = SequencerOptions {
        ambiguity_severity: Severity::Error,
        ..SequencerOptions::reporting()
    };
    let session = GrammarSession::with_options(f.grammar.clone(), options);
    let diagnostics = session
        .ambiguity_diagnostics(Context::Rule(f.rule("Foo")))
        .unwrap();
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn test_unambiguous_grammar_has_no_diagnostics() {
    let f = keyword_sequence();
    let diagnostics = f
        .session()
        .ambiguity_diagnostics(Context::Rule(f.rule("Foo")))
        .unwrap();
    assert!(diagnostics.is_empty());
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_path_walks_respect_step_limit() {
    let f = keyword_sequence();
    let limited = GrammarSession::with_options(
        f.grammar.clone(),
        SequencerOptions {
            max_path_len: 1,
            ..SequencerOptions::default()
        },
    );
    let graph = limited.rule_graph(f.rule("Foo")).unwrap();
    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    assert!(graph.shortest_path_to_absorber(into_name, &RcStack::new()).is_none());

    let graph = f.graph("Foo");
    let into_name = graph.transition_to(graph.start(), Some(f.el("name"))).unwrap();
    assert_eq!(
        graph
            .shortest_path_to_absorber(into_name, &RcStack::new())
            .map(|path| path.len()),
        Some(1)
    );
}

// ============================================================================
// ERRORS
// ============================================================================

#[test]
fn test_unassigned_enum_call_is_malformed() {
    let f = unassigned_enum_call();
    let err = f.session().rule_graph(f.rule("Foo")).unwrap_err();
    assert_eq!(
        err,
        SequencerError::MalformedGrammarReference {
            element: f.el("call"),
            rule: "Foo".into(),
        }
    );
    assert!(!err.is_internal());
}

#[test]
fn test_terminal_rule_is_not_a_context() {
    let f = keyword_sequence();
    let err = f.session().rule_graph(f.rule("ID")).unwrap_err();
    assert!(matches!(err, SequencerError::UnknownContext(_)));
}

#[test]
fn test_invalid_grammar_is_rejected() {
    let mut b = GrammarBuilder::new("Broken");
    b.parser_rule("Foo", "Foo");
    let err = b.finish().unwrap_err();
    assert!(matches!(err, SequencerError::InvalidGrammar(_)));
}
