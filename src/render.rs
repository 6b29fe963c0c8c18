//! Textual dumps of absorption graphs for logs and tests.
//!
//! ```text
//! start -> name=ID
//!   -> 'a'
//!   'a' -> name=ID
//! name=ID -> stop
//! ```
//!
//! One header line per transition (absorbers in creation order), followed by
//! the emitter chain when there is one: first the transition's own first
//! hops, then one line per emitter with its followers.

use rustc_hash::FxHashSet;

use crate::base::SynStateId;
use crate::grammar::Grammar;
use crate::syn::{SynGraph, SyntacticRole};

/// Display title of a graph node: `start`, `stop`, `>>Bar` / `<<Bar` for
/// rule-call enter/exit, otherwise the grammar title of the element.
pub fn node_title(grammar: &Grammar, graph: &SynGraph, id: SynStateId) -> String {
    let node = graph.node(id);
    let callee = || {
        node.element()
            .and_then(|element| grammar.callee(element))
            .map(|rule| grammar.rule(rule).name.to_string())
            .unwrap_or_default()
    };
    match node.role() {
        SyntacticRole::Start => "start".to_string(),
        SyntacticRole::Stop => "stop".to_string(),
        SyntacticRole::Transition => "*".to_string(),
        SyntacticRole::UnassignedParserRuleEnter => format!(">>{}", callee()),
        SyntacticRole::UnassignedParserRuleExit => format!("<<{}", callee()),
        _ => match node.element() {
            Some(element) => grammar.full_title(element),
            None => node.role().to_string(),
        },
    }
}

/// Render every transition of `graph`.
pub fn render_graph(grammar: &Grammar, graph: &SynGraph) -> String {
    let mut out = String::new();
    for absorber in graph.absorbers() {
        for transition in graph.out_transitions(absorber) {
            render_transition(grammar, graph, transition, &mut out);
        }
    }
    out
}

fn render_transition(grammar: &Grammar, graph: &SynGraph, transition: SynStateId, out: &mut String) {
    let title = |id| node_title(grammar, graph, id);
    let node = graph.node(transition);
    let (Some(source), Some(target)) = (node.source(), node.target()) else {
        return;
    };
    out.push_str(&format!("{} -> {}\n", title(source), title(target)));
    if !graph.has_emitters(transition) {
        return;
    }
    out.push_str(&format!(
        "  -> {}\n",
        join_titles(grammar, graph, graph.followers(transition))
    ));

    let mut visited = FxHashSet::default();
    let mut pending: Vec<SynStateId> = graph.followers(transition).iter().rev().copied().collect();
    while let Some(id) = pending.pop() {
        if !graph.node(id).is_emitter() || !visited.insert(id) {
            continue;
        }
        let followers = graph.followers(id);
        out.push_str(&format!(
            "  {} -> {}\n",
            title(id),
            join_titles(grammar, graph, followers)
        ));
        pending.extend(followers.iter().rev().copied());
    }
}

fn join_titles(grammar: &Grammar, graph: &SynGraph, ids: &[SynStateId]) -> String {
    ids.iter()
        .map(|id| node_title(grammar, graph, *id))
        .collect::<Vec<_>>()
        .join(", ")
}
