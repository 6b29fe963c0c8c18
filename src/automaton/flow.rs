//! Flow automaton — the first-pass, call-unaware graph over rule bodies.
//!
//! Every grammar element gets one [`FlowState`]. Its edges look *through*
//! compounds, assignments and cross-references and always land on leaves
//! (keywords, rule calls, actions). Rule calls are not inlined: a call to a
//! parser rule carries separate `entries` into the callee body.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::base::ElementId;
use crate::grammar::{ElementKind, Grammar};

/// A directed flow edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowTransition {
    pub target: ElementId,
    /// The edge enters a callee rule body.
    pub is_rule_call: bool,
    /// The repetition this edge loops back into, if any.
    pub loop_center: Option<ElementId>,
}

/// One element of the flow automaton and its edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowState {
    element: ElementId,
    outgoing: Vec<FlowTransition>,
    entries: Vec<FlowTransition>,
    end_state: bool,
}

impl FlowState {
    pub fn element(&self) -> ElementId {
        self.element
    }

    /// Edges to what may follow this element inside its own rule
    /// (for a rule call: what follows after the callee returned).
    pub fn outgoing(&self) -> &[FlowTransition] {
        &self.outgoing
    }

    /// Rule-call edges into the callee body. Empty unless the element calls
    /// a parser rule.
    pub fn entries(&self) -> &[FlowTransition] {
        &self.entries
    }

    /// The element may be the last one matched by its rule.
    pub fn is_end_state(&self) -> bool {
        self.end_state
    }
}

/// Per-grammar cache of flow states.
///
/// States depend only on the grammar structure, so concurrent callers may
/// compute the same state twice; the first published copy wins.
#[derive(Debug, Default)]
pub struct FlowAutomaton {
    states: RwLock<FxHashMap<ElementId, Arc<FlowState>>>,
}

impl FlowAutomaton {
    pub fn new() -> Self {
        Self::default()
    }

    /// The flow state of `element`, computed on first request.
    pub fn state(&self, grammar: &Grammar, element: ElementId) -> Arc<FlowState> {
        if let Some(state) = self.states.read().get(&element) {
            return Arc::clone(state);
        }
        let computed = Arc::new(compute_state(grammar, element));
        let mut states = self.states.write();
        Arc::clone(states.entry(element).or_insert(computed))
    }

    /// The leaves matched first when entering `element`.
    pub fn first_transitions(&self, grammar: &Grammar, element: ElementId) -> Vec<FlowTransition> {
        let mut collector = Collector::new(grammar);
        collector.add(element, false, None);
        collector.finish()
    }

    /// Number of cached states.
    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

struct Collector<'g> {
    grammar: &'g Grammar,
    visited: FxHashSet<ElementId>,
    transitions: Vec<FlowTransition>,
}

impl<'g> Collector<'g> {
    fn new(grammar: &'g Grammar) -> Self {
        Self {
            grammar,
            visited: FxHashSet::default(),
            transitions: Vec::new(),
        }
    }

    /// Enter `element`, recording edges to its first leaves. Returns whether
    /// the element can be skipped, i.e. whether whatever follows it is
    /// reachable too.
    fn add(
        &mut self,
        element: ElementId,
        is_rule_call: bool,
        loop_center: Option<ElementId>,
    ) -> bool {
        if !self.visited.insert(element) {
            return self.grammar.is_nullable(element);
        }
        let node = self.grammar.element(element);
        let optional = node.cardinality.is_optional();
        if !self.grammar.is_transparent(element) {
            self.transitions.push(FlowTransition {
                target: element,
                is_rule_call,
                loop_center,
            });
            return optional;
        }
        let passes = match &node.kind {
            ElementKind::Group(children) => children
                .iter()
                .all(|child| self.add(*child, is_rule_call, loop_center)),
            ElementKind::Alternatives(children) => {
                let mut any = false;
                for child in children {
                    any |= self.add(*child, is_rule_call, loop_center);
                }
                any
            }
            ElementKind::Assignment { terminal, .. }
            | ElementKind::CrossReference { terminal, .. } => {
                self.add(*terminal, is_rule_call, loop_center)
            }
            ElementKind::Keyword(_) | ElementKind::RuleCall(_) | ElementKind::Action { .. } => {
                false
            }
        };
        passes || optional
    }

    fn finish(self) -> Vec<FlowTransition> {
        let mut seen = FxHashSet::default();
        self.transitions
            .into_iter()
            .filter(|t| seen.insert(t.target))
            .collect()
    }
}

fn compute_state(grammar: &Grammar, element: ElementId) -> FlowState {
    let entries = match grammar.callee(element) {
        Some(callee) => match grammar.rule(callee).body {
            Some(body) if grammar.rule(callee).is_parser_rule() => {
                let mut collector = Collector::new(grammar);
                collector.add(body, true, None);
                collector.finish()
            }
            _ => Vec::new(),
        },
        None => Vec::new(),
    };

    let mut collector = Collector::new(grammar);
    if grammar.element(element).cardinality.is_multiple() {
        collector.add(element, false, Some(element));
    }

    let mut end_state = false;
    let mut current = element;
    loop {
        let Some(parent) = grammar.element(current).parent else {
            end_state = true;
            break;
        };
        if let ElementKind::Group(children) = &grammar.element(parent).kind {
            let position = children.iter().position(|c| *c == current).unwrap_or(children.len());
            let blocked = children
                .iter()
                .skip(position + 1)
                .any(|sibling| !collector.add(*sibling, false, None));
            if blocked {
                break;
            }
        }
        if grammar.element(parent).cardinality.is_multiple() {
            collector.add(parent, false, Some(parent));
        }
        current = parent;
    }

    let outgoing = collector.finish();
    trace!(
        "[FLOW] {} -> {} outgoing, {} entries, end={}",
        grammar.title(element),
        outgoing.len(),
        entries.len(),
        end_state
    );
    FlowState {
        element,
        outgoing,
        entries,
        end_state,
    }
}
