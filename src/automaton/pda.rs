//! Call-aware (pushdown) automaton over the flow graph.
//!
//! Rule calls into structured parser rules become explicit
//! `RULECALL_ENTER`/`RULECALL_EXIT` states. The automaton itself does not
//! match calls with returns: the end of a called rule leads to the exit of
//! *every* call site entering that rule, and traversals carry an
//! [`RcStack`](crate::nav::RcStack) to keep enter/exit balanced.

use std::collections::VecDeque;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::flow::FlowAutomaton;
use crate::base::{CallStateId, ElementId, RuleId};
use crate::error::{Result, SequencerError};
use crate::grammar::Grammar;

/// Shape of a call-aware state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallStateKind {
    Start,
    Element,
    RuleCallEnter,
    RuleCallExit,
    Stop,
}

/// What a graph is built for: a parser rule, or a feature-assigned action
/// (`{Add.left=current}`) whose "current" object is being serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Context {
    Rule(RuleId),
    Action(ElementId),
}

/// A state of the call-aware automaton.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallState {
    kind: CallStateKind,
    /// The wrapped element; the rule call site for enter/exit states.
    element: Option<ElementId>,
    followers: Vec<CallStateId>,
}

impl CallState {
    pub fn kind(&self) -> CallStateKind {
        self.kind
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn followers(&self) -> &[CallStateId] {
        &self.followers
    }
}

/// The call-aware automaton of one context.
#[derive(Debug, Clone)]
pub struct CallAutomaton {
    context: Context,
    states: Vec<CallState>,
    start: CallStateId,
    stop: CallStateId,
}

impl CallAutomaton {
    /// Build the automaton for `context`.
    pub fn build(grammar: &Grammar, flow: &FlowAutomaton, context: Context) -> Result<Self> {
        let mut builder = PdaBuilder::new(grammar, flow, context);
        let starts = builder.start_followers()?;
        let start = builder.start;
        for state in starts {
            builder.link(start, state);
        }
        builder.run();
        let automaton = builder.finish();
        debug!(
            "[PDA] built {:?}: {} states",
            automaton.context,
            automaton.states.len()
        );
        Ok(automaton)
    }

    pub fn context(&self) -> Context {
        self.context
    }

    pub fn start(&self) -> CallStateId {
        self.start
    }

    pub fn stop(&self) -> CallStateId {
        self.stop
    }

    pub fn state(&self, id: CallStateId) -> &CallState {
        &self.states[id.index()]
    }

    pub fn followers(&self, id: CallStateId) -> &[CallStateId] {
        &self.states[id.index()].followers
    }

    /// All state ids in creation order.
    pub fn state_ids(&self) -> impl Iterator<Item = CallStateId> + '_ {
        (0..self.states.len()).map(CallStateId::from_index)
    }

    /// Find the state of a given kind wrapping `element`.
    pub fn find(&self, kind: CallStateKind, element: ElementId) -> Option<CallStateId> {
        self.state_ids().find(|id| {
            let state = self.state(*id);
            state.kind == kind && state.element == Some(element)
        })
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

// ============================================================================
// REACHABILITY
// ============================================================================

/// A rule call is expanded into enter/exit states only when it calls a
/// parser rule producing an object and does not feed an assignment.
pub fn can_enter_rule_call(grammar: &Grammar, element: ElementId) -> bool {
    let Some(callee) = grammar.callee(element) else {
        return false;
    };
    let rule = grammar.rule(callee);
    rule.is_structured() && rule.body.is_some() && !grammar.is_assigned(element)
}

/// Whether `target` is reachable from `from` without crossing a rule call.
pub fn can_reach_element(
    grammar: &Grammar,
    flow: &FlowAutomaton,
    from: ElementId,
    target: ElementId,
    visited: &mut FxHashSet<ElementId>,
) -> bool {
    if !visited.insert(from) {
        return false;
    }
    if from == target {
        return true;
    }
    flow.state(grammar, from)
        .outgoing()
        .iter()
        .any(|t| !t.is_rule_call && can_reach_element(grammar, flow, t.target, target, visited))
}

/// Whether the end of the rule is reachable from `from` without crossing a
/// rule call.
pub fn can_reach_end_state(
    grammar: &Grammar,
    flow: &FlowAutomaton,
    from: ElementId,
    visited: &mut FxHashSet<ElementId>,
) -> bool {
    if !visited.insert(from) {
        return false;
    }
    let state = flow.state(grammar, from);
    if state.is_end_state() {
        return true;
    }
    state
        .outgoing()
        .iter()
        .any(|t| !t.is_rule_call && can_reach_end_state(grammar, flow, t.target, visited))
}

/// The first leaves of a parser rule plus every assigned action it contains.
pub fn all_rule_start_followers(
    grammar: &Grammar,
    flow: &FlowAutomaton,
    rule: RuleId,
) -> Vec<ElementId> {
    let Some(body) = grammar.rule(rule).body else {
        return Vec::new();
    };
    let mut result: Vec<ElementId> = flow
        .first_transitions(grammar, body)
        .into_iter()
        .map(|t| t.target)
        .collect();
    for action in grammar.assigned_actions(rule) {
        if !result.contains(&action) {
            result.push(action);
        }
    }
    result
}

// ============================================================================
// BUILDER
// ============================================================================

struct PdaBuilder<'a> {
    grammar: &'a Grammar,
    flow: &'a FlowAutomaton,
    context: Context,
    states: Vec<CallState>,
    index: FxHashMap<(CallStateKind, ElementId), CallStateId>,
    worklist: VecDeque<CallStateId>,
    /// Call sites entered in this automaton, grouped by callee
    call_sites: IndexMap<RuleId, Vec<ElementId>>,
    /// States that end their rule, with the rule they end
    rule_ends: Vec<(CallStateId, RuleId)>,
    start: CallStateId,
    stop: CallStateId,
}

impl<'a> PdaBuilder<'a> {
    fn new(grammar: &'a Grammar, flow: &'a FlowAutomaton, context: Context) -> Self {
        let mut builder = Self {
            grammar,
            flow,
            context,
            states: Vec::new(),
            index: FxHashMap::default(),
            worklist: VecDeque::new(),
            call_sites: IndexMap::new(),
            rule_ends: Vec::new(),
            start: CallStateId::new(0),
            stop: CallStateId::new(0),
        };
        builder.start = builder.push_state(CallStateKind::Start, None);
        builder.stop = builder.push_state(CallStateKind::Stop, None);
        builder
    }

    fn push_state(&mut self, kind: CallStateKind, element: Option<ElementId>) -> CallStateId {
        let id = CallStateId::from_index(self.states.len());
        self.states.push(CallState {
            kind,
            element,
            followers: Vec::new(),
        });
        id
    }

    fn start_followers(&mut self) -> Result<Vec<CallStateId>> {
        let grammar = self.grammar;
        let flow = self.flow;
        let mut result = Vec::new();
        match self.context {
            Context::Rule(rule) => {
                let declared = grammar.rule(rule);
                let body = match declared.body {
                    Some(body) if declared.is_parser_rule() => body,
                    _ => {
                        return Err(SequencerError::unknown_context(format!(
                            "rule '{}' is not a parser rule with a body",
                            declared.name
                        )));
                    }
                };
                for element in all_rule_start_followers(grammar, flow, rule) {
                    if can_reach_end_state(grammar, flow, element, &mut FxHashSet::default()) {
                        result.push(self.state_for(element));
                    }
                }
                if grammar.is_nullable(body) {
                    result.push(self.stop);
                }
            }
            Context::Action(action) => {
                if !grammar.is_assigned_action(action) {
                    return Err(SequencerError::unknown_context(format!(
                        "{} is not a feature-assigned action",
                        grammar.title(action)
                    )));
                }
                let rule = grammar.containing_rule(action);
                for element in all_rule_start_followers(grammar, flow, rule) {
                    if can_reach_element(grammar, flow, element, action, &mut FxHashSet::default()) {
                        result.push(self.state_for(element));
                    }
                }
            }
        }
        Ok(result)
    }

    /// The state an edge into `element` lands on, created on first use.
    fn state_for(&mut self, element: ElementId) -> CallStateId {
        let kind = if can_enter_rule_call(self.grammar, element) {
            CallStateKind::RuleCallEnter
        } else {
            CallStateKind::Element
        };
        if let Some(id) = self.index.get(&(kind, element)) {
            return *id;
        }
        let id = self.push_state(kind, Some(element));
        self.index.insert((kind, element), id);
        self.worklist.push_back(id);
        if kind == CallStateKind::RuleCallEnter {
            let exit = self.push_state(CallStateKind::RuleCallExit, Some(element));
            self.index.insert((CallStateKind::RuleCallExit, element), exit);
            self.worklist.push_back(exit);
            if let Some(callee) = self.grammar.callee(element) {
                self.call_sites.entry(callee).or_default().push(element);
            }
        }
        id
    }

    fn link(&mut self, from: CallStateId, to: CallStateId) {
        let followers = &mut self.states[from.index()].followers;
        if !followers.contains(&to) {
            followers.push(to);
        }
    }

    fn run(&mut self) {
        while let Some(id) = self.worklist.pop_front() {
            let state = &self.states[id.index()];
            let (kind, element) = (state.kind, state.element);
            let Some(element) = element else {
                continue;
            };
            match kind {
                CallStateKind::RuleCallEnter => self.expand_enter(id, element),
                CallStateKind::Element | CallStateKind::RuleCallExit => {
                    self.expand_local(id, element)
                }
                CallStateKind::Start | CallStateKind::Stop => {}
            }
        }
    }

    /// Followers inside the element's own rule, plus STOP when final.
    fn expand_local(&mut self, id: CallStateId, element: ElementId) {
        let grammar = self.grammar;
        let flow_state = self.flow.state(grammar, element);
        for transition in flow_state.outgoing() {
            if !grammar.is_assigned_action(transition.target) {
                let follower = self.state_for(transition.target);
                self.link(id, follower);
            }
        }
        let is_final = match self.context {
            Context::Rule(rule) => {
                flow_state.is_end_state() && grammar.containing_rule(element) == rule
            }
            Context::Action(action) => flow_state.outgoing().iter().any(|t| t.target == action),
        };
        if is_final {
            let stop = self.stop;
            self.link(id, stop);
        }
        if flow_state.is_end_state() {
            self.rule_ends.push((id, grammar.containing_rule(element)));
        }
    }

    /// The callee's first leaves and its assigned actions, plus the exit
    /// when the callee body is nullable.
    fn expand_enter(&mut self, id: CallStateId, call: ElementId) {
        let grammar = self.grammar;
        let flow_state = self.flow.state(grammar, call);
        for transition in flow_state.entries() {
            if !grammar.is_assigned_action(transition.target) {
                let follower = self.state_for(transition.target);
                self.link(id, follower);
            }
        }
        let Some(callee) = grammar.callee(call) else {
            return;
        };
        for action in grammar.assigned_actions(callee) {
            let follower = self.state_for(action);
            self.link(id, follower);
        }
        // a nullable callee may return without matching anything
        let nullable = grammar.rule(callee).body.is_some_and(|body| grammar.is_nullable(body));
        if nullable {
            if let Some(exit) = self.index.get(&(CallStateKind::RuleCallExit, call)).copied() {
                self.link(id, exit);
            }
        }
    }

    fn finish(mut self) -> CallAutomaton {
        let rule_ends = std::mem::take(&mut self.rule_ends);
        for (state, rule) in rule_ends {
            let Some(sites) = self.call_sites.get(&rule).cloned() else {
                continue;
            };
            for site in sites {
                if let Some(exit) = self.index.get(&(CallStateKind::RuleCallExit, site)).copied() {
                    trace!("[PDA] {:?} returns through {:?}", state, exit);
                    self.link(state, exit);
                }
            }
        }
        CallAutomaton {
            context: self.context,
            states: self.states,
            start: self.start,
            stop: self.stop,
        }
    }
}
