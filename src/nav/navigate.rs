//! Navigation queries on transitions and emitters.
//!
//! Queries start from a navigable node (a transition or an emitter) and look
//! at what lies between it and the next absorber. Stack-independent results
//! are memoized in the graph's navigation tables.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use tracing::trace;

use super::rc_stack::RcStack;
use super::search::{self, UNREACHABLE, absorber, emitter, rule_call_exit, rule_call_exits};
use crate::base::{ElementId, SynStateId};
use crate::syn::{SynGraph, SyntacticRole};

/// One emitted step along a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EmittedStep {
    pub role: SyntacticRole,
    pub element: Option<ElementId>,
}

/// What a serializer needs to walk one transition: the emitted syntax along
/// the shortest path and the absorber it ends at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionSummary {
    pub transition: SynStateId,
    pub source: SyntacticRole,
    pub target: SyntacticRole,
    pub target_element: Option<ElementId>,
    pub emitters: Vec<EmittedStep>,
    pub ambiguous: bool,
}

impl SynGraph {
    /// Distance from `from` to the nearest node accepted by `matches`,
    /// not walking through nodes accepted by `bounds`.
    pub fn distance_to<M, B>(&self, from: SynStateId, matches: M, bounds: B, stack: &RcStack) -> u32
    where
        M: Fn(&SynGraph, SynStateId) -> bool,
        B: Fn(&SynGraph, SynStateId) -> bool,
    {
        search::distance_to(self, from, &matches, &bounds, stack)
    }

    /// Distance to the next absorber.
    pub fn distance_to_absorber(&self, from: SynStateId, stack: &RcStack) -> u32 {
        if self.involves_rule_exit(from) {
            return self.distance_to_element(from, absorber(), stack);
        }
        self.memo.distance_to_absorber.get_or_compute(from, || {
            search::distance_to(self, from, &absorber(), &absorber(), stack)
        })
    }

    /// Distance to a node accepted by `matches`, after first returning from
    /// every open call the node can return from.
    pub fn distance_to_element<M>(&self, from: SynStateId, matches: M, stack: &RcStack) -> u32
    where
        M: Fn(&SynGraph, SynStateId) -> bool,
    {
        let mut stack = stack.clone();
        let mut result: u32 = 0;
        if self.involves_rule_exit(from) {
            while let Some(top) = stack.peek() {
                let dist =
                    search::distance_to(self, from, &rule_call_exit(top), &rule_call_exits(), &stack);
                if dist == UNREACHABLE {
                    break;
                }
                result = result.saturating_add(dist);
                stack = stack.pop();
            }
        }
        match search::distance_to(self, from, &matches, &absorber(), &stack) {
            UNREACHABLE => UNREACHABLE,
            dist => result.saturating_add(dist).min(UNREACHABLE - 1),
        }
    }

    /// Greedy shortest walk to a node accepted by `matches`.
    pub fn shortest_path_to<M, B>(
        &self,
        from: SynStateId,
        matches: M,
        bounds: B,
        stack: &RcStack,
        include_match: bool,
    ) -> Option<Vec<SynStateId>>
    where
        M: Fn(&SynGraph, SynStateId) -> bool,
        B: Fn(&SynGraph, SynStateId) -> bool,
    {
        search::shortest_path_to(self, from, &matches, &bounds, stack, include_match)
    }

    /// Greedy shortest walk to the emitter of `element`, staying between
    /// absorbers.
    pub fn shortest_path_to_element(
        &self,
        from: SynStateId,
        element: ElementId,
        stack: &RcStack,
        include_match: bool,
    ) -> Option<Vec<SynStateId>> {
        search::shortest_path_to(
            self,
            from,
            &emitter(element),
            &absorber(),
            stack,
            include_match,
        )
    }

    /// The emitters on the shortest walk to the next absorber.
    pub fn shortest_path_to_absorber(
        &self,
        from: SynStateId,
        stack: &RcStack,
    ) -> Option<Vec<SynStateId>> {
        if self.involves_rule_exit(from) {
            return self.shortest_stack_path_to(from, absorber(), stack);
        }
        self.memo
            .path_to_absorber
            .get_or_compute(from, || {
                search::shortest_path_to(self, from, &absorber(), &absorber(), stack, false)
                    .map(Arc::from)
            })
            .map(|path| path.to_vec())
    }

    /// Walk to a node accepted by `matches`, first draining the stack: for
    /// every open call, walk to its exit before searching the target.
    /// Draining stops at the first open call the node cannot return from;
    /// `None` when the target itself cannot be reached.
    pub fn shortest_stack_path_to<M>(
        &self,
        from: SynStateId,
        matches: M,
        stack: &RcStack,
    ) -> Option<Vec<SynStateId>>
    where
        M: Fn(&SynGraph, SynStateId) -> bool,
    {
        let bounds = search::rule_call_exits_or_absorber();
        let mut stack = stack.clone();
        let mut current = from;
        let mut result = Vec::new();
        if self.involves_rule_exit(from) {
            while let Some(top) = stack.peek() {
                let Some(leg) =
                    search::shortest_path_to(self, current, &rule_call_exit(top), &bounds, &stack, true)
                else {
                    break;
                };
                let Some(last) = leg.last().copied() else {
                    break;
                };
                trace!("[NAV] drained {:?} at {:?}", top, last);
                result.extend(leg);
                stack = stack.pop();
                current = last;
            }
        }
        let leg = search::shortest_path_to(self, current, &matches, &bounds, &stack, false)?;
        result.extend(leg);
        Some(result)
    }

    /// Whether the emitters up to the next absorber leave the current rule.
    pub fn involves_rule_exit(&self, from: SynStateId) -> bool {
        self.memo
            .involves_rule_exit
            .get_or_compute(from, || self.involves(from, |role| role.is_rule_call_exit()))
    }

    /// Whether the emitters up to the next absorber include terminal or
    /// datatype rule calls that produce text without a model value.
    pub fn involves_unassigned_token_rule_calls(&self, from: SynStateId) -> bool {
        self.memo.involves_token_rule_calls.get_or_compute(from, || {
            self.involves(from, |role| role.is_unassigned_token_rule_call())
        })
    }

    /// False when `from` leads straight to an absorber.
    pub fn has_emitters(&self, from: SynStateId) -> bool {
        !matches!(self.followers(from), [only] if self.node(*only).is_absorber())
    }

    fn involves(&self, from: SynStateId, pred: impl Fn(SyntacticRole) -> bool) -> bool {
        let mut visited = FxHashSet::default();
        let mut pending: Vec<SynStateId> = self.followers(from).to_vec();
        while let Some(id) = pending.pop() {
            let node = self.node(id);
            if node.is_absorber() || !visited.insert(id) {
                continue;
            }
            if pred(node.role()) {
                return true;
            }
            pending.extend(node.followers().iter().copied());
        }
        false
    }

    /// Summary of a transition for the serializer. `None` when `transition`
    /// is not a transition or no emitter path reaches its target.
    pub fn summarize(&self, transition: SynStateId, stack: &RcStack) -> Option<TransitionSummary> {
        let node = self.node(transition);
        let (source, target) = (node.source()?, node.target()?);
        let path = self.shortest_path_to_absorber(transition, stack)?;
        let emitters = path
            .into_iter()
            .map(|id| EmittedStep {
                role: self.role(id),
                element: self.node(id).element(),
            })
            .collect();
        Some(TransitionSummary {
            transition,
            source: self.role(source),
            target: self.role(target),
            target_element: self.node(target).element(),
            emitters,
            ambiguous: self.is_syntactically_ambiguous(transition),
        })
    }

    /// Transitions whose emitter chains are syntactically ambiguous.
    pub fn ambiguous_transitions(&self) -> Vec<SynStateId> {
        self.transitions()
            .filter(|id| self.is_syntactically_ambiguous(*id))
            .collect()
    }
}
