//! Syntactic ambiguity of emitter chains.
//!
//! A chain is ambiguous when two different walks through it cannot be told
//! apart by the absorber they reach and the calls they return from on the
//! way. A serializer facing such a chain has to pick the syntax itself.

use rustc_hash::FxHashSet;

use super::rc_stack::RcStack;
use crate::automaton::CallStateKind;
use crate::base::SynStateId;
use crate::syn::SynGraph;

impl SynGraph {
    /// Whether the walks from `from` to the next absorbers are
    /// indistinguishable.
    pub fn is_syntactically_ambiguous(&self, from: SynStateId) -> bool {
        self.memo
            .syntactically_ambiguous
            .get_or_compute(from, || self.ambiguous_from_followers(from))
    }

    fn ambiguous_from_followers(&self, from: SynStateId) -> bool {
        let mut walk = AmbiguityWalk {
            graph: self,
            results: Vec::new(),
        };
        let mut visited = FxHashSet::default();
        let (exits, stack) = (RcStack::new(), RcStack::new());
        for follower in self.followers(from) {
            if walk.visit(*follower, &exits, &stack, &mut visited) {
                return true;
            }
        }
        let distinct: FxHashSet<&RcStack> = walk.results.iter().collect();
        distinct.len() != walk.results.len()
    }
}

struct AmbiguityWalk<'g> {
    graph: &'g SynGraph,
    /// Calls returned from on each walk that reached an absorber
    results: Vec<RcStack>,
}

impl AmbiguityWalk<'_> {
    /// Returns true as soon as the walk revisits a node.
    fn visit(
        &mut self,
        id: SynStateId,
        exits: &RcStack,
        stack: &RcStack,
        visited: &mut FxHashSet<SynStateId>,
    ) -> bool {
        if !visited.insert(id) {
            return true;
        }
        let graph = self.graph;
        let node = graph.node(id);
        if node.is_absorber() {
            self.results.push(exits.clone());
            return false;
        }

        let mut exits = exits.clone();
        let mut stack = stack.clone();
        let mut restarted = None;
        match (node.role().simple_kind(), node.element()) {
            (Some(CallStateKind::RuleCallEnter), Some(call)) => stack = stack.push(call),
            (Some(CallStateKind::RuleCallExit), Some(call)) => match stack.peek() {
                Some(top) if top == call => stack = stack.pop(),
                Some(_) => return false,
                // leaving the same call twice on one walk never terminates
                None if exits.contains(call) => return false,
                None => {
                    exits = exits.push(call);
                    restarted = Some(FxHashSet::default());
                }
            },
            _ => {}
        }

        let visited = match restarted.as_mut() {
            Some(fresh) => fresh,
            None => visited,
        };
        for follower in node.followers() {
            if self.visit(*follower, &exits, &stack, visited) {
                return true;
            }
        }
        false
    }
}
