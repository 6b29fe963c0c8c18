//! Construction of absorption graphs from call-aware automata.

use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, trace};

use super::graph::{AbsorberEdges, NavigationMemo, NodeShape, SynGraph, SynNode};
use super::role::{SyntacticRole, classify, is_mandatory_absorber, is_optional_absorber};
use crate::automaton::{CallAutomaton, CallStateKind};
use crate::base::{CallStateId, SynStateId};
use crate::error::{Result, SequencerError};
use crate::grammar::Grammar;

/// Default cap on the number of steps of a greedy path walk.
pub const DEFAULT_MAX_PATH_LEN: usize = 4096;

/// Build the absorption graph of a call-aware automaton.
pub fn build_graph(grammar: &Grammar, automaton: &CallAutomaton) -> Result<SynGraph> {
    build_graph_with_limit(grammar, automaton, DEFAULT_MAX_PATH_LEN)
}

/// Build the absorption graph, capping greedy path walks at `max_path_len`.
pub fn build_graph_with_limit(
    grammar: &Grammar,
    automaton: &CallAutomaton,
    max_path_len: usize,
) -> Result<SynGraph> {
    let mut builder = AbsorptionGraphBuilder {
        grammar,
        automaton,
        nodes: Vec::new(),
        absorbers: FxHashMap::default(),
        emitters: FxHashMap::default(),
    };
    let start = builder.create_absorber(automaton.start())?;
    let graph = SynGraph {
        context: automaton.context(),
        nodes: builder.nodes,
        start,
        max_path_len,
        memo: NavigationMemo::default(),
    };
    debug!(
        "[SYN] built {:?}: {} absorbers, {} emitters, {} transitions",
        graph.context(),
        graph.absorbers().count(),
        graph.emitters().count(),
        graph.transitions().count()
    );
    Ok(graph)
}

struct AbsorptionGraphBuilder<'a> {
    grammar: &'a Grammar,
    automaton: &'a CallAutomaton,
    nodes: Vec<SynNode>,
    /// One absorber per automaton state
    absorbers: FxHashMap<CallStateId, SynStateId>,
    /// Emitters shared per target absorber, keyed by automaton state
    emitters: FxHashMap<SynStateId, FxHashMap<CallStateId, SynStateId>>,
}

impl AbsorptionGraphBuilder<'_> {
    fn push(&mut self, node: SynNode) -> SynStateId {
        let id = SynStateId::from_index(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn is_absorber(&self, state: CallStateId) -> bool {
        is_mandatory_absorber(self.grammar, self.automaton.state(state).element())
    }

    fn create_absorber(&mut self, state: CallStateId) -> Result<SynStateId> {
        if let Some(id) = self.absorbers.get(&state) {
            return Ok(*id);
        }
        let automaton = self.automaton;
        let call_state = automaton.state(state);
        let role = if call_state.kind() == CallStateKind::Stop {
            SyntacticRole::Stop
        } else {
            classify(self.grammar, call_state)?
        };
        let id = self.push(SynNode {
            role,
            element: call_state.element(),
            call_state: Some(state),
            followers: Vec::new(),
            shape: NodeShape::Absorber(AbsorberEdges::default()),
        });
        self.absorbers.insert(state, id);
        if role == SyntacticRole::Stop {
            return Ok(id);
        }

        let mut following = IndexSet::new();
        self.collect_following_absorbers(state, false, &mut FxHashSet::default(), &mut following);
        for follower in following {
            let target = self.create_absorber(follower)?;
            let transition = self.push(SynNode {
                role: SyntacticRole::Transition,
                element: None,
                call_state: None,
                followers: Vec::new(),
                shape: NodeShape::Transition { source: id, target },
            });
            let chain = self.create_emitters(state, follower, target)?;
            self.nodes[transition.index()].followers = chain;
            self.add_transition(id, transition)?;
        }
        Ok(id)
    }

    /// Absorbers reachable from `state` without passing another absorber.
    /// `state` itself is not checked, only what follows it.
    fn collect_following_absorbers(
        &self,
        state: CallStateId,
        collect: bool,
        visited: &mut FxHashSet<CallStateId>,
        result: &mut IndexSet<CallStateId>,
    ) {
        if collect {
            if !visited.insert(state) {
                return;
            }
            let call_state = self.automaton.state(state);
            if self.is_absorber(state) || call_state.kind() == CallStateKind::Stop {
                result.insert(state);
                return;
            }
            if is_optional_absorber(self.grammar, call_state.element()) {
                result.insert(state);
            }
        }
        for follower in self.automaton.followers(state) {
            self.collect_following_absorbers(*follower, true, visited, result);
        }
    }

    /// Whether `to` is reachable from `from` without passing an absorber.
    fn can_reach_absorber(
        &self,
        from: CallStateId,
        to: CallStateId,
        visited: &mut FxHashSet<CallStateId>,
    ) -> bool {
        if self.is_absorber(from) || !visited.insert(from) {
            return false;
        }
        self.automaton
            .followers(from)
            .iter()
            .any(|follower| *follower == to || self.can_reach_absorber(*follower, to, visited))
    }

    /// The emitter chain from `from` towards the automaton state `to`,
    /// whose absorber is `target`.
    fn create_emitters(
        &mut self,
        from: CallStateId,
        to: CallStateId,
        target: SynStateId,
    ) -> Result<Vec<SynStateId>> {
        let mut result = Vec::new();
        let followers = self.automaton.followers(from).to_vec();
        for next in followers {
            if next == to {
                result.push(target);
                continue;
            }
            if !self.can_reach_absorber(next, to, &mut FxHashSet::default()) {
                continue;
            }
            let shared = self
                .emitters
                .get(&target)
                .and_then(|emitters| emitters.get(&next))
                .copied();
            let emitter = match shared {
                Some(emitter) => emitter,
                None => {
                    let automaton = self.automaton;
                    let call_state = automaton.state(next);
                    let role = classify(self.grammar, call_state)?;
                    let emitter = self.push(SynNode {
                        role,
                        element: call_state.element(),
                        call_state: Some(next),
                        followers: Vec::new(),
                        shape: NodeShape::Emitter { target },
                    });
                    self.emitters.entry(target).or_default().insert(next, emitter);
                    let chain = self.create_emitters(next, to, target)?;
                    self.nodes[emitter.index()].followers = chain;
                    emitter
                }
            };
            result.push(emitter);
        }
        Ok(result)
    }

    fn add_transition(&mut self, absorber: SynStateId, transition: SynStateId) -> Result<()> {
        let transition_node = &self.nodes[transition.index()];
        let chain = transition_node.followers.clone();
        let Some(target) = transition_node.target() else {
            return Ok(());
        };
        let target_node = &self.nodes[target.index()];
        let (target_role, target_element) = (target_node.role, target_node.element);
        trace!(
            "[SYN] transition {:?} -> {:?} ({} emitters)",
            absorber,
            target,
            chain.len()
        );

        let node = &mut self.nodes[absorber.index()];
        let NodeShape::Absorber(edges) = &mut node.shape else {
            return Ok(());
        };
        match target_role.simple_kind() {
            Some(CallStateKind::Start) | None => {
                return Err(SequencerError::StartStateIncomingTransition);
            }
            Some(CallStateKind::Element) | Some(CallStateKind::Stop) => {
                edges.by_element.insert(target_element, transition);
            }
            Some(CallStateKind::RuleCallEnter) => {
                if let Some(element) = target_element {
                    edges.by_rule_call_enter.insert(element, transition);
                }
            }
            Some(CallStateKind::RuleCallExit) => {
                if let Some(element) = target_element {
                    edges.by_rule_call_exit.insert(element, transition);
                }
            }
        }
        node.followers.extend(chain);
        Ok(())
    }
}
