//! The absorption graph: absorbers joined by transitions that carry the
//! chain of emitters a serializer walks between two consumed values.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::role::SyntacticRole;
use crate::automaton::Context;
use crate::base::{CallStateId, ElementId, SynStateId};

/// Outgoing transitions of an absorber, keyed by the target's grammar
/// element. STOP targets are keyed by `None`.
#[derive(Debug, Clone, Default)]
pub struct AbsorberEdges {
    pub(crate) by_element: IndexMap<Option<ElementId>, SynStateId>,
    pub(crate) by_rule_call_enter: IndexMap<ElementId, SynStateId>,
    pub(crate) by_rule_call_exit: IndexMap<ElementId, SynStateId>,
}

impl AbsorberEdges {
    /// Transitions to element and stop absorbers.
    pub fn by_element(&self) -> &IndexMap<Option<ElementId>, SynStateId> {
        &self.by_element
    }

    pub fn by_rule_call_enter(&self) -> &IndexMap<ElementId, SynStateId> {
        &self.by_rule_call_enter
    }

    pub fn by_rule_call_exit(&self) -> &IndexMap<ElementId, SynStateId> {
        &self.by_rule_call_exit
    }

    /// All transitions: element, then enter, then exit targets.
    pub fn all(&self) -> impl Iterator<Item = SynStateId> + '_ {
        self.by_element
            .values()
            .chain(self.by_rule_call_enter.values())
            .chain(self.by_rule_call_exit.values())
            .copied()
    }

    pub fn len(&self) -> usize {
        self.by_element.len() + self.by_rule_call_enter.len() + self.by_rule_call_exit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What kind of node a [`SynNode`] is.
#[derive(Debug, Clone)]
pub enum NodeShape {
    Absorber(AbsorberEdges),
    /// Pure syntax on the way to `target`.
    Emitter { target: SynStateId },
    Transition {
        source: SynStateId,
        target: SynStateId,
    },
}

/// One node of the absorption graph.
#[derive(Debug, Clone)]
pub struct SynNode {
    pub(crate) role: SyntacticRole,
    pub(crate) element: Option<ElementId>,
    /// The automaton state this node stands for (none for transitions)
    pub(crate) call_state: Option<CallStateId>,
    pub(crate) followers: Vec<SynStateId>,
    pub(crate) shape: NodeShape,
}

impl SynNode {
    pub fn role(&self) -> SyntacticRole {
        self.role
    }

    pub fn element(&self) -> Option<ElementId> {
        self.element
    }

    pub fn call_state(&self) -> Option<CallStateId> {
        self.call_state
    }

    /// Next nodes. For a transition: the first hop of its emitter chain, or
    /// its target when nothing is emitted. For an absorber: the first hops
    /// of all its transitions.
    pub fn followers(&self) -> &[SynStateId] {
        &self.followers
    }

    pub fn shape(&self) -> &NodeShape {
        &self.shape
    }

    pub fn is_absorber(&self) -> bool {
        matches!(self.shape, NodeShape::Absorber(_))
    }

    pub fn is_emitter(&self) -> bool {
        matches!(self.shape, NodeShape::Emitter { .. })
    }

    pub fn is_transition(&self) -> bool {
        matches!(self.shape, NodeShape::Transition { .. })
    }

    /// The absorber an emitter or transition leads to.
    pub fn target(&self) -> Option<SynStateId> {
        match self.shape {
            NodeShape::Emitter { target } | NodeShape::Transition { target, .. } => Some(target),
            NodeShape::Absorber(_) => None,
        }
    }

    /// The absorber a transition leaves.
    pub fn source(&self) -> Option<SynStateId> {
        match self.shape {
            NodeShape::Transition { source, .. } => Some(source),
            _ => None,
        }
    }

    pub fn edges(&self) -> Option<&AbsorberEdges> {
        match &self.shape {
            NodeShape::Absorber(edges) => Some(edges),
            _ => None,
        }
    }
}

/// Memoized query results keyed by node. Values are computed outside the
/// lock; a racing computation publishes an equal value.
#[derive(Debug)]
pub(crate) struct Memo<V> {
    values: RwLock<FxHashMap<SynStateId, V>>,
}

impl<V> Default for Memo<V> {
    fn default() -> Self {
        Self {
            values: RwLock::new(FxHashMap::default()),
        }
    }
}

impl<V: Clone> Memo<V> {
    pub(crate) fn get_or_compute(&self, id: SynStateId, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.values.read().get(&id) {
            return value.clone();
        }
        let value = compute();
        self.values.write().entry(id).or_insert(value).clone()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.values.read().len()
    }
}

/// Per-graph tables for the stack-independent navigation queries.
#[derive(Debug, Default)]
pub(crate) struct NavigationMemo {
    pub(crate) distance_to_absorber: Memo<u32>,
    pub(crate) path_to_absorber: Memo<Option<Arc<[SynStateId]>>>,
    pub(crate) involves_rule_exit: Memo<bool>,
    pub(crate) involves_token_rule_calls: Memo<bool>,
    pub(crate) syntactically_ambiguous: Memo<bool>,
}

/// The absorption graph of one context.
#[derive(Debug)]
pub struct SynGraph {
    pub(crate) context: Context,
    pub(crate) nodes: Vec<SynNode>,
    pub(crate) start: SynStateId,
    pub(crate) max_path_len: usize,
    pub(crate) memo: NavigationMemo,
}

impl SynGraph {
    pub fn context(&self) -> Context {
        self.context
    }

    /// The START absorber.
    pub fn start(&self) -> SynStateId {
        self.start
    }

    pub fn node(&self, id: SynStateId) -> &SynNode {
        &self.nodes[id.index()]
    }

    pub fn role(&self, id: SynStateId) -> SyntacticRole {
        self.nodes[id.index()].role
    }

    pub fn followers(&self, id: SynStateId) -> &[SynStateId] {
        &self.nodes[id.index()].followers
    }

    pub fn node_ids(&self) -> impl Iterator<Item = SynStateId> + '_ {
        (0..self.nodes.len()).map(SynStateId::from_index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Absorbers in creation order (START first).
    pub fn absorbers(&self) -> impl Iterator<Item = SynStateId> + '_ {
        self.node_ids().filter(|id| self.node(*id).is_absorber())
    }

    pub fn emitters(&self) -> impl Iterator<Item = SynStateId> + '_ {
        self.node_ids().filter(|id| self.node(*id).is_emitter())
    }

    /// Every transition reachable from an absorber's edge maps.
    pub fn transitions(&self) -> impl Iterator<Item = SynStateId> + '_ {
        self.absorbers()
            .flat_map(move |id| self.out_transitions(id).collect::<Vec<_>>())
    }

    /// The STOP absorber, if the context can end at all.
    pub fn stop(&self) -> Option<SynStateId> {
        self.absorbers()
            .find(|id| self.role(*id) == SyntacticRole::Stop)
    }

    /// The absorber wrapping `element`.
    pub fn absorber_for(&self, element: ElementId) -> Option<SynStateId> {
        self.absorbers()
            .find(|id| self.node(*id).element == Some(element))
    }

    /// Outgoing transitions of an absorber (none for other nodes).
    pub fn out_transitions(&self, absorber: SynStateId) -> impl Iterator<Item = SynStateId> + '_ {
        self.node(absorber)
            .edges()
            .into_iter()
            .flat_map(|edges| edges.all())
    }

    pub fn out_transitions_by_element(
        &self,
        absorber: SynStateId,
    ) -> Option<&IndexMap<Option<ElementId>, SynStateId>> {
        self.node(absorber).edges().map(|edges| &edges.by_element)
    }

    pub fn out_transitions_by_rule_call_enter(
        &self,
        absorber: SynStateId,
    ) -> Option<&IndexMap<ElementId, SynStateId>> {
        self.node(absorber).edges().map(|edges| &edges.by_rule_call_enter)
    }

    pub fn out_transitions_by_rule_call_exit(
        &self,
        absorber: SynStateId,
    ) -> Option<&IndexMap<ElementId, SynStateId>> {
        self.node(absorber).edges().map(|edges| &edges.by_rule_call_exit)
    }

    /// The transition from `absorber` to the absorber of `target`
    /// (`None` = STOP).
    pub fn transition_to(
        &self,
        absorber: SynStateId,
        target: Option<ElementId>,
    ) -> Option<SynStateId> {
        self.out_transitions_by_element(absorber)?.get(&target).copied()
    }
}
