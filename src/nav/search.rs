//! Cycle-guarded searches over an absorption graph.
//!
//! Every navigation query is an instance of the two searches here,
//! parameterized by a `matches` predicate (what we look for) and a `bounds`
//! predicate (what we must not walk through). The stack of open rule calls
//! travels along so that a rule-call exit is only taken when it returns to
//! the call on top of the stack.

use tracing::trace;

use super::rc_stack::RcStack;
use crate::base::{ElementId, SynStateId};
use crate::syn::{SynGraph, SyntacticRole};

/// Distance reported for targets that cannot be reached.
pub const UNREACHABLE: u32 = u32::MAX;

// ============================================================================
// PREDICATES
// ============================================================================

/// Absorber nodes.
pub fn absorber() -> impl Fn(&SynGraph, SynStateId) -> bool + Copy {
    |graph, id| graph.node(id).is_absorber()
}

/// The emitter wrapping `element`.
pub fn emitter(element: ElementId) -> impl Fn(&SynGraph, SynStateId) -> bool + Copy {
    move |graph, id| {
        let node = graph.node(id);
        node.is_emitter() && node.element() == Some(element)
    }
}

/// The exit of the rule call `call`.
pub fn rule_call_exit(call: ElementId) -> impl Fn(&SynGraph, SynStateId) -> bool + Copy {
    move |graph, id| {
        let node = graph.node(id);
        node.role().is_rule_call_exit() && node.element() == Some(call)
    }
}

/// Any rule-call exit.
pub fn rule_call_exits() -> impl Fn(&SynGraph, SynStateId) -> bool + Copy {
    |graph, id| graph.role(id).is_rule_call_exit()
}

pub fn rule_call_exits_or_absorber() -> impl Fn(&SynGraph, SynStateId) -> bool + Copy {
    |graph, id| graph.role(id).is_rule_call_exit() || graph.node(id).is_absorber()
}

// ============================================================================
// SEARCH
// ============================================================================

/// The stack after walking through `id`, or `None` when `id` is the exit of
/// a call other than the one on top of the stack.
fn step_stack(graph: &SynGraph, id: SynStateId, stack: &RcStack) -> Option<RcStack> {
    let node = graph.node(id);
    let role = node.role();
    match node.element() {
        Some(call) if role.is_rule_call_exit() => match stack.peek() {
            None => Some(stack.clone()),
            Some(top) if top == call => Some(stack.pop()),
            Some(_) => None,
        },
        Some(call) if role.is_rule_call_enter() => Some(stack.push(call)),
        _ => Some(stack.clone()),
    }
}

/// `id` is the exit of the call on top of `stack`.
fn closes_open_call(graph: &SynGraph, id: SynStateId, stack: &RcStack) -> bool {
    let node = graph.node(id);
    node.role().is_rule_call_exit() && node.element().is_some() && stack.peek() == node.element()
}

/// A boundary stops the walk, except for the exit that closes the innermost
/// open call.
fn blocked<B>(graph: &SynGraph, id: SynStateId, bounds: &B, stack: &RcStack) -> bool
where
    B: Fn(&SynGraph, SynStateId) -> bool,
{
    bounds(graph, id) && !closes_open_call(graph, id, stack)
}

/// Number of hops from `from` to the nearest node accepted by `matches`.
///
/// `from` itself counts: a matching `from` has distance 0. Transition
/// pseudo-nodes cost nothing. Nodes accepted by `bounds` (other than the
/// exit of the innermost open call), and nodes already on the current path,
/// are [`UNREACHABLE`].
pub fn distance_to<M, B>(
    graph: &SynGraph,
    from: SynStateId,
    matches: &M,
    bounds: &B,
    stack: &RcStack,
) -> u32
where
    M: Fn(&SynGraph, SynStateId) -> bool,
    B: Fn(&SynGraph, SynStateId) -> bool,
{
    let mut path = Vec::new();
    distance_on_path(graph, from, matches, bounds, stack, &mut path)
}

fn distance_on_path<M, B>(
    graph: &SynGraph,
    id: SynStateId,
    matches: &M,
    bounds: &B,
    stack: &RcStack,
    path: &mut Vec<SynStateId>,
) -> u32
where
    M: Fn(&SynGraph, SynStateId) -> bool,
    B: Fn(&SynGraph, SynStateId) -> bool,
{
    if matches(graph, id) {
        return 0;
    }
    if blocked(graph, id, bounds, stack) || path.contains(&id) {
        return UNREACHABLE;
    }
    let Some(stack) = step_stack(graph, id, stack) else {
        return UNREACHABLE;
    };

    path.push(id);
    let mut dist = UNREACHABLE;
    for follower in graph.followers(id) {
        dist = dist.min(distance_on_path(graph, *follower, matches, bounds, &stack, path));
    }
    path.pop();

    if dist != UNREACHABLE && graph.role(id) != SyntacticRole::Transition {
        dist += 1;
    }
    dist
}

/// Greedy walk from the followers of `from` to a node accepted by `matches`.
///
/// With a single route the walk follows it; with several it takes the
/// non-boundary emitter closest to the target, the first one in declaration
/// order on ties. Exits pop the stack; the exit of the innermost open call
/// is never a boundary. Returns the nodes walked through (plus the match
/// when `include_match` is set), or `None` when the walk hits a boundary, an
/// absorber, a dead end, an exit of a call that is not open, or the graph's
/// step limit.
pub fn shortest_path_to<M, B>(
    graph: &SynGraph,
    from: SynStateId,
    matches: &M,
    bounds: &B,
    stack: &RcStack,
    include_match: bool,
) -> Option<Vec<SynStateId>>
where
    M: Fn(&SynGraph, SynStateId) -> bool,
    B: Fn(&SynGraph, SynStateId) -> bool,
{
    let mut routes = graph.followers(from);
    let mut stack = stack.clone();
    let mut result = Vec::new();

    for _ in 0..graph.max_path_len {
        let next = if let [only] = routes {
            if matches(graph, *only) {
                if include_match {
                    result.push(*only);
                }
                return Some(result);
            }
            if blocked(graph, *only, bounds, &stack) {
                return None;
            }
            Some(*only)
        } else {
            let mut best = None;
            let mut min_dist = UNREACHABLE;
            for follower in routes {
                if matches(graph, *follower) {
                    if include_match {
                        result.push(*follower);
                    }
                    return Some(result);
                }
                if !blocked(graph, *follower, bounds, &stack) && graph.node(*follower).is_emitter() {
                    let dist = distance_to(graph, *follower, matches, bounds, &stack);
                    if dist < min_dist {
                        best = Some(*follower);
                        min_dist = dist;
                    }
                }
            }
            best
        };

        let next = match next {
            Some(next) if !graph.node(next).is_absorber() => next,
            _ => return None,
        };
        stack = step_stack(graph, next, &stack)?;
        routes = graph.followers(next);
        result.push(next);
    }

    trace!(
        "[NAV] path walk from {:?} gave up after {} steps",
        from, graph.max_path_len
    );
    None
}
