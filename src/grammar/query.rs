//! Structural queries over a [`Grammar`].
//!
//! These answer the containment questions the analysis layers ask about an
//! element: which assignment or cross-reference it sits in, whether it is a
//! value-consuming point, and whether it can be skipped.

use super::{AssignOp, ElementKind, Grammar};
use crate::base::{ElementId, RuleId};

impl Grammar {
    /// The element itself or its nearest ancestor matching `pred`.
    fn enclosing(&self, id: ElementId, pred: impl Fn(&ElementKind) -> bool) -> Option<ElementId> {
        let mut current = Some(id);
        while let Some(element) = current {
            let node = self.element(element);
            if pred(&node.kind) {
                return Some(element);
            }
            current = node.parent;
        }
        None
    }

    /// The assignment containing `id` (or `id` itself if it is one).
    pub fn containing_assignment(&self, id: ElementId) -> Option<ElementId> {
        self.enclosing(id, |kind| matches!(kind, ElementKind::Assignment { .. }))
    }

    /// The cross-reference containing `id` (or `id` itself if it is one).
    pub fn containing_cross_reference(&self, id: ElementId) -> Option<ElementId> {
        self.enclosing(id, |kind| matches!(kind, ElementKind::CrossReference { .. }))
    }

    /// The rule whose body contains `id`.
    pub fn containing_rule(&self, id: ElementId) -> RuleId {
        self.element(id).rule
    }

    /// Inside an assignment: the element produces a feature value.
    pub fn is_assigned(&self, id: ElementId) -> bool {
        self.containing_assignment(id).is_some()
    }

    /// `{Type.feature=current}`
    pub fn is_assigned_action(&self, id: ElementId) -> bool {
        matches!(
            self.element(id).kind,
            ElementKind::Action {
                feature: Some(_),
                ..
            }
        )
    }

    /// `feature?=...`
    pub fn is_boolean_assignment(&self, assignment: ElementId) -> bool {
        matches!(
            self.element(assignment).kind,
            ElementKind::Assignment {
                operator: AssignOp::Bool,
                ..
            }
        )
    }

    /// The rule called by a rule call element.
    pub fn callee(&self, id: ElementId) -> Option<RuleId> {
        match self.element(id).kind {
            ElementKind::RuleCall(rule) => Some(rule),
            _ => None,
        }
    }

    /// Elements the flow automaton looks through instead of stopping at:
    /// compounds, assignments and cross-references.
    pub fn is_transparent(&self, id: ElementId) -> bool {
        matches!(
            self.element(id).kind,
            ElementKind::Alternatives(_)
                | ElementKind::Group(_)
                | ElementKind::Assignment { .. }
                | ElementKind::CrossReference { .. }
        )
    }

    /// Direct children in declaration order.
    pub fn children(&self, id: ElementId) -> &[ElementId] {
        match &self.element(id).kind {
            ElementKind::Alternatives(children) | ElementKind::Group(children) => children,
            ElementKind::Assignment { terminal, .. }
            | ElementKind::CrossReference { terminal, .. } => std::slice::from_ref(terminal),
            ElementKind::Keyword(_) | ElementKind::RuleCall(_) | ElementKind::Action { .. } => &[],
        }
    }

    /// Whether the element can match without consuming any token, judged on
    /// the element structure only (callees are not inspected).
    pub fn is_nullable(&self, id: ElementId) -> bool {
        let node = self.element(id);
        if node.cardinality.is_optional() {
            return true;
        }
        match &node.kind {
            ElementKind::Group(children) => children.iter().all(|c| self.is_nullable(*c)),
            ElementKind::Alternatives(children) => children.iter().any(|c| self.is_nullable(*c)),
            ElementKind::Assignment { terminal, .. }
            | ElementKind::CrossReference { terminal, .. } => self.is_nullable(*terminal),
            ElementKind::Keyword(_) | ElementKind::RuleCall(_) | ElementKind::Action { .. } => {
                false
            }
        }
    }

    /// All elements of a rule body in pre-order.
    pub fn descendants(&self, rule: RuleId) -> Vec<ElementId> {
        let mut result = Vec::new();
        let Some(body) = self.rule(rule).body else {
            return result;
        };
        let mut stack = vec![body];
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// Actions contained in a rule, in declaration order.
    pub fn contained_actions(&self, rule: RuleId) -> Vec<ElementId> {
        self.descendants(rule)
            .into_iter()
            .filter(|id| matches!(self.element(*id).kind, ElementKind::Action { .. }))
            .collect()
    }

    /// Feature-assigned actions contained in a rule, in declaration order.
    pub fn assigned_actions(&self, rule: RuleId) -> Vec<ElementId> {
        self.contained_actions(rule)
            .into_iter()
            .filter(|id| self.is_assigned_action(*id))
            .collect()
    }

    /// All feature-assigned actions of the grammar.
    pub fn all_assigned_actions(&self) -> Vec<ElementId> {
        self.parser_rules()
            .flat_map(|rule| self.assigned_actions(rule))
            .collect()
    }
}
