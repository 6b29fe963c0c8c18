//! Human-readable titles for grammar elements, used in graph dumps and logs.

use super::{ElementKind, Grammar};
use crate::base::ElementId;

impl Grammar {
    /// Title of an element on its own, in grammar notation
    /// (`'a'`, `ID`, `name=ID`, `[Type|ID]`, `{Add.left=}`, `('a' | 'b')*`).
    pub fn title(&self, id: ElementId) -> String {
        let node = self.element(id);
        let base = match &node.kind {
            ElementKind::Keyword(value) => format!("'{}'", value),
            ElementKind::RuleCall(rule) => self.rule(*rule).name.to_string(),
            ElementKind::Assignment {
                feature,
                operator,
                terminal,
            } => format!("{}{}{}", feature, operator.as_str(), self.title(*terminal)),
            ElementKind::CrossReference {
                type_name,
                terminal,
            } => format!("[{}|{}]", type_name, self.title(*terminal)),
            ElementKind::Action {
                type_name,
                feature,
                operator,
            } => match (feature, operator) {
                (Some(feature), Some(op)) => format!("{{{}.{}{}}}", type_name, feature, op.as_str()),
                _ => format!("{{{}}}", type_name),
            },
            ElementKind::Alternatives(children) => format!(
                "({})",
                children
                    .iter()
                    .map(|c| self.title(*c))
                    .collect::<Vec<_>>()
                    .join(" | ")
            ),
            ElementKind::Group(children) => format!(
                "({})",
                children
                    .iter()
                    .map(|c| self.title(*c))
                    .collect::<Vec<_>>()
                    .join(" ")
            ),
        };
        format!("{}{}", base, node.cardinality.as_str())
    }

    /// Title of a leaf prefixed with the assignment it feeds, so that the
    /// `ID` inside `name=ID` reads as `name=ID`.
    pub fn full_title(&self, id: ElementId) -> String {
        let Some(assignment) = self.containing_assignment(id) else {
            return self.title(id);
        };
        if assignment == id {
            return self.title(id);
        }
        let ElementKind::Assignment {
            feature, operator, ..
        } = &self.element(assignment).kind
        else {
            return self.title(id);
        };
        let leaf = match &self.element(id).kind {
            ElementKind::Keyword(value) => format!("'{}'", value),
            ElementKind::RuleCall(rule) => self.rule(*rule).name.to_string(),
            _ => self.title(id),
        };
        let inner = match self.containing_cross_reference(id) {
            Some(xref) if xref != id => match &self.element(xref).kind {
                ElementKind::CrossReference { type_name, .. } => {
                    format!("[{}|{}]", type_name, leaf)
                }
                _ => leaf,
            },
            _ => leaf,
        };
        format!("{}{}{}", feature, operator.as_str(), inner)
    }
}
