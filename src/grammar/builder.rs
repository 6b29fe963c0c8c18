//! Incremental construction of [`Grammar`]s.
//!
//! Elements are created bottom-up: children first, then the compound that
//! owns them. Rules are declared before their bodies so that recursive and
//! forward rule calls can be expressed.
//!
//! ```ignore
//! let mut b = GrammarBuilder::new("Demo");
//! let id = b.terminal_rule("ID");
//! let foo = b.parser_rule("Foo", "Foo");
//! let kw = b.keyword("a");
//! let name = b.call(id);
//! let name = b.assign("name", AssignOp::Set, name);
//! let body = b.group([kw, name]);
//! b.define(foo, body);
//! let grammar = b.finish()?;
//! ```

use indexmap::IndexMap;

use super::{
    AssignOp, Cardinality, ElementKind, Grammar, GrammarElement, ReturnType, Rule, RuleKind,
};
use crate::base::{ElementId, Name, RuleId};
use crate::error::{Result, SequencerError};

#[derive(Debug)]
struct PendingElement {
    kind: ElementKind,
    cardinality: Cardinality,
    parent: Option<ElementId>,
}

/// Builder for [`Grammar`].
#[derive(Debug)]
pub struct GrammarBuilder {
    name: Name,
    rules: Vec<Rule>,
    elements: Vec<PendingElement>,
    rules_by_name: IndexMap<Name, RuleId>,
    /// Problems found while building, reported by `finish()`
    problems: Vec<String>,
}

impl GrammarBuilder {
    pub fn new(name: impl Into<Name>) -> Self {
        Self {
            name: name.into(),
            rules: Vec::new(),
            elements: Vec::new(),
            rules_by_name: IndexMap::new(),
            problems: Vec::new(),
        }
    }

    // ========================================================================
    // RULES
    // ========================================================================

    /// Declare a parser rule producing objects of type `returns`.
    pub fn parser_rule(&mut self, name: impl Into<Name>, returns: impl Into<Name>) -> RuleId {
        self.add_rule(
            name.into(),
            RuleKind::Parser {
                returns: ReturnType::Structured(returns.into()),
            },
        )
    }

    /// Declare a datatype rule (a parser rule producing a primitive value).
    pub fn datatype_rule(&mut self, name: impl Into<Name>) -> RuleId {
        self.add_rule(
            name.into(),
            RuleKind::Parser {
                returns: ReturnType::Datatype(Name::new_static("EString")),
            },
        )
    }

    pub fn terminal_rule(&mut self, name: impl Into<Name>) -> RuleId {
        self.add_rule(name.into(), RuleKind::Terminal)
    }

    pub fn enum_rule(&mut self, name: impl Into<Name>) -> RuleId {
        self.add_rule(name.into(), RuleKind::Enum)
    }

    fn add_rule(&mut self, name: Name, kind: RuleKind) -> RuleId {
        let id = RuleId::from_index(self.rules.len());
        if self.rules_by_name.insert(name.clone(), id).is_some() {
            self.problems.push(format!("duplicate rule '{}'", name));
        }
        self.rules.push(Rule {
            name,
            kind,
            body: None,
        });
        id
    }

    /// Set the body of a parser rule.
    pub fn define(&mut self, rule: RuleId, body: ElementId) {
        let Some(entry) = self.rules.get_mut(rule.index()) else {
            self.problems.push(format!("unknown rule {:?}", rule));
            return;
        };
        if !entry.is_parser_rule() {
            self.problems
                .push(format!("rule '{}' is not a parser rule", entry.name));
        } else if entry.body.is_some() {
            self.problems
                .push(format!("rule '{}' is defined twice", entry.name));
        } else {
            entry.body = Some(body);
        }
    }

    // ========================================================================
    // ELEMENTS
    // ========================================================================

    pub fn keyword(&mut self, value: impl Into<Name>) -> ElementId {
        self.add_element(ElementKind::Keyword(value.into()), &[])
    }

    pub fn call(&mut self, rule: RuleId) -> ElementId {
        self.add_element(ElementKind::RuleCall(rule), &[])
    }

    /// `feature op terminal`, e.g. `name=ID`.
    pub fn assign(
        &mut self,
        feature: impl Into<Name>,
        operator: AssignOp,
        terminal: ElementId,
    ) -> ElementId {
        self.add_element(
            ElementKind::Assignment {
                feature: feature.into(),
                operator,
                terminal,
            },
            &[terminal],
        )
    }

    /// `[Type|terminal]`
    pub fn cross_ref(&mut self, type_name: impl Into<Name>, terminal: ElementId) -> ElementId {
        self.add_element(
            ElementKind::CrossReference {
                type_name: type_name.into(),
                terminal,
            },
            &[terminal],
        )
    }

    /// `{Type}`
    pub fn action(&mut self, type_name: impl Into<Name>) -> ElementId {
        self.add_element(
            ElementKind::Action {
                type_name: type_name.into(),
                feature: None,
                operator: None,
            },
            &[],
        )
    }

    /// `{Type.feature=current}`
    pub fn assigned_action(
        &mut self,
        type_name: impl Into<Name>,
        feature: impl Into<Name>,
        operator: AssignOp,
    ) -> ElementId {
        self.add_element(
            ElementKind::Action {
                type_name: type_name.into(),
                feature: Some(feature.into()),
                operator: Some(operator),
            },
            &[],
        )
    }

    pub fn group(&mut self, children: impl IntoIterator<Item = ElementId>) -> ElementId {
        let children: Vec<_> = children.into_iter().collect();
        let owned = children.clone();
        self.add_element(ElementKind::Group(owned), &children)
    }

    pub fn alternatives(&mut self, children: impl IntoIterator<Item = ElementId>) -> ElementId {
        let children: Vec<_> = children.into_iter().collect();
        let owned = children.clone();
        self.add_element(ElementKind::Alternatives(owned), &children)
    }

    /// Set the cardinality of an element and return it.
    pub fn with_cardinality(&mut self, element: ElementId, cardinality: Cardinality) -> ElementId {
        match self.elements.get_mut(element.index()) {
            Some(pending) => pending.cardinality = cardinality,
            None => self
                .problems
                .push(format!("unknown element {:?}", element)),
        }
        element
    }

    /// `element?`
    pub fn optional(&mut self, element: ElementId) -> ElementId {
        self.with_cardinality(element, Cardinality::Optional)
    }

    /// `element*`
    pub fn many(&mut self, element: ElementId) -> ElementId {
        self.with_cardinality(element, Cardinality::ZeroOrMore)
    }

    /// `element+`
    pub fn one_or_more(&mut self, element: ElementId) -> ElementId {
        self.with_cardinality(element, Cardinality::OneOrMore)
    }

    fn add_element(&mut self, kind: ElementKind, children: &[ElementId]) -> ElementId {
        let id = ElementId::from_index(self.elements.len());
        for child in children {
            match self.elements.get_mut(child.index()) {
                Some(pending) if pending.parent.is_some() => self
                    .problems
                    .push(format!("element {:?} has more than one parent", child)),
                Some(pending) => pending.parent = Some(id),
                None => self.problems.push(format!("unknown element {:?}", child)),
            }
        }
        self.elements.push(PendingElement {
            kind,
            cardinality: Cardinality::One,
            parent: None,
        });
        id
    }

    // ========================================================================
    // FINISH
    // ========================================================================

    /// Validate and freeze the grammar.
    pub fn finish(self) -> Result<Grammar> {
        let Self {
            name,
            rules,
            elements,
            rules_by_name,
            mut problems,
        } = self;

        let mut owners: Vec<Option<RuleId>> = vec![None; elements.len()];
        for (index, rule) in rules.iter().enumerate() {
            let Some(body) = rule.body else {
                if rule.is_parser_rule() {
                    problems.push(format!("parser rule '{}' has no body", rule.name));
                }
                continue;
            };
            if elements
                .get(body.index())
                .is_some_and(|pending| pending.parent.is_some())
            {
                problems.push(format!(
                    "body of rule '{}' is nested in another element",
                    rule.name
                ));
                continue;
            }
            let mut stack = vec![body];
            while let Some(current) = stack.pop() {
                let Some(pending) = elements.get(current.index()) else {
                    continue;
                };
                if owners[current.index()].is_some() {
                    problems.push(format!("element {:?} is used by two rules", current));
                    continue;
                }
                owners[current.index()] = Some(RuleId::from_index(index));
                stack.extend(children_of(&pending.kind));
            }
        }

        for pending in &elements {
            if let ElementKind::RuleCall(callee) = pending.kind {
                if callee.index() >= rules.len() {
                    problems.push(format!("rule call to unknown rule {:?}", callee));
                }
            }
        }

        let mut frozen = Vec::with_capacity(elements.len());
        for (index, (pending, owner)) in elements.into_iter().zip(owners).enumerate() {
            let Some(rule) = owner else {
                problems.push(format!("element e{} is not part of any rule", index));
                continue;
            };
            frozen.push(GrammarElement {
                kind: pending.kind,
                cardinality: pending.cardinality,
                parent: pending.parent,
                rule,
            });
        }

        if !problems.is_empty() {
            return Err(SequencerError::invalid_grammar(problems.join("; ")));
        }

        Ok(Grammar {
            name,
            rules,
            elements: frozen,
            rules_by_name,
        })
    }
}

fn children_of(kind: &ElementKind) -> Vec<ElementId> {
    match kind {
        ElementKind::Assignment { terminal, .. } | ElementKind::CrossReference { terminal, .. } => {
            vec![*terminal]
        }
        ElementKind::Alternatives(children) | ElementKind::Group(children) => children.clone(),
        ElementKind::Keyword(_) | ElementKind::RuleCall(_) | ElementKind::Action { .. } => {
            Vec::new()
        }
    }
}
