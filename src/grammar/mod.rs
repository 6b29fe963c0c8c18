//! Grammar AST — the read-only rule model the sequencer analyses.
//!
//! The grammar is an arena of [`Rule`]s and [`GrammarElement`]s. Elements
//! know their parent and their containing rule, so containment questions
//! ("is this keyword inside an assignment?") are cheap upward walks.
//!
//! Grammars are assembled with [`GrammarBuilder`] and never change once
//! finished; every analysis layer references elements by [`ElementId`].

mod builder;
mod query;
mod title;

pub use builder::GrammarBuilder;

use indexmap::IndexMap;

use crate::base::{ElementId, Name, RuleId};

/// How often an element may occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Cardinality {
    /// Exactly once.
    #[default]
    One,
    /// `?`
    Optional,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
}

impl Cardinality {
    /// `?` or `*`: the element may be skipped.
    pub fn is_optional(self) -> bool {
        matches!(self, Self::Optional | Self::ZeroOrMore)
    }

    /// `*` or `+`: the element may repeat.
    pub fn is_multiple(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Get string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::One => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

/// Assignment operator of an assignment or action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssignOp {
    /// `=`
    Set,
    /// `+=`
    Add,
    /// `?=`
    Bool,
}

impl AssignOp {
    /// Get string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "=",
            Self::Add => "+=",
            Self::Bool => "?=",
        }
    }
}

/// The type a parser rule produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnType {
    /// An object type; calls to the rule create model objects.
    Structured(Name),
    /// A primitive value; the rule is a datatype rule.
    Datatype(Name),
}

/// Kind of a grammar rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Parser { returns: ReturnType },
    Terminal,
    Enum,
}

/// A grammar rule.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: Name,
    pub kind: RuleKind,
    /// Root element of the rule's right-hand side. Only parser rules have one.
    pub body: Option<ElementId>,
}

impl Rule {
    pub fn is_parser_rule(&self) -> bool {
        matches!(self.kind, RuleKind::Parser { .. })
    }

    /// A parser rule returning an object type.
    pub fn is_structured(&self) -> bool {
        matches!(
            self.kind,
            RuleKind::Parser {
                returns: ReturnType::Structured(_)
            }
        )
    }

    /// A parser rule returning a primitive value.
    pub fn is_datatype(&self) -> bool {
        matches!(
            self.kind,
            RuleKind::Parser {
                returns: ReturnType::Datatype(_)
            }
        )
    }
}

/// The syntactic shape of an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    Keyword(Name),
    RuleCall(RuleId),
    Assignment {
        feature: Name,
        operator: AssignOp,
        terminal: ElementId,
    },
    CrossReference {
        type_name: Name,
        terminal: ElementId,
    },
    /// `{Type}` or `{Type.feature=current}`
    Action {
        type_name: Name,
        feature: Option<Name>,
        operator: Option<AssignOp>,
    },
    Alternatives(Vec<ElementId>),
    Group(Vec<ElementId>),
}

/// One node of the grammar arena.
#[derive(Debug, Clone)]
pub struct GrammarElement {
    pub kind: ElementKind,
    pub cardinality: Cardinality,
    pub parent: Option<ElementId>,
    pub rule: RuleId,
}

/// An immutable grammar.
#[derive(Debug, Clone)]
pub struct Grammar {
    name: Name,
    rules: Vec<Rule>,
    elements: Vec<GrammarElement>,
    rules_by_name: IndexMap<Name, RuleId>,
}

impl Grammar {
    pub fn name(&self) -> &Name {
        &self.name
    }

    /// Get a rule. Ids always come from this grammar's builder.
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    /// Get an element.
    pub fn element(&self, id: ElementId) -> &GrammarElement {
        &self.elements[id.index()]
    }

    /// Find a rule by name.
    pub fn rule_by_name(&self, name: &str) -> Option<RuleId> {
        self.rules_by_name.get(name).copied()
    }

    /// All rule ids in declaration order.
    pub fn rule_ids(&self) -> impl Iterator<Item = RuleId> + '_ {
        (0..self.rules.len()).map(RuleId::from_index)
    }

    /// Parser rules with a body, in declaration order.
    pub fn parser_rules(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.rule_ids().filter(|id| {
            let rule = self.rule(*id);
            rule.is_parser_rule() && rule.body.is_some()
        })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }
}
