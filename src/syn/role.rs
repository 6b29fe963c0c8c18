//! Syntactic roles of automaton states.
//!
//! The role tells the serializer what a state does with the model: consume a
//! feature value (and from which kind of token), emit fixed syntax, or move
//! between rules. Classification is a pure function of the state's shape and
//! the element's grammar context.

use std::fmt;

use crate::automaton::{CallState, CallStateKind};
use crate::base::ElementId;
use crate::error::{Result, SequencerError};
use crate::grammar::{ElementKind, Grammar, RuleKind};

/// Role of a node in the absorption graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntacticRole {
    Start,
    Stop,
    /// Zero-cost pseudo-node between two absorbers
    Transition,
    UnassignedParserRuleEnter,
    UnassignedParserRuleExit,
    AssignedActionCall,
    UnassignedActionCall,
    AssignedCrossrefDatatypeRuleCall,
    AssignedCrossrefTerminalRuleCall,
    AssignedCrossrefEnumRuleCall,
    AssignedCrossrefKeyword,
    AssignedParserRuleCall,
    AssignedDatatypeRuleCall,
    AssignedTerminalRuleCall,
    AssignedEnumRuleCall,
    AssignedBooleanKeyword,
    AssignedKeyword,
    UnassignedDatatypeRuleCall,
    UnassignedTerminalRuleCall,
    UnassignedKeyword,
}

impl SyntacticRole {
    /// The automaton state kind this role belongs to. `None` for transitions.
    pub fn simple_kind(self) -> Option<CallStateKind> {
        match self {
            Self::Start => Some(CallStateKind::Start),
            Self::Stop => Some(CallStateKind::Stop),
            Self::Transition => None,
            Self::UnassignedParserRuleEnter => Some(CallStateKind::RuleCallEnter),
            Self::UnassignedParserRuleExit => Some(CallStateKind::RuleCallExit),
            _ => Some(CallStateKind::Element),
        }
    }

    pub fn is_rule_call_enter(self) -> bool {
        self == Self::UnassignedParserRuleEnter
    }

    pub fn is_rule_call_exit(self) -> bool {
        self == Self::UnassignedParserRuleExit
    }

    /// Unassigned terminal or datatype rule calls: tokens the serializer has
    /// to produce text for without a model value.
    pub fn is_unassigned_token_rule_call(self) -> bool {
        matches!(
            self,
            Self::UnassignedDatatypeRuleCall | Self::UnassignedTerminalRuleCall
        )
    }

    /// The role consumes a model value.
    pub fn is_assigned(self) -> bool {
        matches!(
            self,
            Self::AssignedActionCall
                | Self::AssignedCrossrefDatatypeRuleCall
                | Self::AssignedCrossrefTerminalRuleCall
                | Self::AssignedCrossrefEnumRuleCall
                | Self::AssignedCrossrefKeyword
                | Self::AssignedParserRuleCall
                | Self::AssignedDatatypeRuleCall
                | Self::AssignedTerminalRuleCall
                | Self::AssignedEnumRuleCall
                | Self::AssignedBooleanKeyword
                | Self::AssignedKeyword
        )
    }

    /// Get string representation
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Transition => "transition",
            Self::UnassignedParserRuleEnter => "unassigned-parser-rule-enter",
            Self::UnassignedParserRuleExit => "unassigned-parser-rule-exit",
            Self::AssignedActionCall => "assigned-action-call",
            Self::UnassignedActionCall => "unassigned-action-call",
            Self::AssignedCrossrefDatatypeRuleCall => "assigned-crossref-datatype-rule-call",
            Self::AssignedCrossrefTerminalRuleCall => "assigned-crossref-terminal-rule-call",
            Self::AssignedCrossrefEnumRuleCall => "assigned-crossref-enum-rule-call",
            Self::AssignedCrossrefKeyword => "assigned-crossref-keyword",
            Self::AssignedParserRuleCall => "assigned-parser-rule-call",
            Self::AssignedDatatypeRuleCall => "assigned-datatype-rule-call",
            Self::AssignedTerminalRuleCall => "assigned-terminal-rule-call",
            Self::AssignedEnumRuleCall => "assigned-enum-rule-call",
            Self::AssignedBooleanKeyword => "assigned-boolean-keyword",
            Self::AssignedKeyword => "assigned-keyword",
            Self::UnassignedDatatypeRuleCall => "unassigned-datatype-rule-call",
            Self::UnassignedTerminalRuleCall => "unassigned-terminal-rule-call",
            Self::UnassignedKeyword => "unassigned-keyword",
        }
    }
}

impl fmt::Display for SyntacticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a call-aware state.
pub fn classify(grammar: &Grammar, state: &CallState) -> Result<SyntacticRole> {
    classify_state(grammar, state.kind(), state.element())
}

fn classify_state(
    grammar: &Grammar,
    kind: CallStateKind,
    element: Option<ElementId>,
) -> Result<SyntacticRole> {
    match (kind, element) {
        (CallStateKind::Start, _) => Ok(SyntacticRole::Start),
        (CallStateKind::Stop, _) => Ok(SyntacticRole::Stop),
        (CallStateKind::RuleCallEnter, _) => Ok(SyntacticRole::UnassignedParserRuleEnter),
        (CallStateKind::RuleCallExit, _) => Ok(SyntacticRole::UnassignedParserRuleExit),
        (CallStateKind::Element, Some(element)) => classify_element(grammar, element),
        (CallStateKind::Element, None) => Err(SequencerError::MalformedAutomatonState(
            "element state without grammar element".to_string(),
        )),
    }
}

/// Classify a grammar element appearing as an ELEMENT state.
pub fn classify_element(grammar: &Grammar, element: ElementId) -> Result<SyntacticRole> {
    let kind = &grammar.element(element).kind;
    let callee_kind = grammar.callee(element).map(|rule| &grammar.rule(rule).kind);

    if let ElementKind::Action { feature, .. } = kind {
        return Ok(match feature {
            Some(_) => SyntacticRole::AssignedActionCall,
            None => SyntacticRole::UnassignedActionCall,
        });
    }

    let role = if grammar.containing_cross_reference(element).is_some() {
        match (kind, callee_kind) {
            (ElementKind::RuleCall(_), Some(RuleKind::Parser { .. })) => {
                Some(SyntacticRole::AssignedCrossrefDatatypeRuleCall)
            }
            (ElementKind::RuleCall(_), Some(RuleKind::Terminal)) => {
                Some(SyntacticRole::AssignedCrossrefTerminalRuleCall)
            }
            (ElementKind::RuleCall(_), Some(RuleKind::Enum)) => {
                Some(SyntacticRole::AssignedCrossrefEnumRuleCall)
            }
            (ElementKind::Keyword(_), _) => Some(SyntacticRole::AssignedCrossrefKeyword),
            _ => None,
        }
    } else if let Some(assignment) = grammar.containing_assignment(element) {
        match (kind, callee_kind) {
            (ElementKind::RuleCall(callee), Some(RuleKind::Parser { .. })) => {
                if grammar.rule(*callee).is_structured() {
                    Some(SyntacticRole::AssignedParserRuleCall)
                } else {
                    Some(SyntacticRole::AssignedDatatypeRuleCall)
                }
            }
            (ElementKind::RuleCall(_), Some(RuleKind::Terminal)) => {
                Some(SyntacticRole::AssignedTerminalRuleCall)
            }
            (ElementKind::RuleCall(_), Some(RuleKind::Enum)) => {
                Some(SyntacticRole::AssignedEnumRuleCall)
            }
            (ElementKind::Keyword(_), _) if grammar.is_boolean_assignment(assignment) => {
                Some(SyntacticRole::AssignedBooleanKeyword)
            }
            (ElementKind::Keyword(_), _) => Some(SyntacticRole::AssignedKeyword),
            _ => None,
        }
    } else {
        match (kind, callee_kind) {
            (ElementKind::RuleCall(_), Some(RuleKind::Parser { .. })) => {
                Some(SyntacticRole::UnassignedDatatypeRuleCall)
            }
            (ElementKind::RuleCall(_), Some(RuleKind::Terminal)) => {
                Some(SyntacticRole::UnassignedTerminalRuleCall)
            }
            (ElementKind::Keyword(_), _) => Some(SyntacticRole::UnassignedKeyword),
            _ => None,
        }
    };

    role.ok_or_else(|| SequencerError::MalformedGrammarReference {
        element,
        rule: grammar.rule(grammar.containing_rule(element)).name.clone(),
    })
}

/// Absorbers consume a model value or end the context: states without an
/// element (start/stop), assigned elements and assigned actions.
pub fn is_mandatory_absorber(grammar: &Grammar, element: Option<ElementId>) -> bool {
    match element {
        None => true,
        Some(element) => grammar.is_assigned(element) || grammar.is_assigned_action(element),
    }
}

/// Extension point for absorbers the serializer may skip. No grammar
/// construct produces one yet.
pub fn is_optional_absorber(_grammar: &Grammar, _element: Option<ElementId>) -> bool {
    false
}
