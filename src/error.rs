//! Error types for grammar construction and graph building.

use thiserror::Error;

use crate::base::{ElementId, Name, RuleId};

/// Errors that can occur while building grammars and sequencer graphs.
///
/// Reachability failures are never errors: an unreachable target is reported
/// as [`UNREACHABLE`](crate::nav::UNREACHABLE) or `None`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencerError {
    /// A grammar element has no syntactic role (e.g. an enum rule call
    /// outside of any assignment).
    #[error("Malformed grammar reference: no syntactic role for {element:?} in rule '{rule}'")]
    MalformedGrammarReference { element: ElementId, rule: Name },

    /// A transition was about to target a start state.
    #[error("Start states can not have incoming transitions")]
    StartStateIncomingTransition,

    /// An automaton state does not have the shape its kind requires.
    #[error("Malformed automaton state: {0}")]
    MalformedAutomatonState(String),

    /// The requested context has no graph (not a parser rule, or not an
    /// assigned action).
    #[error("Unknown context: {0}")]
    UnknownContext(String),

    /// The grammar builder rejected the grammar.
    #[error("Invalid grammar: {0}")]
    InvalidGrammar(String),

    /// A rule id does not belong to the grammar.
    #[error("Unknown rule: {0:?}")]
    UnknownRule(RuleId),
}

impl SequencerError {
    /// Create an invalid grammar error.
    pub fn invalid_grammar(message: impl Into<String>) -> Self {
        Self::InvalidGrammar(message.into())
    }

    /// Create an unknown context error.
    pub fn unknown_context(message: impl Into<String>) -> Self {
        Self::UnknownContext(message.into())
    }

    /// Whether this error is a builder invariant violation rather than a
    /// problem with the supplied grammar.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::StartStateIncomingTransition | Self::MalformedAutomatonState(_)
        )
    }
}

/// Result type for sequencer operations.
pub type Result<T> = std::result::Result<T, SequencerError>;
