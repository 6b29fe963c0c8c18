//! Diagnostics — grammar ambiguity reporting.
//!
//! A syntactically ambiguous transition is not an error for the sequencer
//! (the serializer picks one of the routes) but grammar authors usually
//! want to know about it.

use std::sync::Arc;

use crate::base::Name;
use crate::grammar::Grammar;
use crate::render::node_title;
use crate::syn::SynGraph;

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
            Severity::Hint => "hint",
        }
    }
}

/// A diagnostic about one transition of a context's graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// The rule the context belongs to.
    pub rule: Name,
    /// Title of the absorber the transition leaves.
    pub source: String,
    /// Title of the absorber the transition reaches.
    pub target: String,
    /// The diagnostic message.
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new warning diagnostic.
    pub fn warning(
        rule: Name,
        source: String,
        target: String,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            rule,
            source,
            target,
            message: message.into(),
        }
    }

    /// Set the severity.
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

/// One diagnostic per ambiguous transition of `graph`.
pub(crate) fn ambiguity_diagnostics(
    grammar: &Grammar,
    graph: &SynGraph,
    rule: &Name,
    severity: Severity,
) -> Vec<Diagnostic> {
    graph
        .ambiguous_transitions()
        .into_iter()
        .filter_map(|transition| {
            let node = graph.node(transition);
            let source = node_title(grammar, graph, node.source()?);
            let target = node_title(grammar, graph, node.target()?);
            let message = format!(
                "ambiguous syntax in rule '{}' between {} and {}",
                rule, source, target
            );
            Some(Diagnostic::warning(rule.clone(), source, target, message).with_severity(severity))
        })
        .collect()
}
