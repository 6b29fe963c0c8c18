//! Sequencer options

use super::diagnostics::Severity;
use crate::syn::DEFAULT_MAX_PATH_LEN;

/// Options for a [`GrammarSession`](super::GrammarSession)
#[derive(Debug, Clone)]
pub struct SequencerOptions {
    /// Log ambiguous transitions whenever a graph is built
    pub report_ambiguities: bool,
    /// Severity of ambiguity diagnostics
    pub ambiguity_severity: Severity,
    /// Maximum number of steps of a greedy path walk
    pub max_path_len: usize,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self {
            report_ambiguities: false,
            ambiguity_severity: Severity::Warning,
            max_path_len: DEFAULT_MAX_PATH_LEN,
        }
    }
}

impl SequencerOptions {
    /// Options that log ambiguous transitions as they are found.
    pub fn reporting() -> Self {
        Self {
            report_ambiguities: true,
            ..Self::default()
        }
    }
}
