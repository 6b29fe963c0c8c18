//! Sequencer tests
//!
//! End-to-end tests from grammar to absorption graph:
//! - Graph shape for call-free rules
//! - Rule calls, stack balance and rule-exit draining
//! - Syntactic ambiguity
//! - Sessions: caching, contexts, diagnostics, errors

pub mod tests_ambiguity;
pub mod tests_calls;
pub mod tests_scenarios;
pub mod tests_session;
