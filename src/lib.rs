//! # syster-sequencer
//!
//! Grammar analysis for serializers: decides the order in which a model's
//! features are emitted as syntax, and which parts of a grammar leave that
//! order ambiguous.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! session   → GrammarSession: graph caches, build_all, diagnostics
//!   ↓
//! nav       → Distances, shortest paths, ambiguity (RcStack)
//!   ↓
//! syn       → Absorption graphs: absorbers, emitters, transitions
//!   ↓
//! automaton → Flow automaton, call-aware (pushdown) automaton
//!   ↓
//! grammar   → Rule/element arena, GrammarBuilder, structural queries
//!   ↓
//! base      → Primitives (arena ids, Name)
//! ```

// ============================================================================
// MODULES (dependency order: base → grammar → automaton → syn → nav → session)
// ============================================================================

/// Foundation types: arena ids, Name
pub mod base;

/// Grammar model: rules, elements, builder
pub mod grammar;

/// Flow automaton and call-aware automaton
pub mod automaton;

/// Absorption graphs and syntactic roles
pub mod syn;

/// Path and ambiguity queries
pub mod nav;

/// Per-grammar session owning all caches
pub mod session;

/// Textual graph dumps
pub mod render;

/// Error types
pub mod error;

// Re-export commonly needed items
pub use automaton::{CallAutomaton, CallStateKind, Context, FlowAutomaton};
pub use error::{Result, SequencerError};
pub use grammar::{AssignOp, Cardinality, Grammar, GrammarBuilder};
pub use nav::{RcStack, TransitionSummary, UNREACHABLE};
pub use render::render_graph;
pub use session::{Diagnostic, GrammarSession, SequencerOptions, Severity};
pub use syn::{SynGraph, SyntacticRole};

// Re-export foundation types
pub use base::{CallStateId, ElementId, Name, RuleId, SynStateId};
