//! GrammarSession — owns every per-grammar cache of the sequencer.
//!
//! A session is created once per grammar and passed to whoever needs
//! sequencer graphs. Graphs are built on first request, published into the
//! session's caches and shared as `Arc`s from then on. A changed grammar
//! means a new session.
//!
//! ## Usage
//!
//! ```ignore
//! let session = GrammarSession::new(grammar);
//!
//! // Build (or fetch) the graph of a parser rule
//! let graph = session.rule_graph(rule)?;
//! let summary = graph.summarize(transition, &RcStack::new());
//!
//! // Check the whole grammar for ambiguous syntax
//! session.build_all()?;
//! let diagnostics = session.ambiguity_diagnostics(Context::Rule(rule))?;
//! ```

mod diagnostics;
mod options;

pub use diagnostics::{Diagnostic, Severity};
pub use options::SequencerOptions;

use std::sync::Arc;

use parking_lot::RwLock;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, trace, warn};

use crate::automaton::{CallAutomaton, Context, FlowAutomaton};
use crate::base::{ElementId, Name, RuleId};
use crate::error::{Result, SequencerError};
use crate::grammar::Grammar;
use crate::syn::{SynGraph, build_graph_with_limit};

/// Owns the grammar and every graph built from it.
///
/// The session is `Send + Sync`; concurrent requests for the same context may
/// both build a graph, and the first one published wins.
pub struct GrammarSession {
    grammar: Arc<Grammar>,
    options: SequencerOptions,
    /// Flow states, shared by all contexts
    flow: FlowAutomaton,
    automata: RwLock<FxHashMap<Context, Arc<CallAutomaton>>>,
    graphs: RwLock<FxHashMap<Context, Arc<SynGraph>>>,
}

impl GrammarSession {
    /// Create a session with default options.
    pub fn new(grammar: impl Into<Arc<Grammar>>) -> Self {
        Self::with_options(grammar, SequencerOptions::default())
    }

    pub fn with_options(grammar: impl Into<Arc<Grammar>>, options: SequencerOptions) -> Self {
        Self {
            grammar: grammar.into(),
            options,
            flow: FlowAutomaton::new(),
            automata: RwLock::new(FxHashMap::default()),
            graphs: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn options(&self) -> &SequencerOptions {
        &self.options
    }

    pub fn flow(&self) -> &FlowAutomaton {
        &self.flow
    }

    /// Every context a graph can be built for: parser rules with a body,
    /// then feature-assigned actions, both in declaration order.
    pub fn contexts(&self) -> Vec<Context> {
        self.grammar
            .parser_rules()
            .map(Context::Rule)
            .chain(
                self.grammar
                    .all_assigned_actions()
                    .into_iter()
                    .map(Context::Action),
            )
            .collect()
    }

    /// Number of graphs built so far.
    pub fn graph_count(&self) -> usize {
        self.graphs.read().len()
    }

    // ========================================================================
    // GRAPHS
    // ========================================================================

    /// The absorption graph of a parser rule.
    pub fn rule_graph(&self, rule: RuleId) -> Result<Arc<SynGraph>> {
        self.graph(Context::Rule(rule))
    }

    /// The absorption graph of a feature-assigned action.
    pub fn action_graph(&self, action: ElementId) -> Result<Arc<SynGraph>> {
        self.graph(Context::Action(action))
    }

    /// The absorption graph of a context, built on first request.
    pub fn graph(&self, context: Context) -> Result<Arc<SynGraph>> {
        if let Some(graph) = self.graphs.read().get(&context) {
            return Ok(Arc::clone(graph));
        }
        let automaton = self.call_automaton(context)?;
        let graph = Arc::new(build_graph_with_limit(
            &self.grammar,
            &automaton,
            self.options.max_path_len,
        )?);
        if self.options.report_ambiguities {
            self.report(&graph);
        }
        let mut graphs = self.graphs.write();
        Ok(Arc::clone(graphs.entry(context).or_insert(graph)))
    }

    /// The call-aware automaton of a context, built on first request.
    pub fn call_automaton(&self, context: Context) -> Result<Arc<CallAutomaton>> {
        self.check_context(context)?;
        if let Some(automaton) = self.automata.read().get(&context) {
            return Ok(Arc::clone(automaton));
        }
        trace!("[SESSION] building automaton for {:?}", context);
        let automaton = Arc::new(CallAutomaton::build(&self.grammar, &self.flow, context)?);
        let mut automata = self.automata.write();
        Ok(Arc::clone(automata.entry(context).or_insert(automaton)))
    }

    /// Build the graph of every context in parallel.
    pub fn build_all(&self) -> Result<Vec<Arc<SynGraph>>> {
        let contexts = self.contexts();
        let graphs = contexts
            .par_iter()
            .map(|context| self.graph(*context))
            .collect::<Result<Vec<_>>>()?;
        debug!(
            "[SESSION] built {} graphs for grammar '{}'",
            graphs.len(),
            self.grammar.name()
        );
        Ok(graphs)
    }

    // ========================================================================
    // DIAGNOSTICS
    // ========================================================================

    /// One diagnostic per syntactically ambiguous transition of the
    /// context's graph.
    pub fn ambiguity_diagnostics(&self, context: Context) -> Result<Vec<Diagnostic>> {
        let graph = self.graph(context)?;
        Ok(diagnostics::ambiguity_diagnostics(
            &self.grammar,
            &graph,
            &self.context_rule_name(context),
            self.options.ambiguity_severity,
        ))
    }

    fn report(&self, graph: &SynGraph) {
        let rule = self.context_rule_name(graph.context());
        let found = diagnostics::ambiguity_diagnostics(
            &self.grammar,
            graph,
            &rule,
            self.options.ambiguity_severity,
        );
        for diagnostic in &found {
            warn!("[SESSION] {}: {}", diagnostic.severity.as_str(), diagnostic.message);
        }
    }

    fn context_rule_name(&self, context: Context) -> Name {
        let rule = match context {
            Context::Rule(rule) => rule,
            Context::Action(action) => self.grammar.containing_rule(action),
        };
        self.grammar.rule(rule).name.clone()
    }

    fn check_context(&self, context: Context) -> Result<()> {
        match context {
            Context::Rule(rule) if rule.index() >= self.grammar.rule_count() => {
                Err(SequencerError::UnknownRule(rule))
            }
            Context::Action(action) if action.index() >= self.grammar.element_count() => Err(
                SequencerError::unknown_context(format!("{:?} is not a grammar element", action)),
            ),
            _ => Ok(()),
        }
    }
}
