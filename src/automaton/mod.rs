//! Grammar automata: the flow automaton and the call-aware automaton built
//! on top of it.
//!
//! ```text
//! Grammar ──► FlowAutomaton (per element) ──► CallAutomaton (per context)
//! ```

pub mod flow;
pub mod pda;

pub use flow::{FlowAutomaton, FlowState, FlowTransition};
pub use pda::{
    CallAutomaton, CallState, CallStateKind, Context, all_rule_start_followers,
    can_enter_rule_call, can_reach_element, can_reach_end_state,
};
