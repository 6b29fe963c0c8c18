//! Path and ambiguity queries over absorption graphs.
//!
//! All traversals carry an explicit [`RcStack`] of open rule calls so that
//! rule-call enter and exit states stay balanced, and every one of them is
//! cycle-guarded: an unreachable target is [`UNREACHABLE`] or `None`, never
//! an error.

mod ambiguity;
mod navigate;
mod rc_stack;
pub mod search;

pub use navigate::{EmittedStep, TransitionSummary};
pub use rc_stack::RcStack;
pub use search::UNREACHABLE;
