//! Foundation types for the sequencer.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`ElementId`], [`RuleId`] - Grammar arena identifiers
//! - [`CallStateId`], [`SynStateId`] - Automaton and graph arena identifiers
//! - [`Name`] - Cheap-to-clone grammar names
//!
//! This module has NO dependencies on other sequencer modules.

mod ids;

pub use ids::{CallStateId, ElementId, RuleId, SynStateId};

/// A rule, feature or type name. Short names are stored inline.
pub type Name = smol_str::SmolStr;
