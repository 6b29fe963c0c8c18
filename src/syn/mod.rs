//! Absorption graphs.
//!
//! An absorption graph condenses a call-aware automaton to the states where
//! the serializer consumes a model value (absorbers). Everything between two
//! absorbers is kept as an ordered chain of emitters on the transition that
//! joins them, so the graph grows with the number of value-consuming points
//! rather than with the grammar expansion.

mod builder;
mod graph;
mod role;

pub use builder::{DEFAULT_MAX_PATH_LEN, build_graph, build_graph_with_limit};
pub use graph::{AbsorberEdges, NodeShape, SynGraph, SynNode};
pub use role::{
    SyntacticRole, classify, classify_element, is_mandatory_absorber, is_optional_absorber,
};
