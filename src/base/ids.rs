//! Arena identifiers.
//!
//! Every graph in the crate is an arena addressed by a small copyable index.
//! Identity of a grammar element or automaton state is identity of its index.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw arena index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Create an id from a `usize` arena position.
            #[inline]
            pub(crate) fn from_index(index: usize) -> Self {
                Self(index as u32)
            }

            /// The arena position of this id.
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// A grammar element (keyword, rule call, assignment, group, ...).
    ElementId,
    "e"
);

arena_id!(
    /// A grammar rule (parser, terminal or enum rule).
    RuleId,
    "r"
);

arena_id!(
    /// A state of a call-aware automaton.
    CallStateId,
    "c"
);

arena_id!(
    /// A node of an absorption graph (absorber, emitter or transition).
    SynStateId,
    "s"
);
