//! Persistent stack of open rule-call sites.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter;
use std::sync::Arc;

use crate::base::ElementId;

#[derive(Debug)]
struct Frame {
    call: ElementId,
    parent: Option<Arc<Frame>>,
}

/// An immutable stack of rule-call sites. `push` and `pop` return new stacks
/// that share their tail with the original; equality and hashing compare the
/// frames, not the allocation.
#[derive(Clone, Default)]
pub struct RcStack {
    top: Option<Arc<Frame>>,
    len: usize,
}

impl RcStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, call: ElementId) -> Self {
        Self {
            top: Some(Arc::new(Frame {
                call,
                parent: self.top.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// The stack without its top frame. Popping an empty stack yields an
    /// empty stack.
    pub fn pop(&self) -> Self {
        match &self.top {
            Some(frame) => Self {
                top: frame.parent.clone(),
                len: self.len - 1,
            },
            None => Self::new(),
        }
    }

    pub fn peek(&self) -> Option<ElementId> {
        self.top.as_ref().map(|frame| frame.call)
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn contains(&self, call: ElementId) -> bool {
        self.iter().any(|frame| frame == call)
    }

    /// Frames from the top down.
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        iter::successors(self.top.as_deref(), |frame| frame.parent.as_deref()).map(|frame| frame.call)
    }
}

impl PartialEq for RcStack {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }
        match (&self.top, &other.top) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.iter().eq(other.iter()),
        }
    }
}

impl Eq for RcStack {}

impl Hash for RcStack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for frame in self.iter() {
            frame.hash(state);
        }
    }
}

impl fmt::Debug for RcStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Frames are pushed in iteration order, so the last item ends up on top.
impl FromIterator<ElementId> for RcStack {
    fn from_iter<I: IntoIterator<Item = ElementId>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::new(), |stack, call| stack.push(call))
    }
}
