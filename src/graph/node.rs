//! Node identifiers and interaction state.
//!
//! Ids are plain integers taken from the graph document. Zero is an ordinary
//! id with no special meaning.

use std::fmt;

/// Stable node identifier, as carried by the graph document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Node interaction flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const HIGHLIGHTED: u8 = 0b0000_0001;
    const HOVERED: u8 = 0b0000_0010;

    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    #[inline]
    pub fn is_highlighted(self) -> bool {
        self.flags & Self::HIGHLIGHTED != 0
    }

    #[inline]
    pub fn set_highlighted(&mut self, highlighted: bool) {
        if highlighted {
            self.flags |= Self::HIGHLIGHTED;
        } else {
            self.flags &= !Self::HIGHLIGHTED;
        }
    }

    /// Flip the highlight flag.
    #[inline]
    pub fn toggle_highlighted(&mut self) {
        self.flags ^= Self::HIGHLIGHTED;
    }

    /// Check if the node is under the pointer (tooltip target).
    #[inline]
    pub fn is_hovered(self) -> bool {
        self.flags & Self::HOVERED != 0
    }

    #[inline]
    pub fn set_hovered(&mut self, hovered: bool) {
        if hovered {
            self.flags |= Self::HOVERED;
        } else {
            self.flags &= !Self::HOVERED;
        }
    }
}
