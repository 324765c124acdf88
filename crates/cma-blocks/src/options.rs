use serde::{Deserialize, Serialize};

/// Order in which the recursive map and filter operations process a block
/// relative to the blocks nested inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalDirection {
    /// Top-down: a block's callback runs before its nested blocks are
    /// processed, so it sees the original children.
    #[default]
    AncestorFirst,
    /// Bottom-up: nested blocks are processed first, so a block's callback
    /// sees children that are already transformed.
    DescendantFirst,
}

impl TraversalDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AncestorFirst => "ancestor_first",
            Self::DescendantFirst => "descendant_first",
        }
    }
}

impl std::fmt::Display for TraversalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options for a [`BlockTraverser`](crate::BlockTraverser).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraversalOptions {
    #[serde(default)]
    pub direction: TraversalDirection,
}

impl TraversalOptions {
    pub fn with_direction(mut self, direction: TraversalDirection) -> Self {
        self.direction = direction;
        self
    }
}
