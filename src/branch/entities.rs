use bevy::prelude::*;

use super::BranchTree;

/// A branch tree rendered as one mesh on this entity.
#[derive(Component, Clone, Debug, Default)]
pub struct Branch {
    /// Segments and their cached tubes.
    pub tree: BranchTree,
}

impl Branch {
    /// Wraps an already built tree.
    pub fn new(tree: BranchTree) -> Self {
        Self { tree }
    }
}
