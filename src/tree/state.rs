//! Render state for one loaded hierarchy
//!
//! Created on every successful load and replaced wholesale on the next one.

use super::viewport::Viewport;
use crate::model::{NodePath, TreeNode};
use std::collections::HashSet;

/// Per-node expand/collapse state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollapseState {
    Expanded,
    Collapsed,
}

/// Everything the renderer mutates in response to interaction
#[derive(Debug, Clone)]
pub struct RenderState {
    pub root: TreeNode,
    /// Branches whose children are hidden
    pub collapsed: HashSet<NodePath>,
    pub viewport: Viewport,
    pub selected: Option<NodePath>,
}

impl RenderState {
    pub fn new(root: TreeNode, viewport: Viewport) -> Self {
        Self {
            root,
            collapsed: HashSet::new(),
            viewport,
            selected: None,
        }
    }

    pub fn collapse_state(&self, path: &NodePath) -> CollapseState {
        if self.collapsed.contains(path) {
            CollapseState::Collapsed
        } else {
            CollapseState::Expanded
        }
    }

    /// Flip a node between expanded and collapsed; returns the new state
    pub fn flip(&mut self, path: &NodePath) -> CollapseState {
        if self.collapsed.remove(path) {
            CollapseState::Expanded
        } else {
            self.collapsed.insert(path.clone());
            CollapseState::Collapsed
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selected.as_ref().and_then(|p| self.root.get(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::viewport::ViewTransform;

    #[test]
    fn test_flip_is_reversible() {
        let viewport = Viewport::new(ViewTransform::IDENTITY, 0.5, 5.0);
        let mut state = RenderState::new(TreeNode::empty("Root"), viewport);
        let path = NodePath(vec![2]);

        assert_eq!(state.collapse_state(&path), CollapseState::Expanded);
        assert_eq!(state.flip(&path), CollapseState::Collapsed);
        assert_eq!(state.collapse_state(&path), CollapseState::Collapsed);
        assert_eq!(state.flip(&path), CollapseState::Expanded);
        assert!(state.collapsed.is_empty());
        assert!(state.is_empty());
    }
}
