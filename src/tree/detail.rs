//! Detail display
//!
//! The renderer emits `DetailEvent`s when a leaf is selected or the selection is
//! dismissed; `DetailPanel` is the state the side panel draws from.

use crate::model::TreeNode;

/// Content shown for a selected leaf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDetail {
    pub name: String,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
}

impl NodeDetail {
    pub fn from_node(node: &TreeNode) -> Self {
        Self {
            name: node.name.clone(),
            description: node.description.clone(),
            requirements: node.displayed_requirements().map(|r| r.to_vec()),
        }
    }

    /// Title, falling back when the name is blank
    pub fn title(&self) -> &str {
        if self.name.trim().is_empty() {
            "Unnamed Rule"
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailEvent {
    Show(NodeDetail),
    Cleared,
}

/// Side panel state
#[derive(Debug, Clone, Default)]
pub struct DetailPanel {
    content: Option<NodeDetail>,
}

impl DetailPanel {
    pub fn apply(&mut self, event: DetailEvent) {
        match event {
            DetailEvent::Show(detail) => self.content = Some(detail),
            DetailEvent::Cleared => self.content = None,
        }
    }

    pub fn content(&self) -> Option<&NodeDetail> {
        self.content.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.content.is_some()
    }
}
