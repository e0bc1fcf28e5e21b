//! Tree Model
//!
//! Wire documents (source configuration, endpoint documents) and the validated
//! in-memory hierarchy the renderer consumes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Source configuration document: which endpoint documents compose one hierarchy
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    /// Display name of the hierarchy
    #[serde(default)]
    pub name: Option<String>,

    /// Endpoint document references, in declared order
    #[serde(default)]
    pub endpoints: Option<Vec<String>>,
}

/// One endpoint document
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EndpointDocument {
    pub sections: Vec<SectionDoc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDoc {
    pub section_title: String,

    #[serde(default)]
    pub section_description: Option<String>,

    #[serde(default)]
    pub rules: Vec<RuleDoc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleDoc {
    pub rule_code: String,

    #[serde(default)]
    pub rule_description: Option<String>,

    #[serde(default)]
    pub requirements: Option<Vec<String>>,
}

/// Whether a node has children after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Branch,
    Leaf,
}

/// A node in the normalized hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Label, also half of the reconciliation key
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Only displayed on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeNode>>,
}

impl TreeNode {
    /// Root node; always carries a (possibly empty) child list
    pub fn root(name: impl Into<String>, children: Vec<TreeNode>) -> Self {
        Self {
            name: name.into(),
            description: None,
            requirements: None,
            children: Some(children),
        }
    }

    /// Valid empty state
    pub fn empty(name: impl Into<String>) -> Self {
        Self::root(name, Vec::new())
    }

    pub fn branch(
        name: impl Into<String>,
        description: Option<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            requirements: None,
            children: Some(children),
        }
    }

    pub fn leaf(
        name: impl Into<String>,
        description: Option<String>,
        requirements: Option<Vec<String>>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            requirements,
            children: None,
        }
    }

    pub fn children(&self) -> &[TreeNode] {
        self.children.as_deref().unwrap_or(&[])
    }

    pub fn kind(&self) -> NodeKind {
        if self.children().is_empty() {
            NodeKind::Leaf
        } else {
            NodeKind::Branch
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.kind() == NodeKind::Leaf
    }

    /// Requirements, hidden on branch nodes
    pub fn displayed_requirements(&self) -> Option<&[String]> {
        match self.kind() {
            NodeKind::Leaf => self.requirements.as_deref(),
            NodeKind::Branch => None,
        }
    }

    /// Resolve a path of sibling indices
    pub fn get(&self, path: &NodePath) -> Option<&TreeNode> {
        path.0
            .iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// Total node count, root included
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// Stable node identity: sibling indices from the root (empty = root)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NodePath(pub Vec<usize>);

impl NodePath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TreeNode {
        TreeNode::root(
            "Appendix",
            vec![
                TreeNode::branch(
                    "Part 1",
                    None,
                    vec![TreeNode::leaf("R1.1", None, Some(vec!["a".into()]))],
                ),
                TreeNode::branch("Part 2", None, vec![]),
            ],
        )
    }

    #[test]
    fn test_kind_is_derived_from_children() {
        let tree = sample();
        assert_eq!(tree.kind(), NodeKind::Branch);
        assert_eq!(tree.get(&NodePath(vec![0, 0])).unwrap().kind(), NodeKind::Leaf);
        // Present-but-empty children still make a leaf
        assert_eq!(tree.get(&NodePath(vec![1])).unwrap().kind(), NodeKind::Leaf);
    }

    #[test]
    fn test_branch_hides_requirements() {
        let mut branch = TreeNode::branch("B", None, vec![TreeNode::leaf("L", None, None)]);
        branch.requirements = Some(vec!["hidden".into()]);
        assert!(branch.displayed_requirements().is_none());

        let leaf = TreeNode::leaf("L", None, Some(vec!["shown".into()]));
        assert_eq!(leaf.displayed_requirements().unwrap(), ["shown".to_string()]);
    }

    #[test]
    fn test_path_lookup() {
        let tree = sample();
        assert_eq!(tree.get(&NodePath::root()).unwrap().name, "Appendix");
        assert_eq!(tree.get(&NodePath(vec![0, 0])).unwrap().name, "R1.1");
        assert!(tree.get(&NodePath(vec![3])).is_none());
        assert_eq!(NodePath(vec![0, 2]).to_string(), "/0/2");
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_endpoint_document_parsing() {
        let json = r#"{
            "sections": [{
                "sectionTitle": "Part 1",
                "rules": [{ "ruleCode": "R1", "requirements": ["x", "y"] }]
            }]
        }"#;
        let doc: EndpointDocument = serde_json::from_str(json).unwrap();
        assert_eq!(doc.sections[0].section_title, "Part 1");
        assert!(doc.sections[0].section_description.is_none());
        assert_eq!(doc.sections[0].rules[0].requirements.as_ref().unwrap().len(), 2);
    }
}
