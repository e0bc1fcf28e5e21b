//! Tidy tree layout
//!
//! Horizontal tree: depth maps to x, sibling order maps to y.
//! - Pass 1 (post-order): visible leaf count and maximum visible depth
//! - Pass 2 (pre-order): each visible leaf gets an equal vertical slot, each
//!   branch is centered over its first and last child
//!
//! Collapsed branches count as visible leaves. The result is a fresh snapshot;
//! nothing is committed on error.

use super::reconcile::Keyed;
use crate::error::{LayoutError, RenderError, ViewError};
use crate::model::{NodeKind, NodePath, TreeNode};
use egui::{Pos2, Rect, Vec2};
use std::collections::HashSet;
use std::fmt;

/// Reconciliation key: label plus depth, qualified by the ancestors' labels so
/// that only same-named siblings collide
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeKey {
    pub name: String,
    pub depth: usize,
    /// Ancestor labels, root first
    pub lineage: Vec<String>,
}

impl NodeKey {
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            depth: 0,
            lineage: Vec::new(),
        }
    }

    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut lineage = self.lineage.clone();
        lineage.push(self.name.clone());
        Self {
            name: name.into(),
            depth: self.depth + 1,
            lineage,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ancestor in &self.lineage {
            write!(f, "{}/", ancestor)?;
        }
        write!(f, "{}@{}", self.name, self.depth)
    }
}

/// A visible node with its computed position
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub key: NodeKey,
    pub path: NodePath,
    pub kind: NodeKind,
    /// Branch whose children are hidden
    pub collapsed: bool,
    pub position: Pos2,
}

/// A visible parent -> child link, keyed by the child
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutEdge {
    pub key: NodeKey,
    pub source: Pos2,
    pub target: Pos2,
}

impl Keyed for LayoutNode {
    type Key = NodeKey;

    fn key(&self) -> &NodeKey {
        &self.key
    }
}

impl Keyed for LayoutEdge {
    type Key = NodeKey;

    fn key(&self) -> &NodeKey {
        &self.key
    }
}

/// Visible node and edge sets for one structural state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeLayout {
    /// Pre-order
    pub nodes: Vec<LayoutNode>,
    pub edges: Vec<LayoutEdge>,
    /// Area the layout was computed for
    pub size: Vec2,
}

impl TreeLayout {
    pub fn node(&self, path: &NodePath) -> Option<&LayoutNode> {
        self.nodes.iter().find(|n| &n.path == path)
    }

    /// Bounding box of all node centers
    pub fn bounds(&self) -> Rect {
        let mut iter = self.nodes.iter().map(|n| n.position);
        match iter.next() {
            Some(first) => iter.fold(Rect::from_min_max(first, first), |rect, p| {
                rect.union(Rect::from_min_max(p, p))
            }),
            None => Rect::NOTHING,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

struct Metrics {
    leaves: usize,
    max_depth: usize,
}

/// Lay out the visible part of `root` inside `size` (width, height)
pub fn compute_layout(
    root: &TreeNode,
    collapsed: &HashSet<NodePath>,
    size: Vec2,
) -> Result<TreeLayout, ViewError> {
    if !(size.x.is_finite() && size.y.is_finite()) || size.x <= 0.0 || size.y <= 0.0 {
        return Err(LayoutError::DegenerateViewport {
            width: size.x,
            height: size.y,
        }
        .into());
    }

    let mut metrics = Metrics {
        leaves: 0,
        max_depth: 0,
    };
    measure(root, &NodePath::root(), collapsed, &mut metrics)?;

    let slot = size.y / metrics.leaves.max(1) as f32;
    let column = if metrics.max_depth == 0 {
        0.0
    } else {
        size.x / metrics.max_depth as f32
    };

    let mut placer = Placer {
        collapsed,
        slot,
        column,
        next_leaf: 0,
        nodes: Vec::new(),
        parents: Vec::new(),
    };
    placer.place(root, NodePath::root(), NodeKey::root(root.name.clone()), None);

    let Placer { nodes, parents, .. } = placer;
    let edges = nodes
        .iter()
        .zip(&parents)
        .filter_map(|(node, parent)| {
            parent.map(|p| LayoutEdge {
                key: node.key.clone(),
                source: nodes[p].position,
                target: node.position,
            })
        })
        .collect();

    Ok(TreeLayout { nodes, edges, size })
}

fn is_expanded(node: &TreeNode, path: &NodePath, collapsed: &HashSet<NodePath>) -> bool {
    !node.children().is_empty() && !collapsed.contains(path)
}

fn measure(
    node: &TreeNode,
    path: &NodePath,
    collapsed: &HashSet<NodePath>,
    metrics: &mut Metrics,
) -> Result<(), RenderError> {
    if node.name.trim().is_empty() {
        return Err(RenderError::MissingName {
            path: path.to_string(),
        });
    }

    metrics.max_depth = metrics.max_depth.max(path.depth());
    if is_expanded(node, path, collapsed) {
        for (i, child) in node.children().iter().enumerate() {
            measure(child, &path.child(i), collapsed, metrics)?;
        }
    } else {
        metrics.leaves += 1;
    }
    Ok(())
}

struct Placer<'a> {
    collapsed: &'a HashSet<NodePath>,
    slot: f32,
    column: f32,
    next_leaf: usize,
    nodes: Vec<LayoutNode>,
    /// Parent index per node, parallel to `nodes`
    parents: Vec<Option<usize>>,
}

impl Placer<'_> {
    /// Returns the node's y coordinate
    fn place(&mut self, node: &TreeNode, path: NodePath, key: NodeKey, parent: Option<usize>) -> f32 {
        let depth = path.depth();
        let expanded = is_expanded(node, &path, self.collapsed);
        let index = self.nodes.len();

        self.nodes.push(LayoutNode {
            key: key.clone(),
            path: path.clone(),
            kind: node.kind(),
            collapsed: !expanded && node.kind() == NodeKind::Branch,
            position: Pos2::ZERO,
        });
        self.parents.push(parent);

        let y = if expanded {
            let mut span: Option<(f32, f32)> = None;
            for (i, child) in node.children().iter().enumerate() {
                let child_key = key.child(child.name.clone());
                let child_y = self.place(child, path.child(i), child_key, Some(index));
                span = Some(span.map_or((child_y, child_y), |(first, _)| (first, child_y)));
            }
            span.map_or(0.0, |(first, last)| (first + last) / 2.0)
        } else {
            let y = (self.next_leaf as f32 + 0.5) * self.slot;
            self.next_leaf += 1;
            y
        };

        self.nodes[index].position = Pos2::new(depth as f32 * self.column, y);
        y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIZE: Vec2 = Vec2::new(900.0, 600.0);

    fn tree() -> TreeNode {
        TreeNode::root(
            "Root",
            vec![
                TreeNode::branch(
                    "A",
                    None,
                    vec![
                        TreeNode::leaf("a1", None, None),
                        TreeNode::leaf("a2", None, None),
                    ],
                ),
                TreeNode::branch("B", None, vec![TreeNode::leaf("b1", None, None)]),
            ],
        )
    }

    fn collapsed(paths: &[&[usize]]) -> HashSet<NodePath> {
        paths.iter().map(|p| NodePath(p.to_vec())).collect()
    }

    #[test]
    fn test_same_depth_shares_x() {
        let layout = compute_layout(&tree(), &HashSet::new(), SIZE).unwrap();
        for node in &layout.nodes {
            assert_eq!(node.position.x, node.key.depth as f32 * 450.0);
        }
    }

    #[test]
    fn test_siblings_keep_order_and_spacing() {
        let layout = compute_layout(&tree(), &HashSet::new(), SIZE).unwrap();
        let y = |path: &[usize]| layout.node(&NodePath(path.to_vec())).unwrap().position.y;

        assert_eq!(y(&[0, 0]), 100.0);
        assert_eq!(y(&[0, 1]), 300.0);
        assert_eq!(y(&[1, 0]), 500.0);
        // Branches centered over their children
        assert_eq!(y(&[0]), 200.0);
        assert_eq!(y(&[1]), 500.0);
        assert_eq!(y(&[]), 350.0);
    }

    #[test]
    fn test_collapsed_branch_is_a_visible_leaf() {
        let layout = compute_layout(&tree(), &collapsed(&[&[0]]), SIZE).unwrap();
        assert_eq!(layout.nodes.len(), 4);
        assert_eq!(layout.edges.len(), 3);

        let a = layout.node(&NodePath(vec![0])).unwrap();
        assert!(a.collapsed);
        assert_eq!(a.kind, NodeKind::Branch);
        assert_eq!(a.position.y, 150.0);
        assert!(layout.node(&NodePath(vec![0, 0])).is_none());
    }

    #[test]
    fn test_edges_connect_parent_to_child() {
        let layout = compute_layout(&tree(), &HashSet::new(), SIZE).unwrap();
        assert_eq!(layout.edges.len(), 5);
        for edge in &layout.edges {
            let child = layout.nodes.iter().find(|n| n.key == edge.key).unwrap();
            assert_eq!(edge.target, child.position);
            let parent_path = NodePath(child.path.0[..child.path.depth() - 1].to_vec());
            assert_eq!(edge.source, layout.node(&parent_path).unwrap().position);
        }
    }

    #[test]
    fn test_empty_root() {
        let layout = compute_layout(&TreeNode::empty("Nothing"), &HashSet::new(), SIZE).unwrap();
        assert_eq!(layout.nodes.len(), 1);
        assert!(layout.edges.is_empty());
        assert_eq!(layout.nodes[0].position, Pos2::new(0.0, 300.0));
    }

    #[test]
    fn test_degenerate_viewport() {
        let err = compute_layout(&tree(), &HashSet::new(), Vec2::new(0.0, 600.0)).unwrap_err();
        assert!(matches!(err, ViewError::Layout(_)));
    }

    #[test]
    fn test_missing_name() {
        let mut bad = tree();
        bad.children.as_mut().unwrap()[1].name = "  ".to_string();
        let err = compute_layout(&bad, &HashSet::new(), SIZE).unwrap_err();
        assert_eq!(
            err,
            ViewError::Render(RenderError::MissingName { path: "/1".into() })
        );
    }

    #[test]
    fn test_cousins_with_same_name_have_distinct_keys() {
        let tree = TreeNode::root(
            "Root",
            vec![
                TreeNode::branch("Part 1", None, vec![TreeNode::leaf("General", None, None)]),
                TreeNode::branch("Part 2", None, vec![TreeNode::leaf("General", None, None)]),
            ],
        );
        let layout = compute_layout(&tree, &HashSet::new(), SIZE).unwrap();
        let keys: HashSet<&NodeKey> = layout.nodes.iter().map(|n| &n.key).collect();
        assert_eq!(keys.len(), layout.nodes.len());

        let general = layout.node(&NodePath(vec![1, 0])).unwrap();
        assert_eq!(general.key.to_string(), "Root/Part 2/General@2");
    }

    #[test]
    fn test_bounds() {
        let layout = compute_layout(&tree(), &HashSet::new(), SIZE).unwrap();
        let bounds = layout.bounds();
        assert_eq!(bounds.min, Pos2::new(0.0, 100.0));
        assert_eq!(bounds.max, Pos2::new(900.0, 500.0));
    }
}
