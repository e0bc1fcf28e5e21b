//! Interactive Tree Renderer
//!
//! Owns the `RenderState` for one canvas and keeps its visual projection in sync:
//! - `load` replaces everything and redraws from scratch
//! - `toggle` collapses/expands a branch (leaves are selected instead)
//! - `select` / `dismiss_detail` drive the detail panel
//! - `pan_zoom` / `zoom_at` / `reset_view` touch only the transform
//! - `resize` re-lays out for a new canvas
//!
//! Every structural change computes a fresh layout first and only commits it on
//! success, so errors never leave a half-updated frame behind.

use super::detail::{DetailEvent, NodeDetail};
use super::layout::{compute_layout, TreeLayout};
use super::state::{CollapseState, RenderState};
use super::transition::{Frame, Scene};
use super::viewport::{ViewTransform, Viewport};
use crate::config::LayoutConfig;
use crate::error::{RenderError, ViewError};
use crate::model::{NodePath, TreeNode};
use egui::{Pos2, Vec2};

/// Name used when a failed load has nothing better
const UNNAMED: &str = "Unnamed Appendix";

/// Identifies one load request; only the latest may commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(pub u64);

pub struct TreeRenderer {
    config: LayoutConfig,
    state: RenderState,
    layout: TreeLayout,
    scene: Scene,
    /// Canvas the current layout was computed for
    canvas: Vec2,
    /// Last canvas asked for by `resize`, even if it failed
    requested_canvas: Vec2,
    error: Option<String>,
    detail_events: Vec<DetailEvent>,
    requested: u64,
    committed: u64,
    now: f64,
}

impl TreeRenderer {
    pub fn new(config: LayoutConfig) -> Self {
        let config = config.validated();
        let (width, height) = config.canvas_size(config.canvas_width);
        let canvas = Vec2::new(width, height);
        let viewport = Self::viewport_for(&config);
        let mut renderer = Self {
            scene: Scene::new(config.transition_secs()),
            state: RenderState::new(TreeNode::empty(UNNAMED), viewport),
            layout: TreeLayout::default(),
            canvas,
            requested_canvas: canvas,
            error: None,
            detail_events: Vec::new(),
            requested: 0,
            committed: 0,
            now: 0.0,
            config,
        };
        renderer.reset_to_empty(UNNAMED);
        renderer
    }

    fn viewport_for(config: &LayoutConfig) -> Viewport {
        Viewport::new(
            ViewTransform::home(&config.margin),
            config.min_scale,
            config.max_scale,
        )
    }

    // =========================================================================
    // READ ACCESS
    // =========================================================================

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn tree(&self) -> &TreeNode {
        &self.state.root
    }

    /// Logical visible set (animation targets)
    pub fn layout(&self) -> &TreeLayout {
        &self.layout
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn canvas(&self) -> Vec2 {
        self.canvas
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn transform(&self) -> ViewTransform {
        self.state.viewport.transform()
    }

    /// Root without children: show the empty-state indication
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }

    pub fn collapse_state(&self, path: &NodePath) -> CollapseState {
        self.state.collapse_state(path)
    }

    pub fn selected(&self) -> Option<&NodePath> {
        self.state.selected.as_ref()
    }

    /// Animated snapshot for the current clock
    pub fn frame(&self) -> Frame {
        self.scene.frame(self.now)
    }

    pub fn is_animating(&self) -> bool {
        self.scene.is_animating(self.now) || self.state.viewport.is_animating()
    }

    /// Events for the detail panel since the last call
    pub fn drain_detail_events(&mut self) -> Vec<DetailEvent> {
        std::mem::take(&mut self.detail_events)
    }

    // =========================================================================
    // CLOCK
    // =========================================================================

    /// Advance animations to `now` (seconds)
    pub fn tick(&mut self, now: f64) {
        self.now = now;
        self.state.viewport.tick(now);
        self.scene.advance(now);
    }

    // =========================================================================
    // LOADING
    // =========================================================================

    /// Replace the whole render state with `tree`
    pub fn load(&mut self, tree: TreeNode) {
        let name = tree.name.clone();
        if let Err(e) = self.try_load(tree) {
            log::error!("Visualization error: {}", e);
            self.reset_to_empty(&name);
            self.error = Some(e.to_string());
        }
    }

    fn try_load(&mut self, tree: TreeNode) -> Result<(), ViewError> {
        validate(&tree, &NodePath::root())?;
        let state = RenderState::new(tree, Self::viewport_for(&self.config));
        let layout = compute_layout(&state.root, &state.collapsed, self.layout_area())?;

        log::debug!(
            "Loaded tree '{}' with {} nodes ({} visible)",
            state.root.name,
            state.root.node_count(),
            layout.nodes.len()
        );
        self.install(state, layout);
        self.error = None;
        Ok(())
    }

    /// Explicit empty tree; used for failed loads
    fn reset_to_empty(&mut self, name: &str) {
        let name = if name.trim().is_empty() { UNNAMED } else { name };
        let state = RenderState::new(TreeNode::empty(name), Self::viewport_for(&self.config));
        let layout = compute_layout(&state.root, &state.collapsed, self.layout_area())
            .unwrap_or_default();
        self.install(state, layout);
    }

    fn install(&mut self, state: RenderState, layout: TreeLayout) {
        self.state = state;
        self.state.viewport.tick(self.now);
        self.scene.clear();
        self.scene.apply(&TreeLayout::default(), &layout, self.now);
        self.layout = layout;
        self.detail_events.push(DetailEvent::Cleared);
    }

    /// Start a new load; any older generation becomes stale
    pub fn begin_load(&mut self) -> Generation {
        self.requested += 1;
        Generation(self.requested)
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.requested
    }

    /// A load is requested but not committed yet
    pub fn is_loading(&self) -> bool {
        self.committed < self.requested
    }

    /// Commit a finished load if it is still the latest; returns whether it was used
    pub fn commit_tree(&mut self, generation: Generation, tree: TreeNode) -> bool {
        if !self.is_current(generation) {
            log::debug!(
                "Discarding stale load result (generation {}, latest {})",
                generation.0,
                self.requested
            );
            return false;
        }
        self.committed = generation.0;
        self.load(tree);
        true
    }

    /// Commit a failed load: message plus explicit empty tree
    pub fn commit_failure(&mut self, generation: Generation, name: &str, message: String) -> bool {
        if !self.is_current(generation) {
            log::debug!("Discarding stale load failure (generation {})", generation.0);
            return false;
        }
        self.committed = generation.0;
        self.reset_to_empty(name);
        self.error = Some(message);
        true
    }

    /// Show an error without touching the tree
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    // =========================================================================
    // STRUCTURE
    // =========================================================================

    /// Collapse or expand a branch; leaves are selected instead
    pub fn toggle(&mut self, path: &NodePath) {
        if let Err(e) = self.try_toggle(path) {
            log::error!("Toggle failed at {}: {}", path, e);
            self.error = Some(e.to_string());
        }
    }

    fn try_toggle(&mut self, path: &NodePath) -> Result<(), ViewError> {
        let node = self.node(path)?;
        if node.is_leaf() {
            return self.try_select(path);
        }

        let next = self.state.flip(path);
        match compute_layout(&self.state.root, &self.state.collapsed, self.layout_area()) {
            Ok(layout) => {
                log::debug!("{} is now {:?}", path, next);
                self.relayout(layout);
                Ok(())
            }
            Err(e) => {
                self.state.flip(path);
                Err(e)
            }
        }
    }

    /// New canvas width available; re-lays out when the canvas size changes
    pub fn resize(&mut self, available_width: f32) {
        let (width, height) = self.config.canvas_size(available_width);
        let canvas = Vec2::new(width, height);
        if canvas == self.requested_canvas {
            return;
        }
        self.requested_canvas = canvas;

        let area = self.area_for(canvas);
        match compute_layout(&self.state.root, &self.state.collapsed, area) {
            Ok(layout) => {
                self.canvas = canvas;
                self.relayout(layout);
            }
            Err(e) => {
                log::warn!("Keeping previous layout: {}", e);
                self.error = Some(e.to_string());
            }
        }
    }

    fn relayout(&mut self, layout: TreeLayout) {
        self.scene.apply(&self.layout, &layout, self.now);
        self.layout = layout;
    }

    fn area_for(&self, canvas: Vec2) -> Vec2 {
        let m = &self.config.margin;
        Vec2::new(canvas.x - m.left - m.right, canvas.y - m.top - m.bottom)
    }

    fn layout_area(&self) -> Vec2 {
        self.area_for(self.canvas)
    }

    fn node(&self, path: &NodePath) -> Result<&TreeNode, RenderError> {
        self.state.root.get(path).ok_or_else(|| RenderError::UnknownNode {
            path: path.to_string(),
        })
    }

    // =========================================================================
    // SELECTION
    // =========================================================================

    /// Select a leaf and show its details
    pub fn select(&mut self, path: &NodePath) {
        if let Err(e) = self.try_select(path) {
            log::error!("Select failed at {}: {}", path, e);
            self.error = Some(e.to_string());
        }
    }

    fn try_select(&mut self, path: &NodePath) -> Result<(), ViewError> {
        let node = self.node(path)?;
        if !node.is_leaf() {
            log::debug!("Ignoring select on branch {}", path);
            return Ok(());
        }
        let detail = NodeDetail::from_node(node);
        self.state.selected = Some(path.clone());
        self.detail_events.push(DetailEvent::Show(detail));
        Ok(())
    }

    /// Close the detail panel
    pub fn dismiss_detail(&mut self) {
        self.state.selected = None;
        self.detail_events.push(DetailEvent::Cleared);
    }

    // =========================================================================
    // VIEWPORT
    // =========================================================================

    pub fn pan_zoom(&mut self, transform: ViewTransform) {
        self.state.viewport.pan_zoom(transform);
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.state.viewport.pan_by(delta);
    }

    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        self.state.viewport.zoom_at(anchor, factor);
    }

    pub fn reset_view(&mut self, immediate: bool) {
        self.state.viewport.reset(immediate, self.config.reset_secs());
    }

    /// Visible node under a canvas-relative screen position
    pub fn node_at(&self, screen: Pos2, radius: f32) -> Option<&NodePath> {
        let transform = self.transform();
        self.layout
            .nodes
            .iter()
            .find(|n| (transform.to_screen(n.position) - screen).length() <= radius)
            .map(|n| &n.path)
    }
}

/// Every node needs a name
fn validate(node: &TreeNode, path: &NodePath) -> Result<(), RenderError> {
    if node.name.trim().is_empty() {
        return Err(RenderError::MissingName {
            path: path.to_string(),
        });
    }
    node.children()
        .iter()
        .enumerate()
        .try_for_each(|(i, child)| validate(child, &path.child(i)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::layout::NodeKey;
    use std::collections::HashSet;

    fn tree() -> TreeNode {
        TreeNode::root(
            "Appendix FM",
            vec![
                TreeNode::branch(
                    "Section 1",
                    Some("Partners".into()),
                    vec![
                        TreeNode::leaf(
                            "FM 1.1",
                            Some("Age".into()),
                            Some(vec!["18+".into(), "Both".into()]),
                        ),
                        TreeNode::leaf("FM 1.2", None, None),
                    ],
                ),
                TreeNode::branch(
                    "Section 2",
                    None,
                    vec![TreeNode::leaf("FM 2.1", None, None)],
                ),
            ],
        )
    }

    fn renderer() -> TreeRenderer {
        let mut renderer = TreeRenderer::new(LayoutConfig::default());
        renderer.load(tree());
        renderer.drain_detail_events();
        renderer
    }

    fn visible_keys(renderer: &TreeRenderer) -> HashSet<NodeKey> {
        renderer.layout().nodes.iter().map(|n| n.key.clone()).collect()
    }

    #[test]
    fn test_load_resets_state() {
        let mut renderer = renderer();
        renderer.toggle(&NodePath(vec![0]));
        renderer.select(&NodePath(vec![1, 0]));
        renderer.zoom_at(Pos2::new(100.0, 100.0), 3.0);

        renderer.load(tree());
        assert!(renderer.state().collapsed.is_empty());
        assert!(renderer.selected().is_none());
        assert_eq!(renderer.transform(), ViewTransform::new(120.0, 20.0, 1.0));
        assert_eq!(renderer.layout().nodes.len(), 6);
        assert_eq!(renderer.drain_detail_events().last(), Some(&DetailEvent::Cleared));
    }

    #[test]
    fn test_empty_tree_is_valid() {
        let mut renderer = renderer();
        renderer.load(TreeNode::empty("Nothing here"));
        assert!(renderer.is_empty());
        assert!(renderer.error().is_none());
        assert_eq!(renderer.layout().nodes.len(), 1);
    }

    #[test]
    fn test_toggle_is_involutive() {
        let mut renderer = renderer();
        let before = renderer.layout().clone();

        renderer.toggle(&NodePath(vec![0]));
        assert_eq!(renderer.collapse_state(&NodePath(vec![0])), CollapseState::Collapsed);
        assert_eq!(renderer.layout().nodes.len(), 4);
        let hidden = NodeKey::root("Appendix FM").child("Section 1").child("FM 1.1");
        assert!(!visible_keys(&renderer).contains(&hidden));

        renderer.toggle(&NodePath(vec![0]));
        assert_eq!(renderer.collapse_state(&NodePath(vec![0])), CollapseState::Expanded);
        assert_eq!(renderer.layout(), &before);
    }

    #[test]
    fn test_toggle_leaf_selects() {
        let mut renderer = renderer();
        let before = renderer.layout().clone();

        renderer.toggle(&NodePath(vec![0, 0]));
        assert_eq!(renderer.selected(), Some(&NodePath(vec![0, 0])));
        assert_eq!(renderer.layout(), &before);

        let events = renderer.drain_detail_events();
        assert_eq!(
            events,
            vec![DetailEvent::Show(NodeDetail {
                name: "FM 1.1".into(),
                description: Some("Age".into()),
                requirements: Some(vec!["18+".into(), "Both".into()]),
            })]
        );

        renderer.dismiss_detail();
        assert!(renderer.selected().is_none());
        assert_eq!(renderer.drain_detail_events(), vec![DetailEvent::Cleared]);
    }

    #[test]
    fn test_select_branch_is_ignored() {
        let mut renderer = renderer();
        renderer.select(&NodePath(vec![1]));
        assert!(renderer.selected().is_none());
        assert!(renderer.drain_detail_events().is_empty());
    }

    #[test]
    fn test_unknown_path_preserves_frame() {
        let mut renderer = renderer();
        let before = renderer.layout().clone();
        renderer.toggle(&NodePath(vec![9, 9]));
        assert!(renderer.error().unwrap().contains("/9/9"));
        assert_eq!(renderer.layout(), &before);
    }

    #[test]
    fn test_malformed_tree_falls_back_to_empty() {
        let mut renderer = renderer();
        let mut bad = tree();
        bad.children.as_mut().unwrap()[0].children.as_mut().unwrap()[1].name = String::new();

        renderer.load(bad);
        assert!(renderer.error().unwrap().contains("/0/1"));
        assert!(renderer.is_empty());
        assert_eq!(renderer.tree().name, "Appendix FM");
    }

    #[test]
    fn test_zoom_does_not_relayout() {
        let mut renderer = renderer();
        let before = renderer.layout().clone();
        renderer.pan_zoom(ViewTransform::new(10.0, 10.0, 99.0));
        assert_eq!(renderer.transform().scale, 5.0);
        renderer.zoom_at(Pos2::new(0.0, 0.0), 0.0001);
        assert_eq!(renderer.transform().scale, 0.5);
        assert_eq!(renderer.layout(), &before);
    }

    #[test]
    fn test_inverted_zoom_bounds_do_not_panic() {
        let config = LayoutConfig {
            min_scale: 6.0,
            ..LayoutConfig::default()
        };
        let mut renderer = TreeRenderer::new(config);
        renderer.load(tree());
        renderer.zoom_at(Pos2::new(10.0, 10.0), 100.0);
        assert_eq!(renderer.transform().scale, 5.0);
    }

    #[test]
    fn test_resize_relayouts_and_degenerate_keeps_frame() {
        let mut renderer = renderer();
        let wide = renderer.layout().clone();

        renderer.resize(700.0);
        assert_eq!(renderer.canvas(), Vec2::new(700.0, 600.0));
        assert_ne!(renderer.layout(), &wide);

        let narrow = renderer.layout().clone();
        renderer.resize(100.0);
        assert!(renderer.error().is_some());
        assert_eq!(renderer.layout(), &narrow);
        assert_eq!(renderer.canvas(), Vec2::new(700.0, 600.0));
    }

    #[test]
    fn test_generations_discard_stale_results() {
        let mut renderer = TreeRenderer::new(LayoutConfig::default());
        let first = renderer.begin_load();
        let second = renderer.begin_load();
        assert!(renderer.is_loading());

        assert!(renderer.commit_tree(second, tree()));
        assert!(!renderer.is_loading());
        assert!(!renderer.commit_tree(first, TreeNode::empty("stale")));
        assert!(!renderer.commit_failure(first, "stale", "boom".into()));
        assert_eq!(renderer.tree().name, "Appendix FM");
        assert!(renderer.error().is_none());
    }

    #[test]
    fn test_commit_failure_shows_empty_tree() {
        let mut renderer = renderer();
        let generation = renderer.begin_load();
        assert!(renderer.commit_failure(generation, "Student", "Failed to load".into()));
        assert_eq!(renderer.error(), Some("Failed to load"));
        assert!(renderer.is_empty());
        assert_eq!(renderer.tree().name, "Student");
        assert!(renderer.selected().is_none());
    }

    #[test]
    fn test_node_at_uses_view_transform() {
        let renderer = renderer();
        let root = renderer.layout().node(&NodePath::root()).unwrap().position;
        let screen = renderer.transform().to_screen(root);
        assert_eq!(renderer.node_at(screen, 8.0), Some(&NodePath::root()));
        assert_eq!(renderer.node_at(Pos2::new(-500.0, -500.0), 8.0), None);
    }

    #[test]
    fn test_cousins_with_same_name_are_all_drawn() {
        let mut renderer = TreeRenderer::new(LayoutConfig::default());
        renderer.load(TreeNode::root(
            "Appendix",
            vec![
                TreeNode::branch("Part 1", None, vec![TreeNode::leaf("General", None, None)]),
                TreeNode::branch("Part 2", None, vec![TreeNode::leaf("General", None, None)]),
            ],
        ));
        renderer.tick(10.0);

        let frame = renderer.frame();
        assert_eq!(frame.nodes.len(), renderer.layout().nodes.len());
        assert_eq!(frame.edges.len(), renderer.layout().edges.len());
        assert_eq!(frame.nodes.len(), 5);
        assert_eq!(frame.edges.len(), 4);

        // Collapsing one part only hides its own child
        renderer.toggle(&NodePath(vec![0]));
        renderer.tick(20.0);
        let frame = renderer.frame();
        assert_eq!(frame.nodes.len(), 4);
        assert!(frame.nodes.iter().any(|n| n.path == NodePath(vec![1, 0])));
    }

    #[test]
    fn test_click_branch_twice_restores_visible_set() {
        let mut renderer = renderer();
        renderer.tick(1.0);
        let initial = visible_keys(&renderer);

        renderer.toggle(&NodePath(vec![1]));
        renderer.tick(1.1);
        renderer.toggle(&NodePath(vec![1]));
        renderer.tick(5.0);

        assert_eq!(visible_keys(&renderer), initial);
        let frame = renderer.frame();
        assert_eq!(frame.nodes.len(), 6);
        assert!(frame.nodes.iter().all(|n| n.opacity == 1.0));
    }
}
