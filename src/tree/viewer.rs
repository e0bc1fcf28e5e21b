//! Interactive Tree Viewer
//!
//! egui widget drawing a `TreeRenderer` frame:
//! - Scroll to zoom around the pointer, drag to pan
//! - Click a branch to collapse/expand, click a leaf for details
//! - Hover tooltip with name, description and requirements
//! - Error banner and empty-state hint

use eframe::egui::{self, epaint::CubicBezierShape, Align2, FontId, Pos2, Rect, Sense, Stroke, Vec2};
use super::renderer::TreeRenderer;
use super::style::{faded, TreeTheme};
use super::detail::NodeDetail;
use crate::model::{NodeKind, NodePath, TreeNode};

/// Horizontal gap between a circle and its label
const LABEL_GAP: f32 = 12.0;
const FONT_SIZE: f32 = 12.0;
/// Extra pick radius around circles (screen pixels)
const HIT_SLOP: f32 = 4.0;

/// Tree canvas widget
pub struct TreeViewer {
    pub theme: TreeTheme,

    /// Node under the pointer this frame
    hovered: Option<NodePath>,
}

impl Default for TreeViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeViewer {
    pub fn new() -> Self {
        Self {
            theme: TreeTheme::default(),
            hovered: None,
        }
    }

    /// Main UI function
    pub fn ui(&mut self, ui: &mut egui::Ui, renderer: &mut TreeRenderer) {
        renderer.resize(ui.available_width());
        renderer.tick(ui.input(|i| i.time));

        let size = renderer.canvas().min(ui.available_size()).max(Vec2::splat(1.0));
        let (response, painter) = ui.allocate_painter(size, Sense::click_and_drag());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, self.theme.canvas_bg);

        self.handle_input(ui, &response, renderer);
        self.draw_tree(&painter, rect, renderer);

        if renderer.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No rules to display",
                FontId::proportional(16.0),
                self.theme.hint,
            );
        }

        if let Some(error) = renderer.error() {
            self.draw_error(&painter, rect, error);
        }

        if let Some(path) = self.hovered.clone() {
            response.on_hover_ui_at_pointer(|ui| Self::tooltip(ui, renderer, &path));
        }

        if renderer.is_animating() {
            ui.ctx().request_repaint();
        }
    }

    /// Handle user input
    fn handle_input(&mut self, ui: &egui::Ui, response: &egui::Response, renderer: &mut TreeRenderer) {
        let origin = response.rect.min.to_vec2();
        let pick_radius = |renderer: &TreeRenderer| {
            renderer.config().node_radius * renderer.transform().scale + HIT_SLOP
        };

        // Zoom with scroll wheel around the pointer
        if response.hovered() {
            let scroll = ui.input(|i| i.smooth_scroll_delta.y);
            if scroll != 0.0 {
                if let Some(pointer) = response.hover_pos() {
                    renderer.zoom_at(pointer - origin, (scroll * 0.002).exp());
                }
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            renderer.pan_by(response.drag_delta());
        }

        self.hovered = response.hover_pos().and_then(|pos| {
            renderer
                .node_at(pos - origin, pick_radius(renderer))
                .cloned()
        });

        if response.clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                let hit = renderer.node_at(pos - origin, pick_radius(renderer)).cloned();
                if let Some(path) = hit {
                    renderer.toggle(&path);
                }
            }
        }
    }

    fn draw_tree(&self, painter: &egui::Painter, rect: Rect, renderer: &TreeRenderer) {
        let transform = renderer.transform();
        let origin = rect.min.to_vec2();
        let to_screen = |p: Pos2| transform.to_screen(p) + origin;
        let frame = renderer.frame();

        // Links first, behind nodes
        for edge in &frame.edges {
            let source = to_screen(edge.source);
            let target = to_screen(edge.target);
            let mid_x = (source.x + target.x) / 2.0;
            let curve = CubicBezierShape::from_points_stroke(
                [
                    source,
                    Pos2::new(mid_x, source.y),
                    Pos2::new(mid_x, target.y),
                    target,
                ],
                false,
                egui::Color32::TRANSPARENT,
                Stroke::new(1.5, faded(self.theme.link, edge.opacity)),
            );
            painter.add(curve);
        }

        let radius = renderer.config().node_radius * transform.scale;
        let font = FontId::proportional(FONT_SIZE * transform.scale);
        let selected = renderer.selected();

        for node in &frame.nodes {
            let center = to_screen(node.position);
            let stroke = self.theme.stroke_for(selected == Some(&node.path));
            painter.circle(
                center,
                radius,
                faded(self.theme.fill_for(node.kind, node.collapsed), node.opacity),
                Stroke::new(1.5, faded(stroke, node.opacity)),
            );

            // Expanded branches label to the left, everything else to the right
            let (anchor, offset) = if node.kind == NodeKind::Branch && !node.collapsed {
                (Align2::RIGHT_CENTER, -LABEL_GAP * transform.scale)
            } else {
                (Align2::LEFT_CENTER, LABEL_GAP * transform.scale)
            };
            painter.text(
                center + Vec2::new(offset, 0.0),
                anchor,
                wrap_label(&node.key.name).join("\n"),
                font.clone(),
                faded(self.theme.label, node.opacity),
            );
        }
    }

    fn tooltip(ui: &mut egui::Ui, renderer: &TreeRenderer, path: &NodePath) {
        let Some(detail) = hover_detail(renderer.tree(), path) else {
            return;
        };
        ui.strong(&detail.name);
        if let Some(description) = &detail.description {
            ui.label(description);
        }
        for requirement in detail.requirements.iter().flatten() {
            ui.label(format!("• {}", requirement));
        }
    }

    /// Draw error message
    fn draw_error(&self, painter: &egui::Painter, rect: Rect, error: &str) {
        let font = FontId::proportional(14.0);
        let galley = painter.layout(
            error.to_string(),
            font,
            self.theme.error_fg,
            (rect.width() - 40.0).max(100.0),
        );
        let banner = Rect::from_min_size(
            rect.min + Vec2::new(10.0, 10.0),
            Vec2::new(rect.width() - 20.0, galley.size().y + 20.0),
        );
        painter.rect_filled(banner, 4.0, self.theme.error_bg);
        painter.rect_stroke(banner, 4.0, Stroke::new(1.0, self.theme.error_fg));
        painter.galley(banner.min + Vec2::new(10.0, 10.0), galley, self.theme.error_fg);
    }
}

/// Tooltip content for a node; branches never show requirements
pub fn hover_detail(tree: &TreeNode, path: &NodePath) -> Option<NodeDetail> {
    tree.get(path).map(NodeDetail::from_node)
}

/// One word per line
pub fn wrap_label(name: &str) -> Vec<&str> {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() {
        vec![name]
    } else {
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hover_detail_hides_branch_requirements() {
        let mut branch = TreeNode::branch(
            "Section 1",
            Some("Partners".into()),
            vec![TreeNode::leaf("FM 1.1", None, Some(vec!["18+".into()]))],
        );
        branch.requirements = Some(vec!["hidden".into()]);
        let tree = TreeNode::root("Appendix", vec![branch]);

        let section = hover_detail(&tree, &NodePath(vec![0])).unwrap();
        assert_eq!(section.description.as_deref(), Some("Partners"));
        assert_eq!(section.requirements, None);

        let rule = hover_detail(&tree, &NodePath(vec![0, 0])).unwrap();
        assert_eq!(rule.requirements, Some(vec!["18+".to_string()]));

        assert!(hover_detail(&tree, &NodePath(vec![3])).is_none());
    }

    #[test]
    fn test_wrap_label_splits_words() {
        assert_eq!(wrap_label("FM 1.1  Age"), vec!["FM", "1.1", "Age"]);
        assert_eq!(wrap_label("Single"), vec!["Single"]);
        assert_eq!(wrap_label(""), vec![""]);
    }
}
