//! Tree Colors
//!
//! Fixed palette for nodes, links and the error banner, plus helpers for
//! fading colors with transition opacity.

use eframe::egui::Color32;
use crate::model::NodeKind;

/// Colors used by the tree viewer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeTheme {
    /// Canvas background
    pub canvas_bg: Color32,

    /// Fill for expanded branches
    pub branch_fill: Color32,

    /// Fill for collapsed branches (children hidden)
    pub collapsed_fill: Color32,

    /// Fill for leaves
    pub leaf_fill: Color32,

    /// Circle outline
    pub node_stroke: Color32,

    /// Outline of the selected leaf
    pub node_selected: Color32,

    /// Label text
    pub label: Color32,

    /// Parent -> child links
    pub link: Color32,

    /// Empty-state hint
    pub hint: Color32,

    pub error_bg: Color32,
    pub error_fg: Color32,
}

impl Default for TreeTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl TreeTheme {
    pub fn light() -> Self {
        Self {
            canvas_bg: Color32::WHITE,
            branch_fill: parse_hex_color("#3182bd").unwrap_or(Color32::BLUE),
            collapsed_fill: parse_hex_color("#c6dbef").unwrap_or(Color32::LIGHT_BLUE),
            leaf_fill: parse_hex_color("#c6dbef").unwrap_or(Color32::LIGHT_BLUE),
            node_stroke: parse_hex_color("#1d4e89").unwrap_or(Color32::DARK_BLUE),
            node_selected: parse_hex_color("#e6550d").unwrap_or(Color32::RED),
            label: parse_hex_color("#333333").unwrap_or(Color32::DARK_GRAY),
            link: parse_hex_color("#95a5a6").unwrap_or(Color32::GRAY),
            hint: parse_hex_color("#7f8c8d").unwrap_or(Color32::GRAY),
            error_bg: parse_hex_color("#f8d7da").unwrap_or(Color32::LIGHT_RED),
            error_fg: parse_hex_color("#721c24").unwrap_or(Color32::DARK_RED),
        }
    }

    /// Fill for a node
    pub fn fill_for(&self, kind: NodeKind, collapsed: bool) -> Color32 {
        match kind {
            NodeKind::Branch if collapsed => self.collapsed_fill,
            NodeKind::Branch => self.branch_fill,
            NodeKind::Leaf => self.leaf_fill,
        }
    }

    /// Outline for a node
    pub fn stroke_for(&self, selected: bool) -> Color32 {
        if selected {
            self.node_selected
        } else {
            self.node_stroke
        }
    }
}

/// Parse a `#rrggbb` or `#rrggbbaa` color
pub fn parse_hex_color(color_str: &str) -> Option<Color32> {
    let hex = color_str.trim_start_matches('#');
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();

    match hex.len() {
        6 => Some(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?)),
        8 => Some(Color32::from_rgba_unmultiplied(
            channel(0)?,
            channel(2)?,
            channel(4)?,
            channel(6)?,
        )),
        _ => None,
    }
}

/// Scale a color's alpha by a transition opacity
pub fn faded(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}
