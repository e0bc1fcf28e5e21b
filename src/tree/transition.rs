//! Animated transitions for reconciled layouts
//!
//! Presentation layer on top of `reconcile`:
//! - Updated nodes/edges tween from their current to their new position
//! - Inserted ones fade in at their new position
//! - Removed ones fade out where they are, then drop
//!
//! Values are sampled each frame with `frame(now)`; no callbacks. Applying a new
//! reconciliation mid-transition restarts the affected tweens from their current
//! interpolated values.

use super::layout::{LayoutEdge, LayoutNode, NodeKey, TreeLayout};
use super::reconcile::reconcile;
use crate::model::{NodeKind, NodePath};
use egui::Pos2;
use std::collections::HashMap;

/// Values that can be interpolated
pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        if t >= 1.0 {
            to
        } else {
            self + (to - self) * t
        }
    }
}

impl Lerp for Pos2 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Pos2::new(self.x.lerp(to.x, t), self.y.lerp(to.y, t))
    }
}

/// Cubic in-out easing
pub fn ease_cubic_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        let f = -2.0 * t + 2.0;
        1.0 - f * f * f / 2.0
    }
}

/// Time-based interpolation between two values
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    start: f64,
    duration: f32,
}

impl<T: Lerp> Tween<T> {
    /// Already at rest on `value`
    pub fn fixed(value: T) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration: 0.0,
        }
    }

    pub fn new(from: T, to: T, start: f64, duration: f32) -> Self {
        Self {
            from,
            to,
            start,
            duration,
        }
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Progress in `[0, 1]`
    pub fn progress(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (((now - self.start) as f32) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, now: f64) -> T {
        self.from.lerp(self.to, ease_cubic_in_out(self.progress(now)))
    }

    pub fn is_finished(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Restart toward a new target from wherever the tween is now
    pub fn retarget(&mut self, to: T, now: f64, duration: f32) {
        self.from = self.value_at(now);
        self.to = to;
        self.start = now;
        self.duration = duration;
    }
}

/// Animated node
#[derive(Debug, Clone)]
pub struct NodeSprite {
    pub key: NodeKey,
    pub path: NodePath,
    pub kind: NodeKind,
    pub collapsed: bool,
    pub position: Tween<Pos2>,
    pub opacity: Tween<f32>,
    pub exiting: bool,
}

/// Animated edge, keyed by its target node
#[derive(Debug, Clone)]
pub struct EdgeSprite {
    pub key: NodeKey,
    pub source: Tween<Pos2>,
    pub target: Tween<Pos2>,
    pub opacity: Tween<f32>,
    pub exiting: bool,
}

/// Node sampled for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct DrawNode {
    pub key: NodeKey,
    pub path: NodePath,
    pub kind: NodeKind,
    pub collapsed: bool,
    pub position: Pos2,
    pub opacity: f32,
}

/// Edge sampled for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct DrawEdge {
    pub key: NodeKey,
    pub source: Pos2,
    pub target: Pos2,
    pub opacity: f32,
}

/// Everything to paint for one frame, in world coordinates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub nodes: Vec<DrawNode>,
    pub edges: Vec<DrawEdge>,
}

/// Live sprites for the current and recently removed layout
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<NodeSprite>,
    edges: Vec<EdgeSprite>,
    duration: f32,
}

impl Scene {
    pub fn new(duration: f32) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            duration,
        }
    }

    /// Drop all sprites (full redraw)
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Reconcile `old` against `new` and start the resulting transitions
    pub fn apply(&mut self, old: &TreeLayout, new: &TreeLayout, now: f64) {
        self.apply_nodes(&old.nodes, &new.nodes, now);
        self.apply_edges(&old.edges, &new.edges, now);
    }

    fn apply_nodes(&mut self, old: &[LayoutNode], new: &[LayoutNode], now: f64) {
        let diff = reconcile(old, new);
        let duration = self.duration;
        let mut index: HashMap<NodeKey, usize> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, s)| (s.key.clone(), i))
            .collect();

        for node in diff.removed {
            if let Some(&i) = index.get(&node.key) {
                let sprite = &mut self.nodes[i];
                let here = sprite.position.value_at(now);
                sprite.position = Tween::fixed(here);
                sprite.opacity.retarget(0.0, now, duration);
                sprite.exiting = true;
            }
        }

        let updated = diff.updated.into_iter().map(|(_, new)| new);
        for node in updated.chain(diff.inserted) {
            match index.get(&node.key) {
                Some(&i) => {
                    // Moving, or re-entering while still fading out
                    let sprite = &mut self.nodes[i];
                    sprite.path = node.path.clone();
                    sprite.kind = node.kind;
                    sprite.collapsed = node.collapsed;
                    sprite.position.retarget(node.position, now, duration);
                    sprite.opacity.retarget(1.0, now, duration);
                    sprite.exiting = false;
                }
                None => {
                    index.insert(node.key.clone(), self.nodes.len());
                    self.nodes.push(NodeSprite {
                        key: node.key.clone(),
                        path: node.path.clone(),
                        kind: node.kind,
                        collapsed: node.collapsed,
                        position: Tween::fixed(node.position),
                        opacity: Tween::new(0.0, 1.0, now, duration),
                        exiting: false,
                    });
                }
            }
        }
    }

    fn apply_edges(&mut self, old: &[LayoutEdge], new: &[LayoutEdge], now: f64) {
        let diff = reconcile(old, new);
        let duration = self.duration;
        let mut index: HashMap<NodeKey, usize> = self
            .edges
            .iter()
            .enumerate()
            .map(|(i, s)| (s.key.clone(), i))
            .collect();

        for edge in diff.removed {
            if let Some(&i) = index.get(&edge.key) {
                let sprite = &mut self.edges[i];
                sprite.source = Tween::fixed(sprite.source.value_at(now));
                sprite.target = Tween::fixed(sprite.target.value_at(now));
                sprite.opacity.retarget(0.0, now, duration);
                sprite.exiting = true;
            }
        }

        let updated = diff.updated.into_iter().map(|(_, new)| new);
        for edge in updated.chain(diff.inserted) {
            match index.get(&edge.key) {
                Some(&i) => {
                    let sprite = &mut self.edges[i];
                    sprite.source.retarget(edge.source, now, duration);
                    sprite.target.retarget(edge.target, now, duration);
                    sprite.opacity.retarget(1.0, now, duration);
                    sprite.exiting = false;
                }
                None => {
                    index.insert(edge.key.clone(), self.edges.len());
                    self.edges.push(EdgeSprite {
                        key: edge.key.clone(),
                        source: Tween::fixed(edge.source),
                        target: Tween::fixed(edge.target),
                        opacity: Tween::new(0.0, 1.0, now, duration),
                        exiting: false,
                    });
                }
            }
        }
    }

    /// Drop sprites that finished fading out
    pub fn advance(&mut self, now: f64) {
        self.nodes
            .retain(|s| !(s.exiting && s.opacity.is_finished(now)));
        self.edges
            .retain(|s| !(s.exiting && s.opacity.is_finished(now)));
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.nodes
            .iter()
            .any(|s| !s.position.is_finished(now) || !s.opacity.is_finished(now))
            || self.edges.iter().any(|s| {
                !s.source.is_finished(now)
                    || !s.target.is_finished(now)
                    || !s.opacity.is_finished(now)
            })
    }

    /// Sample every sprite
    pub fn frame(&self, now: f64) -> Frame {
        Frame {
            nodes: self
                .nodes
                .iter()
                .map(|s| DrawNode {
                    key: s.key.clone(),
                    path: s.path.clone(),
                    kind: s.kind,
                    collapsed: s.collapsed,
                    position: s.position.value_at(now),
                    opacity: s.opacity.value_at(now),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .map(|s| DrawEdge {
                    key: s.key.clone(),
                    source: s.source.value_at(now),
                    target: s.target.value_at(now),
                    opacity: s.opacity.value_at(now),
                })
                .collect(),
        }
    }
}
