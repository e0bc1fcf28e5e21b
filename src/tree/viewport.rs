//! Pan/zoom transform
//!
//! World coordinates are layout coordinates; screen coordinates are relative to
//! the top-left of the canvas. Scale is always kept inside the configured bounds.

use super::transition::{Lerp, Tween};
use crate::config::Margin;
use egui::{Pos2, Vec2};

/// `screen = world * scale + translate`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        translate: Vec2::ZERO,
        scale: 1.0,
    };

    pub fn new(translate_x: f32, translate_y: f32, scale: f32) -> Self {
        Self {
            translate: Vec2::new(translate_x, translate_y),
            scale,
        }
    }

    /// Origin translated by the margin, scale 1
    pub fn home(margin: &Margin) -> Self {
        Self::new(margin.left, margin.top, 1.0)
    }

    pub fn to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            world.x * self.scale + self.translate.x,
            world.y * self.scale + self.translate.y,
        )
    }

    pub fn to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            (screen.x - self.translate.x) / self.scale,
            (screen.y - self.translate.y) / self.scale,
        )
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Lerp for ViewTransform {
    fn lerp(self, to: Self, t: f32) -> Self {
        Self {
            translate: Vec2::new(
                self.translate.x.lerp(to.translate.x, t),
                self.translate.y.lerp(to.translate.y, t),
            ),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

/// Current transform plus an optional animated reset
#[derive(Debug, Clone)]
pub struct Viewport {
    transform: Tween<ViewTransform>,
    home: ViewTransform,
    min_scale: f32,
    max_scale: f32,
    now: f64,
}

impl Viewport {
    pub fn new(home: ViewTransform, min_scale: f32, max_scale: f32) -> Self {
        let home = ViewTransform {
            scale: home.scale.clamp(min_scale, max_scale),
            ..home
        };
        Self {
            transform: Tween::fixed(home),
            home,
            min_scale,
            max_scale,
            now: 0.0,
        }
    }

    pub fn scale_bounds(&self) -> (f32, f32) {
        (self.min_scale, self.max_scale)
    }

    /// Advance the clock used by the reset animation
    pub fn tick(&mut self, now: f64) {
        self.now = now;
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform.value_at(self.now)
    }

    pub fn is_animating(&self) -> bool {
        !self.transform.is_finished(self.now)
    }

    /// Set the transform directly, clamping scale. Interrupts a running reset.
    pub fn pan_zoom(&mut self, transform: ViewTransform) {
        let scale = if transform.scale.is_finite() {
            transform.scale.clamp(self.min_scale, self.max_scale)
        } else {
            self.transform().scale
        };
        self.transform = Tween::fixed(ViewTransform { scale, ..transform });
    }

    /// Move by a screen-space delta
    pub fn pan_by(&mut self, delta: Vec2) {
        let mut t = self.transform();
        t.translate += delta;
        self.pan_zoom(t);
    }

    /// Zoom by `factor` keeping the world point under `anchor` (screen) fixed
    pub fn zoom_at(&mut self, anchor: Pos2, factor: f32) {
        let current = self.transform();
        let world = current.to_world(anchor);
        let scale = (current.scale * factor).clamp(self.min_scale, self.max_scale);
        let translate = Vec2::new(anchor.x - world.x * scale, anchor.y - world.y * scale);
        self.pan_zoom(ViewTransform { translate, scale });
    }

    /// Back to the home placement, animated over `duration` seconds unless immediate
    pub fn reset(&mut self, immediate: bool, duration: f32) {
        if immediate || duration <= 0.0 {
            self.transform = Tween::fixed(self.home);
        } else {
            self.transform.retarget(self.home, self.now, duration);
        }
    }
}
