//! Immediate-mode 2D drawing surface used by every renderer.
//!
//! Renderers only talk to the [`Canvas`] trait. [`Raster`] rasterizes into an
//! RGBA image for the window and for snapshots; [`CommandRecorder`] keeps the
//! resolved draw calls so tests can inspect what a frame would contain.

mod font;
mod raster;
mod record;

pub use raster::Raster;
pub use record::{CommandRecorder, DrawCommand};

use glam::Vec2;

/// 8-bit straight-alpha color
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Opaque gray level
    pub const fn gray(level: u8) -> Self {
        Self::rgb(level, level, level)
    }

    /// Same color with a different alpha (clamped to 0..=255)
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.round().clamp(0.0, 255.0) as u8,
            ..self
        }
    }

    /// Per-channel interpolation, `t` clamped to [0, 1]
    pub fn lerp(self, other: Rgba, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| crate::math::lerp(a as f32, b as f32, t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Paint state applied to subsequent shapes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Style {
    pub fill: Option<Rgba>,
    pub stroke: Option<Rgba>,
    pub stroke_weight: f32,
    /// Soft halo behind shapes: (blur radius in pixels, color)
    pub glow: Option<(f32, Rgba)>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Some(Rgba::gray(255)),
            stroke: Some(Rgba::gray(0)),
            stroke_weight: 1.0,
            glow: None,
        }
    }
}

/// Rigid transform (rotation then translation) from local to canvas space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub offset: Vec2,
    pub angle: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            angle: 0.0,
        }
    }
}

impl Transform {
    /// Map a local point into canvas space
    pub fn apply(&self, p: Vec2) -> Vec2 {
        self.offset + Vec2::from_angle(self.angle).rotate(p)
    }

    fn translate(&mut self, d: Vec2) {
        self.offset += Vec2::from_angle(self.angle).rotate(d);
    }
}

/// Transform and style stack shared by canvas implementations
#[derive(Clone, Debug, Default)]
pub struct DrawState {
    pub transform: Transform,
    pub style: Style,
    saved: Vec<(Transform, Style)>,
}

impl DrawState {
    pub fn push(&mut self) {
        self.saved.push((self.transform, self.style));
    }

    /// Restore the last pushed state; unmatched pops are ignored
    pub fn pop(&mut self) {
        if let Some((transform, style)) = self.saved.pop() {
            self.transform = transform;
            self.style = style;
        }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.transform.translate(Vec2::new(dx, dy));
    }

    pub fn rotate(&mut self, radians: f32) {
        self.transform.angle += radians;
    }

    /// Drop all saved states and reset to defaults (start of a frame)
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Drawing surface consumed by the renderers
///
/// Mirrors a classic immediate-mode sketch API: style and transform are
/// sticky until changed or restored by `pop`.
pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Access to the transform/style stack
    fn state(&mut self) -> &mut DrawState;

    /// Clear the whole surface and reset transform and style
    fn background(&mut self, color: Rgba);

    /// Filled and/or stroked circle
    fn ellipse(&mut self, x: f32, y: f32, diameter: f32);

    /// Closed polygon in local coordinates
    fn polygon(&mut self, points: &[Vec2]);

    /// Stroked circular arc from `start` to `stop` radians (clockwise on screen)
    fn arc(&mut self, x: f32, y: f32, radius: f32, start: f32, stop: f32);

    /// Text label in the current fill color; `(x, y)` is its bottom-right corner
    fn text(&mut self, x: f32, y: f32, text: &str, size: f32);

    fn push(&mut self) {
        self.state().push();
    }

    fn pop(&mut self) {
        self.state().pop();
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state().translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.state().rotate(radians);
    }

    fn fill(&mut self, color: Rgba) {
        self.state().style.fill = Some(color);
    }

    fn no_fill(&mut self) {
        self.state().style.fill = None;
    }

    fn stroke(&mut self, color: Rgba, weight: f32) {
        let style = &mut self.state().style;
        style.stroke = Some(color);
        style.stroke_weight = weight;
    }

    fn no_stroke(&mut self) {
        self.state().style.stroke = None;
    }

    fn glow(&mut self, blur: f32, color: Rgba) {
        self.state().style.glow = Some((blur, color));
    }

    fn no_glow(&mut self) {
        self.state().style.glow = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_translate_after_rotate() {
        let mut state = DrawState::default();
        state.translate(10.0, 0.0);
        state.rotate(FRAC_PI_2);
        state.translate(5.0, 0.0);

        // Second translation follows the rotated x axis (screen down)
        let p = state.transform.apply(Vec2::ZERO);
        assert!((p.x - 10.0).abs() < 1e-4);
        assert!((p.y - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_push_pop_restores_style_and_transform() {
        let mut state = DrawState::default();
        state.push();
        state.translate(3.0, 4.0);
        state.style.fill = None;
        state.pop();

        assert_eq!(state.transform, Transform::default());
        assert!(state.style.fill.is_some());

        // Unbalanced pop is a no-op
        state.pop();
        assert_eq!(state.transform, Transform::default());
    }

    #[test]
    fn test_color_lerp_clamps() {
        let quiet = Rgba::rgb(0, 180, 255);
        let loud = Rgba::rgb(255, 50, 100);
        assert_eq!(quiet.lerp(loud, 0.0), quiet);
        assert_eq!(quiet.lerp(loud, 1.0), loud);
        assert_eq!(quiet.lerp(loud, 3.0), loud);
    }
}
