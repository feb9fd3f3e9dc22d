//! The entropy core: a noise-distorted closed curve breathing with the
//! instantaneous volume.
//!
//! Every size parameter is an unclamped linear function of the amplified
//! volume, so there is no ceiling on how violently the core reacts.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::canvas::{Canvas, Rgba};
use crate::math::map_range;
use crate::noise::CoherentNoise;
use crate::params::palette;

/// Angular step between outline vertices (radians)
const ANGLE_STEP: f32 = 0.1;

/// Base radius at silence (pixels)
const BASE_RADIUS: f32 = 80.0;

/// Color mix per unit of amplified volume
const MIX_RATE: f32 = 0.03;

const STROKE_WEIGHT: f32 = 3.0;
const GLOW_BLUR: f32 = 40.0;

/// Outline vertex count, independent of radius or distortion
pub fn outline_points() -> usize {
    (TAU / ANGLE_STEP).ceil() as usize
}

/// Shape parameters derived from one volume sample
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreShape {
    pub radius: f32,
    pub distortion: f32,
    pub noise_scale: f32,
    /// Depth advance applied after drawing
    pub depth_rate: f32,
}

impl CoreShape {
    pub fn from_amplified(amp: f32) -> Self {
        Self {
            radius: BASE_RADIUS + map_range(amp, 0.0, 100.0, 0.0, 50.0),
            distortion: map_range(amp, 0.0, 50.0, 5.0, 80.0),
            noise_scale: map_range(amp, 0.0, 50.0, 1.0, 3.0),
            depth_rate: map_range(amp, 0.0, 50.0, 0.01, 0.08),
        }
    }
}

/// Entropy core renderer; owns the ever-growing noise depth
pub struct EntropyCore {
    noise: CoherentNoise,
    sensitivity: f32,
    depth: f64,
}

impl EntropyCore {
    pub fn new(noise_seed: u32, sensitivity: f32) -> Self {
        Self {
            noise: CoherentNoise::new(noise_seed),
            sensitivity,
            depth: 0.0,
        }
    }

    /// Current depth into the noise field (never reset)
    pub fn depth(&self) -> f64 {
        self.depth
    }

    /// Quiet→loud color for a volume
    pub fn color(&self, volume: f32) -> Rgba {
        let mix = (volume * self.sensitivity * MIX_RATE).clamp(0.0, 1.0);
        palette::CORE_QUIET.lerp(palette::CORE_LOUD, mix)
    }

    /// Outline vertices relative to the core center at the current depth
    pub fn outline(&self, volume: f32) -> Vec<Vec2> {
        let shape = CoreShape::from_amplified(volume * self.sensitivity);
        (0..outline_points())
            .map(|i| {
                let a = i as f32 * ANGLE_STEP;
                let (sin, cos) = a.sin_cos();
                let xoff = map_range(cos, -1.0, 1.0, 0.0, shape.noise_scale);
                let yoff = map_range(sin, -1.0, 1.0, 0.0, shape.noise_scale);
                let n = self.noise.sample_3d(xoff as f64, yoff as f64, self.depth);
                let r = shape.radius + map_range(n, 0.0, 1.0, -shape.distortion, shape.distortion);
                Vec2::new(r * cos, r * sin)
            })
            .collect()
    }

    /// Draw the core at the canvas center, then advance the depth
    pub fn render<C: Canvas + ?Sized>(&mut self, canvas: &mut C, volume: f32) {
        let color = self.color(volume);
        let outline = self.outline(volume);

        canvas.push();
        canvas.translate(canvas.width() / 2.0, canvas.height() / 2.0);
        canvas.glow(GLOW_BLUR, color);
        canvas.stroke(color, STROKE_WEIGHT);
        canvas.no_fill();
        canvas.polygon(&outline);
        canvas.pop();

        self.depth += CoreShape::from_amplified(volume * self.sensitivity).depth_rate as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CommandRecorder, DrawCommand};

    #[test]
    fn test_fixed_point_count() {
        let core = EntropyCore::new(1, 300.0);
        assert_eq!(outline_points(), 63);
        assert_eq!(core.outline(0.0).len(), 63);
        assert_eq!(core.outline(0.9).len(), 63);
    }

    #[test]
    fn test_silent_outline_within_distortion_band() {
        let core = EntropyCore::new(3, 300.0);
        for p in core.outline(0.0) {
            let r = p.length();
            assert!((75.0 - 1e-3..=85.0 + 1e-3).contains(&r), "radius {}", r);
        }
    }

    #[test]
    fn test_shape_extrapolates_when_loud() {
        let shape = CoreShape::from_amplified(200.0);
        assert!(shape.distortion > 80.0);
        assert!(shape.depth_rate > 0.08);
        assert!(shape.radius > 130.0);
    }

    #[test]
    fn test_color_mix() {
        let core = EntropyCore::new(0, 300.0);
        assert_eq!(core.color(0.0), palette::CORE_QUIET);
        // 0.2 * 300 * 0.03 = 1.8, saturates at the loud color
        assert_eq!(core.color(0.2), palette::CORE_LOUD);
    }

    #[test]
    fn test_depth_grows_faster_when_loud() {
        let mut quiet = EntropyCore::new(0, 300.0);
        let mut loud = EntropyCore::new(0, 300.0);
        let mut canvas = CommandRecorder::new(400.0, 400.0);
        for _ in 0..10 {
            quiet.render(&mut canvas, 0.0);
            loud.render(&mut canvas, 0.1);
        }
        assert!((quiet.depth() - 0.1).abs() < 1e-5);
        assert!(loud.depth() > quiet.depth());
    }

    #[test]
    fn test_render_centers_stroked_outline() {
        let mut core = EntropyCore::new(5, 300.0);
        let mut canvas = CommandRecorder::new(400.0, 300.0);
        let local = core.outline(0.02);
        core.render(&mut canvas, 0.02);

        match &canvas.commands[0] {
            DrawCommand::Polygon { points, style } => {
                assert_eq!(points.len(), local.len());
                assert!((points[0] - (local[0] + Vec2::new(200.0, 150.0))).length() < 1e-3);
                assert!(style.fill.is_none());
                assert_eq!(style.stroke_weight, 3.0);
            }
            other => panic!("expected outline polygon, got {:?}", other),
        }
    }
}
