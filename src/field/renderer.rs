//! Replays the star history every frame: global shake, nebulae, twinkle.

use std::f64::consts::TAU;

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::{History, Star, StarKind};
use crate::canvas::Canvas;
use crate::math::map_range;
use crate::params::SceneConfig;

/// Overlapping soft circles per nebula
pub const NEBULA_CLOUDS: usize = 3;

/// Cloud diameter as a multiple of the star size
const CLOUD_SCALE: (f32, f32) = (6.0, 10.0);

/// Max cloud offset from the star on each axis (pixels)
const CLOUD_SPREAD: f32 = 10.0;

/// Nebula fill opacity (out of 255)
const NEBULA_ALPHA: f32 = 15.0;

/// Nebula pulse: rate per frame and amplitude (pixels)
const NEBULA_PULSE_RATE: f32 = 0.02;
const NEBULA_PULSE_PX: f32 = 5.0;

/// Twinkle rate per frame and opacity range
const TWINKLE_RATE: f32 = 0.05;
const TWINKLE_ALPHA: (f32, f32) = (80.0, 255.0);

/// CHAOS star rotation per frame (radians)
const SPIN_RATE: f32 = 0.02;

/// Half-width of the 4-point star relative to its size
const STAR_WAIST: f32 = 0.3;

/// One nebula cloud before the shared pulse term
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cloud {
    pub size_multiplier: f32,
    pub offset: Vec2,
}

/// Cloud layout of a star's nebula, a pure function of its seed
///
/// Uses a private generator per call so render order never disturbs it.
pub fn nebula_layout(seed: f32) -> [Cloud; NEBULA_CLOUDS] {
    let mut rng = SmallRng::seed_from_u64(seed.to_bits() as u64);
    std::array::from_fn(|_| {
        let size_multiplier = rng.random_range(CLOUD_SCALE.0..CLOUD_SCALE.1);
        let dx = rng.random_range(-CLOUD_SPREAD..CLOUD_SPREAD);
        let dy = rng.random_range(-CLOUD_SPREAD..CLOUD_SPREAD);
        Cloud {
            size_multiplier,
            offset: Vec2::new(dx, dy),
        }
    })
}

/// Whole-field jitter for one frame
///
/// Zero at or below the threshold; above it each axis is drawn from
/// `[-strength, strength]` with strength mapped linearly (unclamped) from
/// the volume.
pub fn shake_offset<R: Rng>(volume: f32, config: &SceneConfig, rng: &mut R) -> Vec2 {
    if volume <= config.shockwave_threshold {
        return Vec2::ZERO;
    }
    let strength = map_range(
        volume,
        config.shockwave_threshold,
        config.shockwave_full_volume,
        config.shake_min_px,
        config.shake_max_px,
    )
    .abs();
    if !strength.is_finite() {
        return Vec2::ZERO;
    }
    Vec2::new(
        rng.random_range(-strength..=strength),
        rng.random_range(-strength..=strength),
    )
}

/// Star field renderer
pub struct StarFieldRenderer {
    config: SceneConfig,
}

impl StarFieldRenderer {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Draw every star in insertion order, nebula first, under one shake
    ///
    /// Returns the shake offset applied this frame.
    pub fn render<C: Canvas + ?Sized, R: Rng>(
        &self,
        canvas: &mut C,
        history: &History,
        volume: f32,
        frame_count: u64,
        rng: &mut R,
    ) -> Vec2 {
        let shake = shake_offset(volume, &self.config, rng);
        let frame = frame_count as f64;

        canvas.push();
        canvas.translate(shake.x, shake.y);

        for star in history.stars() {
            if star.has_nebula() {
                draw_nebula(canvas, star, frame);
            }
            draw_star(canvas, star, frame);
        }

        canvas.pop();
        shake
    }
}

/// `frame * rate + offset` in f64, so animation keeps advancing on long runs
fn phase(frame: f64, rate: f32, offset: f32) -> f64 {
    frame * f64::from(rate) + f64::from(offset)
}

fn draw_nebula<C: Canvas + ?Sized>(canvas: &mut C, star: &Star, frame: f64) {
    canvas.no_stroke();
    canvas.no_glow();
    canvas.fill(star.color.with_alpha(NEBULA_ALPHA));

    // Pulse follows the star's own phase
    let pulse = phase(frame, NEBULA_PULSE_RATE, star.offset).sin() as f32 * NEBULA_PULSE_PX;
    for cloud in nebula_layout(star.seed) {
        let center = star.position + cloud.offset;
        canvas.ellipse(center.x, center.y, star.size * cloud.size_multiplier + pulse);
    }
}

fn draw_star<C: Canvas + ?Sized>(canvas: &mut C, star: &Star, frame: f64) {
    let alpha = map_range(
        phase(frame, TWINKLE_RATE, star.offset).sin() as f32,
        -1.0,
        1.0,
        TWINKLE_ALPHA.0,
        TWINKLE_ALPHA.1,
    );

    canvas.glow(star.glow_radius, star.color);
    canvas.no_stroke();
    canvas.fill(star.color.with_alpha(alpha));

    canvas.push();
    canvas.translate(star.position.x, star.position.y);
    match star.kind {
        StarKind::Chaos => {
            canvas.rotate((phase(frame, SPIN_RATE, star.offset) % TAU) as f32);
            let s = star.size;
            canvas.polygon(&[
                Vec2::new(0.0, -s),
                Vec2::new(s * STAR_WAIST, 0.0),
                Vec2::new(0.0, s),
                Vec2::new(-s * STAR_WAIST, 0.0),
            ]);
        }
        StarKind::Zen => canvas.ellipse(0.0, 0.0, star.size),
    }
    canvas.pop();
}
