//! Converts a cycle's averaged volume into a classified star.

use glam::Vec2;
use rand::Rng;

use super::{Star, StarKind};
use crate::math::map_range;
use crate::params::{palette, SceneConfig};

/// Entropy domain mapped onto CHAOS star sizes
const CHAOS_ENTROPY_DOMAIN: (f32, f32) = (8.0, 50.0);

/// CHAOS star size range (pixels); extrapolates outside the entropy domain
const CHAOS_SIZE: (f32, f32) = (8.0, 16.0);

/// ZEN star size range (pixels), drawn uniformly
const ZEN_SIZE: (f32, f32) = (3.0, 6.0);

const CHAOS_GLOW: f32 = 25.0;
const ZEN_GLOW: f32 = 10.0;

/// Upper bound (exclusive) of the nebula seed draw
const SEED_RANGE: f32 = 10_000.0;

/// Upper bound (exclusive) of the animation offset draw
const OFFSET_RANGE: f32 = 100.0;

/// Star generator with classification parameters
pub struct StarGenerator {
    sensitivity: f32,
    chaos_threshold: f32,
}

impl StarGenerator {
    pub fn new(config: &SceneConfig) -> Self {
        Self {
            sensitivity: config.sensitivity,
            chaos_threshold: config.chaos_threshold,
        }
    }

    /// Entropy of an averaged volume
    pub fn entropy(&self, avg_volume: f32) -> f32 {
        avg_volume * self.sensitivity
    }

    /// Build a star for `avg_volume`, placed uniformly over `canvas_size`
    pub fn generate<R: Rng>(&self, avg_volume: f32, canvas_size: Vec2, rng: &mut R) -> Star {
        let entropy = self.entropy(avg_volume);
        let kind = StarKind::classify(entropy, self.chaos_threshold);

        // Fixed draw order: position, offset, seed, then size
        let position = Vec2::new(
            uniform(rng, 0.0, canvas_size.x),
            uniform(rng, 0.0, canvas_size.y),
        );
        let offset = rng.random_range(0.0..OFFSET_RANGE);
        let seed = rng.random_range(0.0..SEED_RANGE);

        let (color, size, glow_radius) = match kind {
            StarKind::Chaos => (
                palette::CHAOS,
                map_range(
                    entropy,
                    CHAOS_ENTROPY_DOMAIN.0,
                    CHAOS_ENTROPY_DOMAIN.1,
                    CHAOS_SIZE.0,
                    CHAOS_SIZE.1,
                ),
                CHAOS_GLOW,
            ),
            StarKind::Zen => (
                palette::ZEN,
                rng.random_range(ZEN_SIZE.0..ZEN_SIZE.1),
                ZEN_GLOW,
            ),
        };

        Star {
            position,
            kind,
            seed,
            offset,
            color,
            size,
            glow_radius,
        }
    }
}

/// Uniform draw in [lo, hi), tolerating a degenerate (zero-size) canvas
fn uniform<R: Rng>(rng: &mut R, lo: f32, hi: f32) -> f32 {
    if hi > lo {
        rng.random_range(lo..hi)
    } else {
        lo
    }
}
