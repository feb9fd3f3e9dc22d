//! Star field: persistent stars generated once per cycle and replayed
//! every frame.

mod generator;
mod renderer;

pub use generator::StarGenerator;
pub use renderer::{nebula_layout, shake_offset, Cloud, StarFieldRenderer, NEBULA_CLOUDS};

use glam::Vec2;

use crate::canvas::Rgba;

/// Star classification, fixed at creation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarKind {
    /// Loud cycle: large rotating 4-point star with a permanent nebula
    Chaos,
    /// Quiet cycle: small round pearl
    Zen,
}

impl StarKind {
    /// Strictly above the threshold is CHAOS; the boundary itself is ZEN
    pub fn classify(entropy: f32, chaos_threshold: f32) -> Self {
        if entropy > chaos_threshold {
            StarKind::Chaos
        } else {
            StarKind::Zen
        }
    }
}

/// Immutable star record
#[derive(Clone, Debug, PartialEq)]
pub struct Star {
    /// Absolute canvas position at creation time
    pub position: Vec2,
    pub kind: StarKind,
    /// Reseeds the nebula layout, in [0, 10000)
    pub seed: f32,
    /// Animation phase shift, in [0, 100)
    pub offset: f32,
    pub color: Rgba,
    /// Body size (pixels)
    pub size: f32,
    /// Glow blur radius (pixels)
    pub glow_radius: f32,
}

impl Star {
    /// Only CHAOS stars carry a nebula, for their whole lifetime
    pub fn has_nebula(&self) -> bool {
        self.kind == StarKind::Chaos
    }
}

/// Append-only star history, cleared wholesale after a snapshot
#[derive(Clone, Debug, Default)]
pub struct History {
    stars: Vec<Star>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a star, returning the new length
    pub fn push(&mut self, star: Star) -> usize {
        self.stars.push(star);
        self.stars.len()
    }

    pub fn len(&self) -> usize {
        self.stars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stars.is_empty()
    }

    /// Stars in insertion order
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Drop every star at once
    pub fn clear(&mut self) {
        self.stars.clear();
    }
}
