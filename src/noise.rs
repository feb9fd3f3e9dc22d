//! Coherent noise field for the entropy core silhouette.
//!
//! Fractal Perlin noise (4 octaves, falloff 0.5) remapped into [0, 1] so the
//! core can treat samples as a displacement fraction.

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

/// Octave count of the fractal sum
const OCTAVES: usize = 4;

/// Amplitude falloff per octave
const PERSISTENCE: f64 = 0.5;

/// Noise generator for the core outline
pub struct CoherentNoise {
    fbm: Fbm<Perlin>,
}

impl CoherentNoise {
    /// Create new noise generator with seed
    pub fn new(seed: u32) -> Self {
        Self {
            fbm: Fbm::<Perlin>::new(seed)
                .set_octaves(OCTAVES)
                .set_persistence(PERSISTENCE),
        }
    }

    /// Sample 3D noise at position
    ///
    /// Returns value in range [0, 1]
    pub fn sample_3d(&self, x: f64, y: f64, z: f64) -> f32 {
        let n = self.fbm.get([x, y, z]);
        ((n + 1.0) * 0.5).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_in_unit_range() {
        let noise = CoherentNoise::new(7);
        for i in 0..200 {
            let t = i as f64 * 0.173;
            let n = noise.sample_3d(t.cos() * 2.0, t.sin() * 3.0, t * 0.05);
            assert!((0.0..=1.0).contains(&n), "sample {} out of range", n);
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = CoherentNoise::new(42);
        let b = CoherentNoise::new(42);
        assert_eq!(a.sample_3d(0.3, 1.7, 2.2), b.sample_3d(0.3, 1.7, 2.2));
    }
}
