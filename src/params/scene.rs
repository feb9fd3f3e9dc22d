//! Scene constants: cycle length, thresholds and star styling.

use std::time::Duration;

use crate::error::{Error, Result};

/// Tunables of the star accumulation engine
#[derive(Debug, Clone)]
pub struct SceneConfig {
    /// Stars in history that trigger an auto-save snapshot
    /// default: 150
    pub save_threshold: usize,

    /// Frames per aggregation cycle (one star per cycle, ~5s at 60fps)
    /// default: 300
    pub cycle_duration: u32,

    /// Instantaneous volume above which the star field shakes (0.0 - 1.0)
    /// default: 0.1
    pub shockwave_threshold: f32,

    /// Volume at which the shake reaches `shake_max_px` (extrapolates beyond)
    /// default: 0.5
    pub shockwave_full_volume: f32,

    /// Shake strength at the threshold volume (pixels)
    pub shake_min_px: f32,

    /// Shake strength at `shockwave_full_volume` (pixels)
    pub shake_max_px: f32,

    /// Volume → entropy amplification
    /// default: 300
    pub sensitivity: f32,

    /// Entropy strictly above this becomes a CHAOS star
    /// default: 8
    pub chaos_threshold: f32,

    /// Wall-clock delay between a snapshot and the history reset
    /// default: 2000ms
    pub cooldown: Duration,

    /// Progress ring radius (pixels)
    pub ring_radius: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            save_threshold: 150,
            cycle_duration: 300,
            shockwave_threshold: 0.1,
            shockwave_full_volume: 0.5,
            shake_min_px: 2.0,
            shake_max_px: 20.0,
            sensitivity: 300.0,
            chaos_threshold: 8.0,
            cooldown: Duration::from_millis(2000),
            ring_radius: 150.0,
        }
    }
}

impl SceneConfig {
    /// Reject values that would stall or divide the frame loop by zero
    pub fn validate(&self) -> Result<()> {
        if self.cycle_duration == 0 {
            return Err(Error::InvalidConfig(
                "cycle duration must be at least one frame".to_string(),
            ));
        }
        if self.save_threshold == 0 {
            return Err(Error::InvalidConfig(
                "save threshold must be > 0".to_string(),
            ));
        }
        if !(self.sensitivity > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sensitivity must be positive, got {}",
                self.sensitivity
            )));
        }
        if !(self.shockwave_threshold.is_finite() && self.shockwave_threshold >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "shockwave threshold must be a non-negative level, got {}",
                self.shockwave_threshold
            )));
        }
        for (name, px) in [("min", self.shake_min_px), ("max", self.shake_max_px)] {
            if !(px.is_finite() && px >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "shake {} must be a non-negative pixel count, got {}",
                    name, px
                )));
            }
        }
        if !self.shockwave_full_volume.is_finite()
            || self.shockwave_full_volume <= self.shockwave_threshold
        {
            return Err(Error::InvalidConfig(format!(
                "shockwave full volume {} must exceed threshold {}",
                self.shockwave_full_volume, self.shockwave_threshold
            )));
        }
        Ok(())
    }
}

/// Fixed colors of the scene
pub mod palette {
    use crate::canvas::Rgba;

    /// Frame clear color
    pub const BACKGROUND: Rgba = Rgba::rgb(5, 5, 10);

    /// CHAOS star body and nebula
    pub const CHAOS: Rgba = Rgba::rgb(255, 150, 50);

    /// ZEN star body
    pub const ZEN: Rgba = Rgba::rgb(100, 220, 255);

    /// Core color at silence
    pub const CORE_QUIET: Rgba = Rgba::rgb(0, 180, 255);

    /// Core color at full mix
    pub const CORE_LOUD: Rgba = Rgba::rgb(255, 50, 100);

    /// Progress ring track
    pub const RING_TRACK: Rgba = Rgba::gray(30);

    /// Progress ring arc (white at ~40% opacity)
    pub const RING_PROGRESS: Rgba = Rgba::new(255, 255, 255, 100);

    /// Snapshot timestamp label
    pub const LABEL: Rgba = Rgba::new(255, 255, 255, 150);
}
