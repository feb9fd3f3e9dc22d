//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::params::{MicConfig, RenderConfig, SceneConfig, SnapshotConfig};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "entropy-mirror")]
#[command(about = "Microphone-driven star field with a breathing entropy core", long_about = None)]
pub struct Args {
    /// Stars accumulated before an auto-save snapshot
    #[arg(long, value_name = "STARS", default_value_t = 150)]
    pub save_threshold: usize,

    /// Frames per aggregation cycle (one star per cycle)
    #[arg(long, value_name = "FRAMES", default_value_t = 300)]
    pub cycle_frames: u32,

    /// Volume above which the star field shakes (0.0 - 1.0)
    #[arg(long, value_name = "LEVEL", default_value_t = 0.1)]
    pub shockwave: f32,

    /// Directory receiving snapshots
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Initial window width (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 1280)]
    pub width: u32,

    /// Initial window height (pixels)
    #[arg(long, value_name = "PIXELS", default_value_t = 720)]
    pub height: u32,

    /// Microphone level smoothing in [0, 1)
    #[arg(long, value_name = "FACTOR", default_value_t = 0.0)]
    pub smoothing: f32,

    /// Input device name (substring match); default device if omitted
    #[arg(long, value_name = "NAME")]
    pub device: Option<String>,

    /// Run without a window for this many frames, at a constant --volume
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u64>,

    /// Input level used in headless mode
    #[arg(long, value_name = "LEVEL", default_value_t = 0.0)]
    pub volume: f32,

    /// Seed for star placement and shake (reproducible runs)
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,
}

impl Args {
    /// Scene tunables with command-line overrides applied
    pub fn scene_config(&self) -> SceneConfig {
        SceneConfig {
            save_threshold: self.save_threshold,
            cycle_duration: self.cycle_frames,
            shockwave_threshold: self.shockwave,
            ..SceneConfig::default()
        }
    }

    pub fn snapshot_config(&self) -> SnapshotConfig {
        SnapshotConfig {
            output_dir: self.output_dir.clone(),
            ..SnapshotConfig::default()
        }
    }

    pub fn mic_config(&self) -> MicConfig {
        MicConfig {
            smoothing: self.smoothing,
            device: self.device.clone(),
        }
    }

    pub fn render_config(&self) -> RenderConfig {
        RenderConfig {
            window_width: self.width.max(1),
            window_height: self.height.max(1),
        }
    }
}
