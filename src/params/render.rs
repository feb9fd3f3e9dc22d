//! Window and snapshot export configuration.

use std::path::PathBuf;

use crate::error::Result;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Initial window width (pixels)
    pub window_width: u32,

    /// Initial window height (pixels)
    pub window_height: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
        }
    }
}

/// Snapshot export configuration
#[derive(Debug, Clone)]
pub struct SnapshotConfig {
    /// Directory receiving exported frames
    pub output_dir: PathBuf,

    /// File name prefix, followed by the frame count
    pub prefix: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            prefix: "Entropy_Nebula_".to_string(),
        }
    }
}

impl SnapshotConfig {
    /// File name for a snapshot taken at `frame_count`
    pub fn file_name(&self, frame_count: u64) -> String {
        format!("{}{}.png", self.prefix, frame_count)
    }

    /// Full export path for a snapshot file name
    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    /// Create the output directory (and parents) if missing
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        Ok(())
    }
}
