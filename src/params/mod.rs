//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers of the visualization are extracted here with:
//! - Units (frames, milliseconds, pixels, normalized volume)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the frame loop

mod audio;
mod render;
mod scene;

// Re-export all types
pub use audio::MicConfig;
pub use render::{RenderConfig, SnapshotConfig};
pub use scene::{palette, SceneConfig};
