//! Microphone level capture.
//!
//! The scene only ever asks for one scalar per frame. Sources must never
//! block and report 0.0 until they have data.

mod level;
mod system;

// Re-export public types
pub use level::LevelMeter;
pub use system::MicrophoneInput;

/// Per-frame volume poll, in [0, 1]
pub trait LevelSource {
    fn level(&self) -> f32;
}

/// Stand-in when no capture device is available
#[derive(Clone, Copy, Debug, Default)]
pub struct Silence;

impl LevelSource for Silence {
    fn level(&self) -> f32 {
        0.0
    }
}

/// Fixed level, used for headless runs
#[derive(Clone, Copy, Debug)]
pub struct ConstantLevel(pub f32);

impl LevelSource for ConstantLevel {
    fn level(&self) -> f32 {
        self.0
    }
}

impl<T: LevelSource + ?Sized> LevelSource for Box<T> {
    fn level(&self) -> f32 {
        (**self).level()
    }
}
