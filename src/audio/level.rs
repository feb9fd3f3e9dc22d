//! Level follower with optional exponential smoothing.

/// Level follower fed by the capture callback
#[derive(Clone, Debug, Default)]
pub struct LevelMeter {
    smoothing: f32,
    value: f32,
}

impl LevelMeter {
    /// `smoothing` is the weight kept from the previous value, in [0, 1)
    pub fn new(smoothing: f32) -> Self {
        Self {
            smoothing: smoothing.clamp(0.0, 0.999),
            value: 0.0,
        }
    }

    /// Fold in the RMS of a new block, clamped to [0, 1]
    pub fn push_rms(&mut self, block_rms: f32) -> f32 {
        let block = if block_rms.is_finite() {
            block_rms.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.value = self.value * self.smoothing + block * (1.0 - self.smoothing);
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}
