//! Microphone capture configuration.

use crate::error::{Error, Result};

/// Microphone level capture configuration
#[derive(Debug, Clone, Default)]
pub struct MicConfig {
    /// Exponential smoothing between successive RMS blocks, in [0, 1)
    /// 0.0 = report the latest block as-is
    pub smoothing: f32,

    /// Case-insensitive substring of the input device name
    /// None = host default input device
    pub device: Option<String>,
}

impl MicConfig {
    /// Validate configuration (smoothing must leave room for new samples)
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(Error::InvalidConfig(format!(
                "smoothing must be in [0, 1), got {}",
                self.smoothing
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_smoothing_bounds() {
        assert!(MicConfig::default().validate().is_ok());

        let full = MicConfig {
            smoothing: 1.0,
            ..MicConfig::default()
        };
        assert!(full.validate().is_err());
    }
}
