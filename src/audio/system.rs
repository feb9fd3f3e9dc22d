//! cpal input stream feeding a shared level meter.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use log::{info, warn};
use std::sync::{Arc, Mutex};

use super::level::LevelMeter;
use super::LevelSource;
use crate::error::{Error, Result};
use crate::params::MicConfig;

/// Live microphone capture
pub struct MicrophoneInput {
    /// Latest smoothed level (thread-safe)
    meter: Arc<Mutex<LevelMeter>>,

    /// Audio input stream (kept alive)
    _stream: cpal::Stream,
}

impl MicrophoneInput {
    /// Open the configured input device and start capturing
    pub fn new(config: &MicConfig) -> Result<Self> {
        config.validate()?;

        let host = cpal::default_host();
        let device = match &config.device {
            Some(wanted) => find_device(&host, wanted)?,
            None => host
                .default_input_device()
                .ok_or_else(|| Error::Audio("No audio input device found".to_string()))?,
        };

        let supported = device
            .default_input_config()
            .map_err(|e| Error::Audio(format!("Failed to get input config: {}", e)))?;

        info!(
            "Audio input: {} @ {}Hz, {} channel(s), {}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            supported.sample_rate().0,
            supported.channels(),
            supported.sample_format()
        );

        let meter = Arc::new(Mutex::new(LevelMeter::new(config.smoothing)));
        let stream_config: cpal::StreamConfig = supported.config();

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &meter),
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &meter),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &meter),
            other => {
                return Err(Error::Audio(format!("Unsupported sample format {}", other)));
            }
        }
        .map_err(|e| Error::Audio(format!("Failed to build input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| Error::Audio(format!("Failed to start input stream: {}", e)))?;

        Ok(Self {
            meter,
            _stream: stream,
        })
    }
}

impl LevelSource for MicrophoneInput {
    /// Latest level; a poisoned meter reads as silence
    fn level(&self) -> f32 {
        self.meter.lock().map(|m| m.value()).unwrap_or(0.0)
    }
}

fn find_device(host: &cpal::Host, wanted: &str) -> Result<cpal::Device> {
    let wanted = wanted.to_lowercase();
    let devices = host
        .input_devices()
        .map_err(|e| Error::Audio(format!("Failed to list input devices: {}", e)))?;
    for device in devices {
        if let Ok(name) = device.name() {
            if name.to_lowercase().contains(&wanted) {
                return Ok(device);
            }
        }
    }
    Err(Error::Audio(format!("No input device matching '{}'", wanted)))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    meter: &Arc<Mutex<LevelMeter>>,
) -> std::result::Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let meter = Arc::clone(meter);
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            if data.is_empty() {
                return;
            }
            // RMS over interleaved channels
            let sum: f32 = data
                .iter()
                .map(|&s| {
                    let v = f32::from_sample(s);
                    v * v
                })
                .sum();
            let block_rms = (sum / data.len() as f32).sqrt();
            if let Ok(mut m) = meter.lock() {
                m.push_rms(block_rms);
            }
        },
        |err| warn!("Audio input stream error: {}", err),
        None,
    )
}
