//! Aggregation cycle: volume averaging, frame timer and its progress ring.

use std::f32::consts::{FRAC_PI_2, TAU};

use crate::canvas::{Canvas, Rgba};
use crate::params::palette;

/// Running sum of per-frame volume samples
#[derive(Clone, Debug, Default)]
pub struct VolumeAggregator {
    sum: f32,
    count: u32,
}

impl VolumeAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate one frame's level
    pub fn sample(&mut self, volume: f32) {
        self.sum += volume;
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Average of the samples since the last call, then reset
    ///
    /// Must only be called with at least one sample. Debug builds panic
    /// otherwise; release builds report silence instead of NaN.
    pub fn consume_average(&mut self) -> f32 {
        debug_assert!(self.count > 0, "volume average requested with no samples");
        let avg = if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f32
        };
        self.sum = 0.0;
        self.count = 0;
        avg
    }
}

/// Frame counter wrapping every `duration` frames
#[derive(Clone, Debug)]
pub struct CycleTimer {
    counter: u32,
    duration: u32,
}

impl CycleTimer {
    pub fn new(duration: u32) -> Self {
        Self {
            counter: 0,
            duration: duration.max(1),
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Fraction of the cycle elapsed, in [0, 1)
    pub fn progress(&self) -> f32 {
        self.counter as f32 / self.duration as f32
    }

    /// Count one frame; returns true (and wraps to 0) when the cycle completes
    pub fn advance(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.duration {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

/// Thin ring around the core showing cycle progress
pub struct ProgressRing {
    radius: f32,
}

impl ProgressRing {
    pub fn new(radius: f32) -> Self {
        Self { radius }
    }

    /// Draw the track and a clockwise arc from 12 o'clock
    pub fn render<C: Canvas + ?Sized>(&self, canvas: &mut C, progress: f32) {
        canvas.push();
        canvas.translate(canvas.width() / 2.0, canvas.height() / 2.0);

        canvas.no_glow();
        canvas.stroke(palette::RING_TRACK, 1.0);
        canvas.no_fill();
        canvas.ellipse(0.0, 0.0, self.radius * 2.0);

        canvas.stroke(palette::RING_PROGRESS, 2.0);
        canvas.glow(5.0, Rgba::gray(255));
        canvas.arc(0.0, 0.0, self.radius, -FRAC_PI_2, -FRAC_PI_2 + progress * TAU);

        canvas.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{CommandRecorder, DrawCommand};

    #[test]
    fn test_aggregator_average_and_reset() {
        let mut agg = VolumeAggregator::new();
        agg.sample(0.1);
        agg.sample(0.3);
        assert_eq!(agg.count(), 2);
        assert!((agg.consume_average() - 0.2).abs() < 1e-6);
        assert_eq!(agg.count(), 0);

        agg.sample(0.5);
        assert!((agg.consume_average() - 0.5).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "no samples")]
    #[cfg(debug_assertions)]
    fn test_empty_average_fails_loudly() {
        VolumeAggregator::new().consume_average();
    }

    #[test]
    fn test_timer_wraps_after_duration() {
        let mut timer = CycleTimer::new(300);
        for _ in 0..299 {
            assert!(!timer.advance());
        }
        assert_eq!(timer.counter(), 299);
        assert!(timer.advance());
        assert_eq!(timer.counter(), 0);
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_progress_monotonic_within_cycle() {
        let mut timer = CycleTimer::new(10);
        let mut last = timer.progress();
        for _ in 0..9 {
            timer.advance();
            assert!(timer.progress() > last);
            last = timer.progress();
        }
        timer.advance();
        assert_eq!(timer.progress(), 0.0);
    }

    #[test]
    fn test_ring_arc_spans_progress() {
        let ring = ProgressRing::new(150.0);
        let mut canvas = CommandRecorder::new(400.0, 400.0);
        ring.render(&mut canvas, 0.25);

        assert_eq!(canvas.commands.len(), 2);
        match &canvas.commands[1] {
            DrawCommand::Arc {
                center,
                radius,
                start,
                stop,
                ..
            } => {
                assert_eq!(center.x, 200.0);
                assert_eq!(*radius, 150.0);
                assert!((start + FRAC_PI_2).abs() < 1e-6);
                assert!((stop - start - TAU * 0.25).abs() < 1e-5);
            }
            other => panic!("expected arc, got {:?}", other),
        }
    }
}
