//! Auto-save lifecycle: latch on threshold, export once, reset history
//! after a wall-clock cooldown.
//!
//! Unlatched, then latched while the cooldown runs, then unlatched again
//! once the history is cleared. The save itself happens synchronously in the
//! frame that crosses the threshold: the controller hands back a
//! [`SnapshotRequest`] and the driver exports the frame. The cooldown starts
//! at the trigger, so the reset never waits on (or depends on) the export.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::Timelike;
use log::info;

use crate::canvas::{Canvas, Raster};
use crate::error::Result;
use crate::field::History;
use crate::params::{palette, SnapshotConfig};

/// Label size (pixels) and distance from the bottom-right corner
const LABEL_SIZE: f32 = 14.0;
const LABEL_MARGIN: f32 = 30.0;

/// Export requested for the current frame
#[derive(Clone, Debug, PartialEq)]
pub struct SnapshotRequest {
    pub frame_count: u64,
    pub path: PathBuf,
}

/// One-shot deadline, cancellable
#[derive(Clone, Debug)]
pub struct CooldownTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl CooldownTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True exactly once, on the first poll at or after the deadline
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Snapshot latch and history reset scheduler
pub struct SnapshotController {
    config: SnapshotConfig,
    latched: bool,
    cooldown: CooldownTimer,
}

impl SnapshotController {
    pub fn new(config: SnapshotConfig, cooldown: Duration) -> Self {
        Self {
            config,
            latched: false,
            cooldown: CooldownTimer::new(cooldown),
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Threshold reached: latch and request an export, unless already latched
    pub fn trigger(&mut self, frame_count: u64, now: Instant) -> Option<SnapshotRequest> {
        if self.latched {
            return None;
        }
        self.latched = true;
        self.cooldown.start(now);

        let file_name = self.config.file_name(frame_count);
        Some(SnapshotRequest {
            frame_count,
            path: self.config.path_for(&file_name),
        })
    }

    /// Clear the whole history once the cooldown expires; returns true if it did
    pub fn poll(&mut self, now: Instant, history: &mut History) -> bool {
        if !self.cooldown.fire(now) {
            return false;
        }
        history.clear();
        self.latched = false;
        true
    }

    /// Drop a pending reset (shutdown). History is left as is and the latch
    /// released, so a later threshold crossing can save again.
    pub fn cancel(&mut self) {
        self.cooldown.cancel();
        self.latched = false;
    }
}

/// Log label stamped on an exported frame (unpadded hour:minute)
pub fn label_text<T: Timelike>(time: &T) -> String {
    format!("ENTROPY MIRROR LOG | {}:{}", time.hour(), time.minute())
}

/// Write the labelled frame to the requested path
pub fn export(raster: &Raster, request: &SnapshotRequest) -> Result<()> {
    raster.save(&request.path)?;
    info!("Snapshot saved: {}", request.path.display());
    Ok(())
}

/// Draw the label in the bottom-right corner
pub fn draw_label<C: Canvas + ?Sized>(canvas: &mut C, text: &str) {
    canvas.push();
    canvas.no_glow();
    canvas.no_stroke();
    canvas.fill(palette::LABEL);
    canvas.text(
        canvas.width() - LABEL_MARGIN,
        canvas.height() - LABEL_MARGIN,
        text,
        LABEL_SIZE,
    );
    canvas.pop();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Rgba;
    use crate::field::{Star, StarKind};
    use chrono::NaiveTime;
    use glam::Vec2;

    fn controller() -> SnapshotController {
        SnapshotController::new(SnapshotConfig::default(), Duration::from_millis(2000))
    }

    fn history(len: usize) -> History {
        let mut history = History::new();
        for _ in 0..len {
            history.push(Star {
                position: Vec2::ZERO,
                kind: StarKind::Chaos,
                seed: 0.0,
                offset: 0.0,
                color: Rgba::gray(255),
                size: 8.0,
                glow_radius: 25.0,
            });
        }
        history
    }

    #[test]
    fn test_latch_fires_once() {
        let mut snapshots = controller();
        let t0 = Instant::now();

        let first = snapshots.trigger(900, t0);
        assert_eq!(
            first.map(|r| r.path),
            Some(PathBuf::from(".").join("Entropy_Nebula_900.png"))
        );
        assert!(snapshots.trigger(1200, t0).is_none());
        assert!(snapshots.trigger(1500, t0 + Duration::from_millis(1999)).is_none());
        assert!(snapshots.is_latched());
    }

    #[test]
    fn test_reset_after_cooldown() {
        let mut snapshots = controller();
        let mut stars = history(150);
        let t0 = Instant::now();
        snapshots.trigger(1, t0);

        assert!(!snapshots.poll(t0 + Duration::from_millis(1999), &mut stars));
        assert_eq!(stars.len(), 150);
        assert!(snapshots.is_latched());

        assert!(snapshots.poll(t0 + Duration::from_millis(2000), &mut stars));
        assert!(stars.is_empty());
        assert!(!snapshots.is_latched());

        // Fires only once
        assert!(!snapshots.poll(t0 + Duration::from_secs(10), &mut stars));

        // Latch released: next crossing saves again
        assert!(snapshots.trigger(2, t0 + Duration::from_secs(10)).is_some());
    }

    #[test]
    fn test_cancel_drops_pending_reset() {
        let mut snapshots = controller();
        let mut stars = history(3);
        let t0 = Instant::now();
        snapshots.trigger(1, t0);
        snapshots.cancel();

        assert!(!snapshots.poll(t0 + Duration::from_secs(5), &mut stars));
        assert_eq!(stars.len(), 3);
        assert!(!snapshots.is_latched());
    }

    #[test]
    fn test_label_text_unpadded() {
        let time = NaiveTime::from_hms_opt(9, 5, 0).unwrap();
        assert_eq!(label_text(&time), "ENTROPY MIRROR LOG | 9:5");
    }

    #[test]
    fn test_label_position() {
        let mut canvas = crate::canvas::CommandRecorder::new(800.0, 600.0);
        draw_label(&mut canvas, "X");
        match &canvas.commands[0] {
            crate::canvas::DrawCommand::Text { position, size, .. } => {
                assert_eq!(*position, Vec2::new(770.0, 570.0));
                assert_eq!(*size, LABEL_SIZE);
            }
            other => panic!("expected label, got {:?}", other),
        }
    }
}
