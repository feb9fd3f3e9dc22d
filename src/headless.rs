//! Offscreen run of the frame pipeline against a fixed level source.

use std::time::{Duration, Instant};

use log::warn;

use crate::audio::LevelSource;
use crate::canvas::Raster;
use crate::scene::Scene;
use crate::snapshot;

/// Simulated frame rate
pub const FPS: f64 = 60.0;

/// Counters gathered over a headless run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub stars: usize,
    pub snapshots_saved: usize,
    pub snapshots_failed: usize,
    /// Stars left in history when the run ended
    pub history_len: usize,
}

/// Step `frames` frames on a simulated 60 fps clock starting at `start`,
/// exporting every requested snapshot. Export failures are logged and
/// counted; the run (and the history reset) carries on.
pub fn run<L: LevelSource + ?Sized>(
    scene: &mut Scene,
    raster: &mut Raster,
    source: &L,
    frames: u64,
    start: Instant,
) -> RunSummary {
    let mut summary = RunSummary {
        frames,
        ..RunSummary::default()
    };

    for frame in 0..frames {
        // Frame 0 sits at `start`; step n sees n/60 s of synthetic time
        let now = start + Duration::from_secs_f64(frame as f64 / FPS);
        let report = scene.step(raster, source.level(), now);
        if report.star.is_some() {
            summary.stars += 1;
        }
        if let Some(request) = &report.snapshot {
            match snapshot::export(raster, request) {
                Ok(()) => summary.snapshots_saved += 1,
                Err(e) => {
                    warn!("{}", e);
                    summary.snapshots_failed += 1;
                }
            }
        }
    }
    scene.shutdown();

    summary.history_len = scene.history().len();
    summary
}
