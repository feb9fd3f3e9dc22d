//! Simulation state and the per-frame pipeline.
//!
//! A [`Scene`] owns everything that accumulates across frames: star
//! history, cycle accumulator and timer, core depth and snapshot latch.
//! The driver feeds it one volume sample per frame and a canvas to draw on.

use std::time::Instant;

use glam::Vec2;
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::canvas::Canvas;
use crate::cycle::{CycleTimer, ProgressRing, VolumeAggregator};
use crate::entropy_core::EntropyCore;
use crate::error::Result;
use crate::field::{History, Star, StarFieldRenderer, StarGenerator};
use crate::params::{palette, SceneConfig, SnapshotConfig};
use crate::snapshot::{draw_label, label_text, SnapshotController, SnapshotRequest};

/// What happened during one frame
#[derive(Clone, Debug, Default)]
pub struct FrameReport {
    pub frame_count: u64,
    /// Sanitized volume used this frame
    pub volume: f32,
    /// Star field jitter applied this frame
    pub shake: Vec2,
    /// Star generated at the end of a cycle
    pub star: Option<Star>,
    /// Frame to export (label already drawn)
    pub snapshot: Option<SnapshotRequest>,
    /// History was cleared at the start of this frame
    pub history_reset: bool,
}

/// Process-wide visualization state, owned by the frame loop
pub struct Scene {
    config: SceneConfig,
    history: History,
    aggregator: VolumeAggregator,
    timer: CycleTimer,
    generator: StarGenerator,
    field: StarFieldRenderer,
    core: EntropyCore,
    ring: ProgressRing,
    snapshots: SnapshotController,
    rng: SmallRng,
    frame_count: u64,
}

impl Scene {
    /// Build a scene; `seed` makes star placement and shake reproducible
    pub fn new(config: SceneConfig, snapshot: SnapshotConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;

        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let noise_seed: u32 = rng.random();

        Ok(Self {
            history: History::new(),
            aggregator: VolumeAggregator::new(),
            timer: CycleTimer::new(config.cycle_duration),
            generator: StarGenerator::new(&config),
            field: StarFieldRenderer::new(&config),
            core: EntropyCore::new(noise_seed, config.sensitivity),
            ring: ProgressRing::new(config.ring_radius),
            snapshots: SnapshotController::new(snapshot, config.cooldown),
            rng,
            frame_count: 0,
            config,
        })
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Frames stepped so far (the first frame is 1)
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Frames into the current cycle
    pub fn cycle_frame(&self) -> u32 {
        self.timer.counter()
    }

    pub fn core_depth(&self) -> f64 {
        self.core.depth()
    }

    pub fn snapshot_pending(&self) -> bool {
        self.snapshots.is_latched()
    }

    /// Run one frame: sample, draw field, core and ring, advance the cycle
    pub fn step<C: Canvas + ?Sized>(
        &mut self,
        canvas: &mut C,
        volume: f32,
        now: Instant,
    ) -> FrameReport {
        self.frame_count += 1;

        // Levels are normalized; underruns and device glitches read as silence
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            0.0
        };

        let history_reset = self.snapshots.poll(now, &mut self.history);
        if history_reset {
            info!("History cleared after snapshot cooldown");
        }

        self.aggregator.sample(volume);

        canvas.background(palette::BACKGROUND);
        let shake = self.field.render(
            canvas,
            &self.history,
            volume,
            self.frame_count,
            &mut self.rng,
        );
        self.core.render(canvas, volume);
        self.ring.render(canvas, self.timer.progress());

        let mut report = FrameReport {
            frame_count: self.frame_count,
            volume,
            shake,
            history_reset,
            ..FrameReport::default()
        };

        if self.timer.advance() {
            let avg = self.aggregator.consume_average();
            let size = Vec2::new(canvas.width(), canvas.height());
            let star = self.generator.generate(avg, size, &mut self.rng);
            let len = self.history.push(star.clone());
            debug!(
                "Star #{}: {:?} (entropy {:.2}, size {:.1}) at ({:.0}, {:.0})",
                len,
                star.kind,
                self.generator.entropy(avg),
                star.size,
                star.position.x,
                star.position.y
            );

            if len >= self.config.save_threshold {
                if let Some(request) = self.snapshots.trigger(self.frame_count, now) {
                    draw_label(canvas, &label_text(&chrono::Local::now()));
                    info!(
                        "History reached {} stars, saving {}",
                        len,
                        request.path.display()
                    );
                    report.snapshot = Some(request);
                }
            }
            report.star = Some(star);
        }

        report
    }

    /// Cancel a pending history reset (shutdown)
    pub fn shutdown(&mut self) {
        self.snapshots.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CommandRecorder;
    use crate::field::StarKind;
    use clap::Parser;

    fn scene(config: SceneConfig) -> Scene {
        Scene::new(config, SnapshotConfig::default(), Some(42)).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SceneConfig {
            cycle_duration: 0,
            ..SceneConfig::default()
        };
        assert!(Scene::new(config, SnapshotConfig::default(), Some(1)).is_err());
    }

    #[test]
    fn test_one_star_per_cycle() {
        let mut scene = scene(SceneConfig::default());
        let mut canvas = CommandRecorder::new(640.0, 480.0);
        let now = Instant::now();

        for frame in 1..300 {
            let report = scene.step(&mut canvas, 0.0, now);
            assert!(report.star.is_none(), "star at frame {}", frame);
        }
        let report = scene.step(&mut canvas, 0.0, now);
        let star = report.star.expect("star on frame 300");
        assert_eq!(star.kind, StarKind::Zen);
        assert_eq!(scene.history().len(), 1);
        assert_eq!(scene.cycle_frame(), 0);
    }

    #[test]
    fn test_star_drawn_on_following_frame() {
        let config = SceneConfig {
            cycle_duration: 2,
            ..SceneConfig::default()
        };
        let mut scene = scene(config);
        let mut canvas = CommandRecorder::new(640.0, 480.0);
        let now = Instant::now();

        scene.step(&mut canvas, 0.05, now);
        scene.step(&mut canvas, 0.05, now);
        assert_eq!(scene.history().len(), 1);

        canvas.clear();
        scene.step(&mut canvas, 0.05, now);
        // background, 3 nebula clouds, star, core, ring track, ring arc
        assert_eq!(canvas.commands.len(), 8);
    }

    #[test]
    fn test_nan_volume_reads_as_silence() {
        let mut scene = scene(SceneConfig::default());
        let mut canvas = CommandRecorder::new(100.0, 100.0);
        let report = scene.step(&mut canvas, f32::NAN, Instant::now());
        assert_eq!(report.volume, 0.0);
        assert_eq!(report.shake, Vec2::ZERO);
    }

    #[test]
    fn test_out_of_range_volume_clamped() {
        let mut scene = scene(SceneConfig::default());
        let mut canvas = CommandRecorder::new(100.0, 100.0);
        let now = Instant::now();

        let report = scene.step(&mut canvas, 1e38, now);
        assert_eq!(report.volume, 1.0);
        assert!(report.shake.is_finite());
        // Volume 1.0 extrapolates past full volume: 2 + 0.9 / 0.4 * 18
        assert!(report.shake.x.abs() <= 42.5 && report.shake.y.abs() <= 42.5);

        let report = scene.step(&mut canvas, f32::INFINITY, now);
        assert_eq!(report.volume, 0.0);
        let report = scene.step(&mut canvas, -0.5, now);
        assert_eq!(report.volume, 0.0);
    }

    #[test]
    fn test_nan_shockwave_rejected_before_first_frame() {
        let args = crate::cli::Args::parse_from(["entropy-mirror", "--shockwave", "NaN"]);
        assert!(Scene::new(args.scene_config(), SnapshotConfig::default(), Some(1)).is_err());
    }

    #[test]
    fn test_core_depth_advances_every_frame() {
        let mut scene = scene(SceneConfig::default());
        let mut canvas = CommandRecorder::new(100.0, 100.0);
        let now = Instant::now();
        scene.step(&mut canvas, 0.0, now);
        let first = scene.core_depth();
        scene.step(&mut canvas, 0.0, now);
        assert!(scene.core_depth() > first);
    }

    #[test]
    fn test_resize_keeps_star_positions() {
        let config = SceneConfig {
            cycle_duration: 1,
            ..SceneConfig::default()
        };
        let mut scene = scene(config);
        let mut canvas = CommandRecorder::new(1000.0, 1000.0);
        let now = Instant::now();
        for _ in 0..20 {
            scene.step(&mut canvas, 0.0, now);
        }
        let before: Vec<Vec2> = scene.history().stars().iter().map(|s| s.position).collect();

        canvas.resize(50.0, 50.0);
        scene.step(&mut canvas, 0.0, now);
        let after: Vec<Vec2> = scene.history().stars()[..20]
            .iter()
            .map(|s| s.position)
            .collect();
        assert_eq!(before, after);
    }
}
