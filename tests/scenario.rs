//! End-to-end runs of the frame pipeline against a recording canvas and a
//! synthetic clock.

use std::time::{Duration, Instant};

use entropy_mirror::canvas::{CommandRecorder, Raster};
use entropy_mirror::error::Error;
use entropy_mirror::field::StarKind;
use entropy_mirror::params::{SceneConfig, SnapshotConfig};
use entropy_mirror::scene::{FrameReport, Scene};
use entropy_mirror::snapshot;

fn scene(config: SceneConfig) -> Scene {
    Scene::new(config, SnapshotConfig::default(), Some(7)).unwrap()
}

/// Step one frame on a cleared recorder
fn step(scene: &mut Scene, canvas: &mut CommandRecorder, volume: f32, now: Instant) -> FrameReport {
    canvas.clear();
    scene.step(canvas, volume, now)
}

#[test]
fn test_silent_cycle_makes_zen_star() {
    let mut scene = scene(SceneConfig::default());
    let mut canvas = CommandRecorder::new(1280.0, 720.0);
    let now = Instant::now();

    let stars: Vec<_> = (0..300)
        .filter_map(|_| step(&mut scene, &mut canvas, 0.0, now).star)
        .collect();

    assert_eq!(stars.len(), 1);
    assert_eq!(stars[0].kind, StarKind::Zen);
    assert!(!stars[0].has_nebula());
    assert!((3.0..=6.0).contains(&stars[0].size));
    assert_eq!(scene.cycle_frame(), 0);
}

#[test]
fn test_loud_cycle_makes_chaos_star() {
    let mut scene = scene(SceneConfig::default());
    let mut canvas = CommandRecorder::new(1280.0, 720.0);
    let now = Instant::now();

    let stars: Vec<_> = (0..300)
        .filter_map(|_| step(&mut scene, &mut canvas, 0.05, now).star)
        .collect();

    assert_eq!(stars.len(), 1);
    let star = &stars[0];
    assert_eq!(star.kind, StarKind::Chaos);
    assert!(star.has_nebula());
    assert!(star.size >= 8.0 && star.size <= 16.0, "size {}", star.size);
    assert!(star.position.x >= 0.0 && star.position.x < 1280.0);
    assert!(star.position.y >= 0.0 && star.position.y < 720.0);
}

#[test]
fn test_full_history_saves_once_then_clears_after_cooldown() {
    let mut scene = scene(SceneConfig::default());
    let mut canvas = CommandRecorder::new(800.0, 600.0);
    let t0 = Instant::now();

    let mut requests = Vec::new();
    for _ in 0..150 * 300 {
        let report = step(&mut scene, &mut canvas, 0.05, t0);
        assert!(!report.history_reset);
        requests.extend(report.snapshot);
    }

    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].frame_count, 45_000);
    assert!(requests[0]
        .path
        .ends_with("Entropy_Nebula_45000.png"));
    assert_eq!(scene.history().len(), 150);
    assert!(scene.snapshot_pending());

    // Cooldown still running
    let report = step(&mut scene, &mut canvas, 0.05, t0 + Duration::from_millis(1999));
    assert!(!report.history_reset);
    assert_eq!(scene.history().len(), 150);

    let report = step(&mut scene, &mut canvas, 0.05, t0 + Duration::from_millis(2000));
    assert!(report.history_reset);
    assert!(report.snapshot.is_none());
    assert_eq!(scene.history().len(), 0);
    assert!(!scene.snapshot_pending());

    // No second reset without a second save
    let report = step(&mut scene, &mut canvas, 0.05, t0 + Duration::from_secs(10));
    assert!(!report.history_reset);
}

#[test]
fn test_label_drawn_only_on_snapshot_frame() {
    let config = SceneConfig {
        cycle_duration: 1,
        save_threshold: 3,
        ..SceneConfig::default()
    };
    let mut scene = scene(config);
    let mut canvas = CommandRecorder::new(400.0, 300.0);
    let now = Instant::now();

    for _ in 0..2 {
        step(&mut scene, &mut canvas, 0.0, now);
        assert_eq!(canvas.texts().count(), 0);
    }

    let report = step(&mut scene, &mut canvas, 0.0, now);
    assert!(report.snapshot.is_some());
    let labels: Vec<_> = canvas.texts().collect();
    assert_eq!(labels.len(), 1);
    assert!(labels[0].starts_with("ENTROPY MIRROR LOG | "));

    step(&mut scene, &mut canvas, 0.0, now);
    assert_eq!(canvas.texts().count(), 0);
}

#[test]
fn test_threshold_latch_across_crossing() {
    let config = SceneConfig {
        cycle_duration: 1,
        ..SceneConfig::default()
    };
    let mut scene = scene(config);
    let mut canvas = CommandRecorder::new(640.0, 480.0);
    let now = Instant::now();

    for _ in 0..149 {
        assert!(step(&mut scene, &mut canvas, 0.0, now).snapshot.is_none());
    }
    assert_eq!(scene.history().len(), 149);

    let at_threshold = step(&mut scene, &mut canvas, 0.0, now);
    assert!(at_threshold.snapshot.is_some());
    assert_eq!(scene.history().len(), 150);

    let past_threshold = step(&mut scene, &mut canvas, 0.0, now);
    assert!(past_threshold.snapshot.is_none());
    assert_eq!(scene.history().len(), 151);
}

#[test]
fn test_history_only_shrinks_on_reset() {
    let config = SceneConfig {
        cycle_duration: 2,
        save_threshold: 5,
        ..SceneConfig::default()
    };
    let mut scene = scene(config);
    let mut canvas = CommandRecorder::new(320.0, 240.0);
    let t0 = Instant::now();

    let mut previous = 0;
    let mut resets = 0;
    for frame in 0..400u64 {
        // 100ms per frame: a reset lands 20 frames after each save
        let now = t0 + Duration::from_millis(frame * 100);
        let volume = if frame % 7 < 3 { 0.2 } else { 0.0 };
        let report = step(&mut scene, &mut canvas, volume, now);
        let len = scene.history().len();

        if len < previous {
            assert!(report.history_reset, "history shrank without a reset");
            assert!(len <= 1);
            resets += 1;
        } else {
            assert!(!report.history_reset || previous == 0);
        }
        previous = len;
    }
    assert!(resets >= 2);
}

#[test]
fn test_shutdown_drops_pending_reset() {
    let config = SceneConfig {
        cycle_duration: 1,
        save_threshold: 2,
        ..SceneConfig::default()
    };
    let mut scene = scene(config);
    let mut canvas = CommandRecorder::new(320.0, 240.0);
    let t0 = Instant::now();

    step(&mut scene, &mut canvas, 0.0, t0);
    assert!(step(&mut scene, &mut canvas, 0.0, t0).snapshot.is_some());

    scene.shutdown();
    let report = step(&mut scene, &mut canvas, 0.0, t0 + Duration::from_secs(5));
    assert!(!report.history_reset);
    assert_eq!(scene.history().len(), 3);
}

#[test]
fn test_failed_export_does_not_block_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let blocker = tmp.path().join("occupied");
    std::fs::write(&blocker, b"x").unwrap();
    let snapshots = SnapshotConfig {
        output_dir: blocker,
        ..SnapshotConfig::default()
    };
    let config = SceneConfig {
        cycle_duration: 1,
        save_threshold: 4,
        ..SceneConfig::default()
    };
    let mut scene = Scene::new(config, snapshots, Some(11)).unwrap();
    let mut raster = Raster::new(64, 48);
    let t0 = Instant::now();

    let mut failures = 0;
    for _ in 0..4 {
        let report = scene.step(&mut raster, 0.0, t0);
        if let Some(request) = &report.snapshot {
            let result = snapshot::export(&raster, request);
            assert!(matches!(result, Err(Error::Export { .. })));
            failures += 1;
        }
    }
    assert_eq!(failures, 1);
    assert_eq!(scene.history().len(), 4);

    let report = scene.step(&mut raster, 0.0, t0 + Duration::from_millis(2000));
    assert!(report.history_reset);
    // Cleared at the start of the frame, then this frame's cycle adds one
    assert_eq!(scene.history().len(), 1);
}
