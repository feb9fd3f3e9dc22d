//! Entropy Mirror - a microphone-driven star field
//!
//! Every few seconds the room's average loudness becomes a star: calm
//! cycles leave small blue points, loud ones leave orange bursts. A
//! noise-driven core breathes with the live input, and the sky is saved
//! and cleared once it fills up.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use entropy_mirror::audio::{ConstantLevel, LevelSource, MicrophoneInput, Silence};
use entropy_mirror::canvas::Raster;
use entropy_mirror::cli::Args;
use entropy_mirror::params::{MicConfig, RenderConfig};
use entropy_mirror::rendering::RenderSystem;
use entropy_mirror::scene::Scene;
use entropy_mirror::{headless, snapshot};

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,
    raster: Raster,

    // Simulation
    scene: Scene,
    audio: Option<Box<dyn LevelSource>>,

    // Configuration
    render_config: RenderConfig,
    mic_config: MicConfig,

    /// Fatal error raised inside the event loop
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(scene: Scene, render_config: RenderConfig, mic_config: MicConfig) -> Self {
        let raster = Raster::new(render_config.window_width, render_config.window_height);
        Self {
            window: None,
            render_system: None,
            raster,
            scene,
            audio: None,
            render_config,
            mic_config,
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Entropy Mirror")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .context("Failed to create window")?,
        );

        let render_system = pollster::block_on(RenderSystem::new(Arc::clone(&window)))?;

        let size = window.inner_size();
        self.raster.resize(size.width, size.height);

        let audio: Box<dyn LevelSource> = match MicrophoneInput::new(&self.mic_config) {
            Ok(mic) => Box::new(mic),
            Err(e) => {
                warn!("{}; running on silence", e);
                Box::new(Silence)
            }
        };

        info!("Entropy Mirror is running, press ESC to quit");

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.audio = Some(audio);
        Ok(())
    }

    fn quit(&mut self, event_loop: &ActiveEventLoop) {
        self.scene.shutdown();
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            self.failure = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.quit(event_loop),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => self.quit(event_loop),
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    self.raster.resize(size.width, size.height);
                }
                if let Some(render_system) = &mut self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render_frame() {
                    error!("{:#}", e);
                    self.failure = Some(e);
                    self.quit(event_loop);
                }
            }
            _ => {}
        }
    }
}

impl App {
    /// Step the scene and present a single frame
    fn render_frame(&mut self) -> anyhow::Result<()> {
        let Some(render_system) = &mut self.render_system else {
            return Ok(());
        };
        let volume = self.audio.as_ref().map_or(0.0, |audio| audio.level());

        let report = self.scene.step(&mut self.raster, volume, Instant::now());
        if let Some(request) = &report.snapshot {
            // Failures are logged only; the history reset still runs
            if let Err(e) = snapshot::export(&self.raster, request) {
                warn!("{}", e);
            }
        }

        let image = self.raster.image();
        render_system.render(image.as_raw(), image.width(), image.height())?;
        Ok(())
    }
}

/// Run the pipeline offscreen with a fixed level and a simulated 60 fps clock
fn run_headless(mut scene: Scene, args: &Args, frames: u64) -> anyhow::Result<()> {
    let render_config = args.render_config();
    let mut raster = Raster::new(render_config.window_width, render_config.window_height);

    info!(
        "Headless run: {} frames at volume {:.3}",
        frames, args.volume
    );

    let summary = headless::run(
        &mut scene,
        &mut raster,
        &ConstantLevel(args.volume),
        frames,
        Instant::now(),
    );

    info!(
        "Headless run finished: {} stars generated, {} in history, {} snapshots ({} failed)",
        summary.stars,
        summary.history_len,
        summary.snapshots_saved,
        summary.snapshots_failed
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let scene_config = args.scene_config();
    let snapshot_config = args.snapshot_config();
    let mic_config = args.mic_config();
    mic_config.validate()?;

    snapshot_config.ensure_output_dir().with_context(|| {
        format!(
            "Failed to create output directory {}",
            snapshot_config.output_dir.display()
        )
    })?;

    let scene = Scene::new(scene_config, snapshot_config, args.seed)?;

    if let Some(frames) = args.headless {
        return run_headless(scene, &args, frames);
    }

    info!("Entropy Mirror - initializing window and microphone");

    let mut app = App::new(scene, args.render_config(), mic_config);
    let event_loop = EventLoop::new()?;
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
