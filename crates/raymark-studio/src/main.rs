//! Raymark studio: draws configured marker rays through the solid-fill stage.
//!
//! Usage: `raymark-studio [overlay.toml]`. Without an argument the built-in
//! overlay is used. Escape closes the window.

mod config;
mod markers;

use std::path::PathBuf;

use anyhow::{Context, Result};
use raymark_engine::core::{App, AppControl, FrameCtx};
use raymark_engine::device::GpuInit;
use raymark_engine::logging::{init_logging, LoggingConfig};
use raymark_engine::render::solid_fill::SolidFillRenderer;
use raymark_engine::window::{Runtime, RuntimeConfig};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowId;

use config::StudioConfig;

struct Studio {
    config: StudioConfig,
    renderer: SolidFillRenderer,
}

impl App for Studio {
    fn on_window_event(&mut self, _window_id: WindowId, event: &WindowEvent) -> AppControl {
        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape) =>
            {
                AppControl::Exit
            }
            _ => AppControl::Continue,
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let angle = ctx.elapsed.as_secs_f32() * self.config.camera.orbit_speed;
        let view_proj =
            markers::view_projection(&self.config.camera, ctx.window.aspect_ratio(), angle);
        let draws = markers::build_draws(&self.config.markers, view_proj);

        let renderer = &mut self.renderer;
        let mut failed = false;
        let control = ctx.render(self.config.clear.0, |rctx, target| {
            if let Err(e) = renderer.render(rctx, target, &draws) {
                log::error!("solid fill draw rejected: {e}");
                failed = true;
            }
        });

        // Host configuration errors do not go away between frames.
        if failed { AppControl::Exit } else { control }
    }
}

fn load_config() -> Result<StudioConfig> {
    match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => StudioConfig::load(&path),
        None => StudioConfig::builtin(),
    }
}

fn main() -> Result<()> {
    let config = load_config()?;

    init_logging(LoggingConfig {
        env_filter: config.logging.filter.clone(),
        log_file: config.logging.file.clone(),
        crash_log: config.logging.crash_log.clone(),
        ..LoggingConfig::default()
    })?;

    log::info!(
        "raymark studio: {} marker(s), {} point(s) per frame",
        config.markers.len(),
        config.markers.iter().map(|m| m.count as u64).sum::<u64>()
    );

    let runtime = RuntimeConfig {
        title: config.window.title.clone(),
        initial_size: LogicalSize::new(config.window.width, config.window.height),
    };

    let app = Studio {
        config,
        renderer: SolidFillRenderer::new(),
    };

    Runtime::run(runtime, GpuInit::solid_fill(), app).context("studio runtime failed")
}
