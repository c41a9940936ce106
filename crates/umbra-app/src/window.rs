//! Window creation and event handling via winit.
//!
//! [`App`] implements winit's [`ApplicationHandler`]: it opens the window on
//! `resumed`, records resizes as pending viewports, and renders one frame per
//! `RedrawRequested`, asking for the next redraw only once the current frame
//! has been submitted.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use umbra_config::Config;
use umbra_render::{
    ShadowVolumeRenderer, SurfaceError, Viewport, WgpuRenderer, base_scene_from_config,
    init_render_context_blocking, volume_scene_from_config,
};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::frame_driver::{FrameClock, FrameDriver, camera_from_config};

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

/// Application state: the window plus everything created once it exists.
pub struct App {
    config: Config,
    window: Option<Arc<Window>>,
    renderer: Option<WgpuRenderer>,
    driver: Option<FrameDriver>,
    clock: FrameClock,
}

impl App {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            renderer: None,
            driver: None,
            clock: FrameClock::new(),
        }
    }

    fn current_viewport(window: &Window) -> Viewport {
        let size = window.inner_size();
        Viewport::from_physical(size.width, size.height, window.scale_factor())
    }

    /// Creates the window, GPU renderer and scenes. Errors are logged and
    /// leave the app without a window.
    fn initialize(&mut self, event_loop: &ActiveEventLoop) -> bool {
        let attrs = window_attributes_from_config(&self.config);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                return false;
            }
        };

        let context = match init_render_context_blocking(window.clone(), self.config.window.vsync)
        {
            Ok(context) => context,
            Err(e) => {
                error!("GPU initialization failed: {e}");
                return false;
            }
        };

        let mut renderer = WgpuRenderer::new(context, &self.config.render);
        let (base, terrain) = base_scene_from_config(&mut renderer, &self.config.scene);
        let volumes = volume_scene_from_config(&mut renderer, &self.config.scene.volumes);

        let viewport = Self::current_viewport(&window);
        let driver = FrameDriver::new(
            camera_from_config(&self.config.camera, &viewport),
            ShadowVolumeRenderer::from_config(&self.config.render),
            viewport,
        )
        .with_base(base, Some(terrain))
        .with_volumes(volumes)
        .with_rotation_speed(self.config.scene.rotation_speed);

        let size = viewport.physical_size();
        info!(
            "Rendering {} volumes with {:?} at {}x{} (scale: {:.2})",
            driver.volumes().len(),
            driver.renderer().algorithm(),
            size.width,
            size.height,
            viewport.scale_factor()
        );

        self.renderer = Some(renderer);
        self.driver = Some(driver);
        self.window = Some(window);
        true
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(renderer), Some(driver)) = (self.renderer.as_mut(), self.driver.as_mut()) else {
            return;
        };

        if let Some(viewport) = driver.apply_pending_resize() {
            let size = viewport.physical_size();
            renderer.resize(size.width, size.height);
        }
        if !driver.viewport().is_visible() {
            return;
        }

        let time_ms = self.clock.tick();
        match renderer.begin_frame() {
            Ok(mut frame) => {
                driver.tick(&mut frame, time_ms);
                frame.submit();
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory, shutting down");
                event_loop.exit();
                return;
            }
            Err(e) => warn!("Skipping frame: {e}"),
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if !self.initialize(event_loop) {
            event_loop.exit();
            return;
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(window), Some(driver)) = (&self.window, self.driver.as_mut()) {
                    let viewport = Viewport::from_physical(
                        new_size.width,
                        new_size.height,
                        window.scale_factor(),
                    );
                    driver.request_resize(viewport);
                    info!("Window resized to {}x{}", new_size.width, new_size.height);
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let (Some(window), Some(driver)) = (&self.window, self.driver.as_mut()) {
                    let size = window.inner_size();
                    driver.request_resize(Viewport::from_physical(
                        size.width,
                        size.height,
                        scale_factor,
                    ));
                    info!("Scale factor changed to {scale_factor:.2}");
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

/// Opens the window and runs the event loop until it closes.
///
/// # Errors
///
/// Returns the event loop error if the loop could not be created or failed.
#[instrument(skip(config))]
pub fn run(config: Config) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_attributes_use_config() {
        let mut config = Config::default();
        config.window.title = "Shadows".to_string();
        let attrs = window_attributes_from_config(&config);
        assert_eq!(attrs.title, "Shadows");
        assert!(attrs.inner_size.is_some());
    }

    #[test]
    fn test_app_starts_without_window() {
        let app = App::new(Config::default());
        assert!(app.window.is_none());
        assert!(app.renderer.is_none());
        assert!(app.driver.is_none());
        assert_eq!(app.clock.frame_count(), 0);
    }
}
