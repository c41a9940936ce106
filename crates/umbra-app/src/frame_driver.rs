//! Per-refresh frame scheduling.
//!
//! [`FrameDriver`] owns everything one frame needs: the camera, both scenes
//! and the shadow volume renderer. Each [`tick`](FrameDriver::tick) applies
//! the most recent resize request, spins the base mesh, and renders one frame
//! into whatever backend the caller supplies.

use std::time::Instant;

use glam::Vec3;
use tracing::warn;
use umbra_config::CameraConfig;
use umbra_render::{Camera, RenderBackend, Scene, ShadowVolumeRenderer, VolumeScene, Viewport};

/// Gaps between frames longer than this are reported.
pub const MAX_FRAME_TIME: f64 = 0.25;

/// Wall-clock frame timestamps in milliseconds since the clock started.
pub struct FrameClock {
    start: Instant,
    previous: Instant,
    frame_count: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    fn starting_at(start: Instant) -> Self {
        Self {
            start,
            previous: start,
            frame_count: 0,
        }
    }

    /// Timestamp for the frame about to be rendered.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        let frame_time = now.duration_since(self.previous).as_secs_f64();
        if self.frame_count > 0 && frame_time > MAX_FRAME_TIME {
            warn!(
                "Frame time {:.1}ms exceeds {:.1}ms",
                frame_time * 1000.0,
                MAX_FRAME_TIME * 1000.0
            );
        }
        self.previous = now;
        self.frame_count += 1;
        now.duration_since(self.start).as_secs_f64() * 1000.0
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the viewer camera for a viewport.
pub fn camera_from_config(config: &CameraConfig, viewport: &Viewport) -> Camera {
    let mut camera = Camera::perspective(
        config.fov_y_degrees.to_radians(),
        viewport.aspect_ratio(),
        config.near,
        config.far,
    );
    let position = Vec3::from_array(config.position);
    let target = Vec3::from_array(config.target);
    let forward = (target - position).normalize_or_zero();
    if forward == Vec3::ZERO {
        warn!("camera target equals its position, keeping the default orientation");
        camera.position = position;
        return camera;
    }
    // Looking straight up or down needs a different up vector.
    let up = if forward.cross(Vec3::Y).length_squared() < 1e-6 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    camera.look_at(position, target, up);
    camera
}

pub struct FrameDriver {
    camera: Camera,
    base: Scene,
    spinning: Option<usize>,
    volumes: VolumeScene,
    renderer: ShadowVolumeRenderer,
    rotation_speed: f32,
    viewport: Viewport,
    pending_resize: Option<Viewport>,
    frame_count: u64,
}

impl FrameDriver {
    /// Driver with empty scenes; the camera aspect follows `viewport`.
    pub fn new(mut camera: Camera, renderer: ShadowVolumeRenderer, viewport: Viewport) -> Self {
        camera.set_aspect_ratio(
            viewport.logical_width() as f32,
            viewport.logical_height() as f32,
        );
        Self {
            camera,
            base: Scene::new(),
            spinning: None,
            volumes: VolumeScene::default(),
            renderer,
            rotation_speed: 1.0,
            viewport,
            pending_resize: None,
            frame_count: 0,
        }
    }

    /// Sets the base scene; the object at `spinning` rotates about Y.
    pub fn with_base(mut self, base: Scene, spinning: Option<usize>) -> Self {
        self.base = base;
        self.spinning = spinning;
        self
    }

    pub fn with_volumes(mut self, volumes: VolumeScene) -> Self {
        self.volumes = volumes;
        self
    }

    /// Spin rate of the base object in radians per second.
    pub fn with_rotation_speed(mut self, radians_per_second: f32) -> Self {
        self.rotation_speed = radians_per_second;
        self
    }

    /// Records a new drawable size. Only the most recent request is applied,
    /// at the start of the next tick.
    pub fn request_resize(&mut self, viewport: Viewport) {
        self.pending_resize = Some(viewport);
    }

    /// Applies a pending resize, returning the new viewport if there was one.
    pub fn apply_pending_resize(&mut self) -> Option<Viewport> {
        let viewport = self.pending_resize.take()?;
        self.camera.set_aspect_ratio(
            viewport.logical_width() as f32,
            viewport.logical_height() as f32,
        );
        self.viewport = viewport;
        Some(viewport)
    }

    /// Renders one frame at `time_ms`.
    pub fn tick<B: RenderBackend + ?Sized>(&mut self, backend: &mut B, time_ms: f64) {
        self.apply_pending_resize();

        if let Some(object) = self.spinning.and_then(|index| self.base.get_mut(index)) {
            let angle = (time_ms / 1000.0) as f32 * self.rotation_speed;
            object.transform.set_rotation_y(angle);
        }

        self.renderer.render_frame(
            backend,
            &self.base,
            &self.volumes,
            &self.camera,
            time_ms,
        );
        self.frame_count += 1;
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn renderer(&self) -> &ShadowVolumeRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut ShadowVolumeRenderer {
        &mut self.renderer
    }

    pub fn base(&self) -> &Scene {
        &self.base
    }

    pub fn volumes(&self) -> &VolumeScene {
        &self.volumes
    }

    /// Frames rendered so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use glam::Quat;
    use umbra_config::{Config, ShadowAlgorithm};
    use umbra_render::{
        ClearTargets, CommandRecorder, PipelineState, RenderCommand, base_scene_from_config,
        volume_scene_from_config,
    };

    fn driver_for(config: &Config, recorder: &mut CommandRecorder) -> FrameDriver {
        let viewport = Viewport::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
            1.0,
        );
        let (base, terrain) = base_scene_from_config(recorder, &config.scene);
        let volumes = volume_scene_from_config(recorder, &config.scene.volumes);
        FrameDriver::new(
            camera_from_config(&config.camera, &viewport),
            ShadowVolumeRenderer::from_config(&config.render),
            viewport,
        )
        .with_base(base, Some(terrain))
        .with_volumes(volumes)
        .with_rotation_speed(config.scene.rotation_speed)
    }

    #[test]
    fn test_frame_command_sequence() {
        let config = Config::default();
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);

        driver.tick(&mut recorder, 0.0);
        let commands = recorder.take();

        // clear, terrain, stencil reset, then mark + composite per volume
        assert_eq!(commands.len(), 4 + 2 * config.scene.volumes.len());
        assert_eq!(commands[0], RenderCommand::Clear(ClearTargets::ALL));
        assert!(matches!(commands[1], RenderCommand::Draw { .. }));
        assert_eq!(commands[2], RenderCommand::SetClearStencil(0));
        assert_eq!(commands[3], RenderCommand::Clear(ClearTargets::STENCIL));
        assert_eq!(driver.frame_count(), 1);
    }

    #[test]
    fn test_resize_updates_aspect_at_next_frame() {
        let config = Config::default();
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);
        assert!((driver.camera().aspect_ratio - 1.0).abs() < 1e-6);

        driver.request_resize(Viewport::new(800.0, 600.0, 1.0));
        assert!((driver.camera().aspect_ratio - 1.0).abs() < 1e-6);

        driver.tick(&mut recorder, 16.0);
        assert!((driver.camera().aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
        assert_eq!(driver.viewport().physical_size().width, 800);
        assert_eq!(driver.renderer().state(), &PipelineState::BASELINE);
    }

    #[test]
    fn test_last_resize_wins() {
        let config = Config::default();
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);

        driver.request_resize(Viewport::new(300.0, 300.0, 1.0));
        driver.request_resize(Viewport::new(1024.0, 512.0, 2.0));
        let applied = driver.apply_pending_resize();

        assert_eq!(applied, Some(Viewport::new(1024.0, 512.0, 2.0)));
        assert!((driver.camera().aspect_ratio - 2.0).abs() < 1e-6);
        assert_eq!(driver.apply_pending_resize(), None);
    }

    #[test]
    fn test_terrain_rotation_follows_time() {
        let config = Config::default();
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);

        driver.tick(&mut recorder, 1500.0);
        let rotation = driver.base().objects()[0].transform.rotation;
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(1.5), 1e-5));
        // volumes do not spin
        let volume = &driver.volumes().volumes()[0];
        assert_eq!(volume.transform.rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_rotation_speed_scales_angle() {
        let mut config = Config::default();
        config.scene.rotation_speed = 0.5;
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);

        driver.tick(&mut recorder, 2000.0);
        let rotation = driver.base().objects()[0].transform.rotation;
        assert!(rotation.abs_diff_eq(Quat::from_rotation_y(1.0), 1e-5));
    }

    #[test]
    fn test_state_is_baseline_after_many_frames() {
        let mut config = Config::default();
        config.render.shadow_algorithm = ShadowAlgorithm::ZPass;
        let mut recorder = CommandRecorder::new();
        let mut driver = driver_for(&config, &mut recorder);

        for frame in 0..5 {
            if frame == 2 {
                driver.request_resize(Viewport::new(640.0, 480.0, 1.5));
            }
            driver.tick(&mut recorder, f64::from(frame) * 16.6);
            assert_eq!(driver.renderer().state(), &PipelineState::BASELINE);
        }
        assert_eq!(driver.frame_count(), 5);
    }

    #[test]
    fn test_camera_from_default_config() {
        let config = CameraConfig::default();
        let camera = camera_from_config(&config, &Viewport::new(500.0, 500.0, 1.0));
        assert_eq!(camera.position, Vec3::splat(2.5));
        let expected = (Vec3::ZERO - Vec3::splat(2.5)).normalize();
        assert!(camera.forward().abs_diff_eq(expected, 1e-5));
        assert!((camera.fov_y - 70f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_camera_looking_straight_down() {
        let config = CameraConfig {
            position: [0.0, 5.0, 0.0],
            target: [0.0, 0.0, 0.0],
            ..CameraConfig::default()
        };
        let camera = camera_from_config(&config, &Viewport::new(500.0, 500.0, 1.0));
        assert!(camera.forward().abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn test_clock_reports_elapsed_milliseconds() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        assert_eq!(clock.tick_at(start), 0.0);
        let t = clock.tick_at(start + Duration::from_millis(40));
        assert!((t - 40.0).abs() < 1e-6);
        // a long stall is reported but not clamped
        let t = clock.tick_at(start + Duration::from_millis(1040));
        assert!((t - 1040.0).abs() < 1e-6);
        assert_eq!(clock.frame_count(), 3);
    }
}
