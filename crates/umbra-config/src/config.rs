//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const APP_NAME: &str = "umbra";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Window settings.
    pub window: WindowConfig,
    /// Shadow volume rendering settings.
    pub render: RenderConfig,
    /// Viewer camera.
    pub camera: CameraConfig,
    /// Base scene and shadow volumes.
    pub scene: SceneConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    /// Window title.
    pub title: String,
}

/// Which stencil shadow volume strategy marks the stencil plane.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ShadowAlgorithm {
    /// Count on depth-test failure. Correct with the eye inside a volume.
    #[default]
    ZFail,
    /// Count on depth-test success. Breaks when the eye is inside a volume.
    ZPass,
}

/// Shadow volume rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Stencil strategy used for every volume.
    pub shadow_algorithm: ShadowAlgorithm,
    /// Value the stencil plane is cleared to before the volume passes.
    pub stencil_default: u8,
    /// Color the frame is cleared to (RGBA, linear).
    pub clear_color: [f32; 4],
    /// Upper bound on draw submissions per frame on the GPU backend.
    pub max_draws_per_frame: u32,
}

/// Viewer camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance.
    pub far: f32,
    /// Eye position in world space.
    pub position: [f32; 3],
    /// Point the camera looks at.
    pub target: [f32; 3],
}

/// One shadow volume, in processing order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VolumeConfig {
    /// Unit cube centered at `position`, scaled per axis.
    Cuboid {
        position: [f32; 3],
        scale: [f32; 3],
        tint: [f32; 4],
    },
    /// Closed x/z path extruded between `low` and `high` along y.
    Prism {
        path: Vec<[f32; 2]>,
        low: f32,
        high: f32,
        position: [f32; 3],
        tint: [f32; 4],
    },
}

/// Base scene and shadow volume configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Grid resolution of the terrain surface along each axis.
    pub terrain_segments: u32,
    /// Flat color of the terrain.
    pub terrain_color: [f32; 4],
    /// Terrain spin around Y in radians per second.
    pub rotation_speed: f32,
    /// Shadow volumes, rendered in this order.
    pub volumes: Vec<VolumeConfig>,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            vsync: true,
            title: "Umbra".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_algorithm: ShadowAlgorithm::ZFail,
            stencil_default: 0,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            max_draws_per_frame: 1024,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.01,
            far: 10000.0,
            position: [2.5, 2.5, 2.5],
            target: [0.0, 0.0, 0.0],
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            terrain_segments: 20,
            terrain_color: [0.8, 0.8, 0.8, 1.0],
            rotation_speed: 1.0,
            volumes: vec![
                VolumeConfig::Cuboid {
                    position: [-1.1, 0.0, 0.0],
                    scale: [1.0, 100.0, 1.0],
                    tint: [1.0, 0.0, 0.0, 0.5],
                },
                VolumeConfig::Prism {
                    path: square_frame_path(2.0, 1.95),
                    low: -100.0,
                    high: 100.0,
                    position: [0.0, 0.0, 0.0],
                    tint: [0.0, 0.0, 1.0, 0.5],
                },
            ],
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Outer square loop bridged into a reversed inner square loop.
fn square_frame_path(outer: f32, inner: f32) -> Vec<[f32; 2]> {
    vec![
        [-outer, -outer],
        [outer, -outer],
        [outer, outer],
        [-outer, outer],
        [-outer, -outer],
        [-inner, -inner],
        [-inner, inner],
        [inner, inner],
        [inner, -inner],
        [-inner, -inner],
    ]
}

/// Platform configuration directory for Umbra (`<os config dir>/umbra`).
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(ConfigError::NoConfigDir)
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(4)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}
