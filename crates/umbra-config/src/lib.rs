//! Configuration system for Umbra.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, and forward/backward
//! compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::{AlgorithmArg, CliArgs};
pub use config::{
    CameraConfig, Config, DebugConfig, RenderConfig, SceneConfig, ShadowAlgorithm, VolumeConfig,
    WindowConfig, default_config_dir,
};
pub use error::ConfigError;
