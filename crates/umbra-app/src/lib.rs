//! Umbra application: window, frame scheduling and platform directories.

pub mod frame_driver;
pub mod platform;
pub mod window;

pub use frame_driver::{FrameClock, FrameDriver, camera_from_config};
pub use platform::{PlatformDirs, PlatformError};
pub use window::{App, run, window_attributes_from_config};
