//! OS-specific directory resolution for configuration and logs.

use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during platform operations.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS did not provide a configuration directory.
    #[error("could not determine OS configuration directory")]
    NoConfigDir,
    /// Directory creation failed.
    #[error("platform I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Directories Umbra reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    /// JSON log files (debug builds).
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "umbra";

impl PlatformDirs {
    /// Resolve platform-specific directories without creating them on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::NoConfigDir`] if the OS does not expose a
    /// configuration directory.
    pub fn resolve() -> Result<Self, PlatformError> {
        let base = dirs::config_dir().ok_or(PlatformError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Uses `config_dir` when given (the `--config` flag), otherwise the OS
    /// location. Logs go next to the configuration.
    pub fn resolve_for(config_dir: Option<PathBuf>) -> Result<Self, PlatformError> {
        match config_dir {
            Some(config_dir) => Ok(Self {
                log_dir: config_dir.join("logs"),
                config_dir,
            }),
            None => Self::resolve(),
        }
    }

    /// Resolve directories rooted under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            log_dir: app_dir.join("logs"),
            config_dir: app_dir,
        }
    }

    /// Create all directories on disk.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Io`] if any directory cannot be created.
    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }
}
