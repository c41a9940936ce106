//! Command-line argument parsing for Umbra.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::{Config, ShadowAlgorithm};

/// Stencil strategy as spelled on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AlgorithmArg {
    /// Depth-fail counting (Carmack's Reverse).
    ZFail,
    /// Depth-pass counting.
    ZPass,
}

impl From<AlgorithmArg> for ShadowAlgorithm {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::ZFail => ShadowAlgorithm::ZFail,
            AlgorithmArg::ZPass => ShadowAlgorithm::ZPass,
        }
    }
}

/// Umbra command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug)]
#[command(name = "umbra", about = "Stencil shadow volume renderer")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Shadow volume strategy.
    #[arg(long, value_enum)]
    pub algorithm: Option<AlgorithmArg>,

    /// Stencil clear value used before the volume passes.
    #[arg(long)]
    pub stencil_default: Option<u8>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(algorithm) = args.algorithm {
            self.render.shadow_algorithm = algorithm.into();
        }
        if let Some(value) = args.stencil_default {
            self.render.stencil_default = value;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
