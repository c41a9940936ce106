//! Opens the Umbra window and renders the shadow volume scene.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags:
//! `umbra --algorithm z-pass --width 800 --height 600`.

use clap::Parser;
use tracing::{error, info, warn};
use umbra_app::PlatformDirs;
use umbra_config::{CliArgs, Config};

fn main() {
    let args = CliArgs::parse();
    let debug_build = cfg!(debug_assertions);

    let dirs = match PlatformDirs::resolve_for(args.config.clone()) {
        Ok(dirs) => dirs,
        Err(e) => {
            umbra_log::init_logging(None, debug_build, None);
            error!("Startup failed: {e}");
            std::process::exit(1);
        }
    };
    let dirs_result = dirs.create_dirs();

    let mut config = match Config::load_or_create(&dirs.config_dir) {
        Ok(config) => config,
        Err(e) => {
            umbra_log::init_logging(Some(&dirs.log_dir), debug_build, None);
            error!("Failed to load config from {}: {e}", dirs.config_dir.display());
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);

    umbra_log::init_logging(Some(&dirs.log_dir), debug_build, Some(&config));
    if let Err(e) = dirs_result {
        warn!("Could not create application directories: {e}");
    }

    info!(
        "Umbra v{} starting: {}x{}, {:?}, stencil default {}",
        env!("CARGO_PKG_VERSION"),
        config.window.width,
        config.window.height,
        config.render.shadow_algorithm,
        config.render.stencil_default
    );

    if let Err(e) = umbra_app::run(config) {
        error!("Event loop failed: {e}");
        std::process::exit(1);
    }
}
