//! Vulkan bootstrap demo
//!
//! Opens a window, creates an instance and selects a device, then shuts
//! everything down again. An optional first argument names a TOML or RON
//! configuration file.

use thiserror::Error;
use vulkan_bootstrap::foundation::logging;
use vulkan_bootstrap::prelude::*;

#[derive(Error, Debug)]
enum AppError {
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

fn run() -> Result<(), AppError> {
    let path = std::env::args().nth(1);
    let config = match &path {
        Some(path) => BootstrapConfig::load_from_file(path)?,
        None => BootstrapConfig::default(),
    };
    logging::init(config.debug());
    if let Some(path) = &path {
        log::info!("Loaded configuration from {path}");
    }

    let engine = Engine::new(&config)?;
    let instance = engine.instance();
    log::info!(
        "Instance {:?} ready, debug messenger attached: {}",
        instance.handle(),
        instance.has_debug_messenger()
    );
    let device = engine.physical_device();
    let (width, height) = engine.window().get_size();
    log::info!(
        "Bootstrap complete: {}x{} window, graphics queue family {}, present queue family {}",
        width,
        height,
        device.graphics_family,
        device.present_family
    );

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        // Logging may not be up yet if the configuration failed to load
        logging::init(true);
        log::error!("{e}");
        std::process::exit(1);
    }
}
