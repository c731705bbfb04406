//! # Vulkan Bootstrap
//!
//! Brings a graphics application up to the point where rendering could begin:
//! a native window, a Vulkan instance with an optional validation messenger,
//! and a physical device with a queue family that can draw and present.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use vulkan_bootstrap::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BootstrapConfig::default();
//!     let engine = Engine::new(&config)?;
//!     let device = engine.physical_device();
//!     log::info!("graphics family {}", device.graphics_family);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names)]

pub mod config;
pub mod foundation;
pub mod vulkan;
pub mod window;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for bootstrap users
pub mod prelude {
    pub use crate::{
        Engine, EngineError,
        config::{BootstrapConfig, Config, ConfigError, VulkanConfig, WindowConfig},
        vulkan::{
            capabilities::{negotiate, AvailabilitySnapshot, CapabilitySource, RequirementSet},
            device::{
                choose_physical_device, find_queue_families, select_device,
                PhysicalDeviceSource, QueueFamilyIndices, SelectedDevice,
            },
            VulkanError, VulkanResult,
        },
        window::{Window, WindowError},
    };
}
