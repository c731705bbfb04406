//! Bootstrap orchestrator
//!
//! Creates the window, the instance and the device selection in that order.
//! Field order makes teardown run in reverse: instance (with its messenger)
//! first, the window and GLFW last.

use ash::vk;
use thiserror::Error;

use crate::config::{BootstrapConfig, ConfigError};
use crate::vulkan::device::{choose_physical_device, find_queue_families, PhysicalDeviceSource, SelectedDevice};
use crate::vulkan::{VulkanError, VulkanInstance};
use crate::window::{Window, WindowError};

/// Engine start-up errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration was rejected
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Window creation failed
    #[error("Window error: {0}")]
    Window(#[from] WindowError),

    /// Vulkan instance or query failed
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] VulkanError),

    /// No enumerated device supports the required extensions
    #[error("No suitable physical device found")]
    NoSuitableDevice,

    /// The chosen device has no graphics-capable queue family
    #[error("No graphics queue family found on {device}")]
    IncompleteQueueFamilies {
        /// Name of the device that was chosen
        device: String,
    },
}

/// Owner of the window, the instance and the selected device
pub struct Engine {
    physical_device: SelectedDevice<vk::PhysicalDevice>,
    instance: VulkanInstance,
    window: Window,
}

impl Engine {
    /// Run the whole bootstrap sequence
    pub fn new(config: &BootstrapConfig) -> Result<Self, EngineError> {
        config.validate()?;
        log::info!("Making engine running");

        let window = Window::new(&config.window)?;
        let window_extensions = window.get_required_instance_extensions()?;

        let instance = VulkanInstance::new(&window_extensions, &config.vulkan)?;
        let physical_device = select(instance.instance())?;

        Ok(Self {
            physical_device,
            instance,
            window,
        })
    }

    /// The chosen device and its queue families
    pub const fn physical_device(&self) -> &SelectedDevice<vk::PhysicalDevice> {
        &self.physical_device
    }

    /// The Vulkan instance
    pub const fn instance(&self) -> &VulkanInstance {
        &self.instance
    }

    /// The native window
    pub const fn window(&self) -> &Window {
        &self.window
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        log::info!("Closing engine");
    }
}

/// Pick a device and its queue families, treating absence as fatal
fn select<S: PhysicalDeviceSource>(source: &S) -> Result<SelectedDevice<S::Device>, EngineError> {
    let device = choose_physical_device(source)?.ok_or_else(|| {
        log::error!("No suitable physical device found");
        EngineError::NoSuitableDevice
    })?;

    let summary = source.describe(device);
    let indices = find_queue_families(source, device);
    let selected = SelectedDevice::new(device, &indices).ok_or_else(|| EngineError::IncompleteQueueFamilies {
        device: summary.name.clone(),
    })?;

    log::info!(
        "Selected GPU: {} ({}), graphics family {}, present family {}",
        summary.name,
        summary.kind,
        selected.graphics_family,
        selected.present_family
    );
    Ok(selected)
}
