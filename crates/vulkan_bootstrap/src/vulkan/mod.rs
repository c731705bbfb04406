//! Vulkan initialization
//!
//! Capability negotiation, instance creation and physical device selection.
//! The negotiation and selection logic is written against the
//! [`capabilities::CapabilitySource`] and [`device::PhysicalDeviceSource`]
//! traits; [`runtime`] implements them for the `ash` loader types.

use ash::vk;
use thiserror::Error;

pub mod capabilities;
pub mod debug;
pub mod device;
pub mod instance;
pub mod runtime;

pub use instance::VulkanInstance;

/// Vulkan-specific error types
#[derive(Error, Debug)]
pub enum VulkanError {
    /// General Vulkan API error with result code
    #[error("Vulkan API error: {0:?}")]
    Api(vk::Result),

    /// The Vulkan loader library could not be found or loaded
    #[error("Failed to load Vulkan: {0}")]
    Loading(String),

    /// Requested instance extensions or layers are missing from the runtime
    #[error("Requested instance extensions or layers are not supported")]
    UnsupportedRequirements,

    /// `vkCreateInstance` failed
    #[error("Failed to create instance: {0:?}")]
    InstanceCreation(vk::Result),

    /// A name could not be passed to the driver
    #[error("Invalid name {0:?}: contains an interior NUL byte")]
    InvalidName(String),
}

/// Result type for Vulkan operations
pub type VulkanResult<T> = Result<T, VulkanError>;
