//! Physical device selection
//!
//! Picks the first enumerated device that supports the swapchain extension,
//! then the first queue family on it that can run graphics work. A graphics
//! family is also taken as the present family; no surface is queried.

use std::fmt;

use ash::vk;

use crate::vulkan::capabilities::{
    all_present, log_available, snapshot_or_empty, AvailabilitySnapshot, CapabilityKind,
};
use crate::vulkan::VulkanResult;

/// Device extensions every selected device must support
pub const REQUIRED_DEVICE_EXTENSIONS: [&str; 1] = ["VK_KHR_swapchain"];

/// Coarse classification of a physical device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Software rasterizer or CPU device
    Cpu,
    /// Dedicated GPU
    DiscreteGpu,
    /// GPU sharing memory with the host
    IntegratedGpu,
    /// GPU exposed through virtualization
    VirtualGpu,
    /// Anything the driver does not classify
    Other,
}

impl From<vk::PhysicalDeviceType> for DeviceKind {
    fn from(ty: vk::PhysicalDeviceType) -> Self {
        match ty {
            vk::PhysicalDeviceType::CPU => Self::Cpu,
            vk::PhysicalDeviceType::DISCRETE_GPU => Self::DiscreteGpu,
            vk::PhysicalDeviceType::INTEGRATED_GPU => Self::IntegratedGpu,
            vk::PhysicalDeviceType::VIRTUAL_GPU => Self::VirtualGpu,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Cpu => "CPU",
            Self::DiscreteGpu => "Discrete GPU",
            Self::IntegratedGpu => "Integrated GPU",
            Self::VirtualGpu => "Virtual GPU",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Device properties shown in diagnostics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSummary {
    /// Driver-reported device name
    pub name: String,
    /// Device type
    pub kind: DeviceKind,
    /// Highest Vulkan version the device supports
    pub api_version: u32,
}

/// One entry of a device's queue family list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyRecord {
    /// Position in the reported list
    pub index: u32,
    /// Capabilities of every queue in the family
    pub flags: vk::QueueFlags,
    /// Number of queues in the family
    pub queue_count: u32,
}

impl QueueFamilyRecord {
    /// Whether queues in this family accept graphics commands
    pub fn supports_graphics(&self) -> bool {
        self.flags.contains(vk::QueueFlags::GRAPHICS)
    }
}

impl fmt::Display for QueueFamilyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Queue Family {} ({} queues, {:?})", self.index, self.queue_count, self.flags)
    }
}

/// Queue family indices discovered on a device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// Family used for graphics work
    pub graphics_family: Option<u32>,
    /// Family used for presentation
    pub present_family: Option<u32>,
}

impl QueueFamilyIndices {
    /// Both families are known
    pub const fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /// `(graphics, present)` once complete
    pub const fn pair(&self) -> Option<(u32, u32)> {
        match (self.graphics_family, self.present_family) {
            (Some(graphics), Some(present)) => Some((graphics, present)),
            _ => None,
        }
    }
}

/// A chosen device together with its queue families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedDevice<D> {
    /// Physical device handle
    pub device: D,
    /// Index of the graphics queue family
    pub graphics_family: u32,
    /// Index of the presentation queue family
    pub present_family: u32,
}

impl<D> SelectedDevice<D> {
    /// Combine a device with complete queue family indices
    pub fn new(device: D, indices: &QueueFamilyIndices) -> Option<Self> {
        indices.pair().map(|(graphics_family, present_family)| Self {
            device,
            graphics_family,
            present_family,
        })
    }
}

/// Something that can enumerate physical devices and describe them
pub trait PhysicalDeviceSource {
    /// Opaque device handle
    type Device: Copy;

    /// Devices in the order the runtime reports them
    fn physical_devices(&self) -> VulkanResult<Vec<Self::Device>>;

    /// Extensions the device supports
    fn device_extensions(&self, device: Self::Device) -> VulkanResult<AvailabilitySnapshot>;

    /// Queue families in the order the device reports them
    fn queue_families(&self, device: Self::Device) -> Vec<QueueFamilyRecord>;

    /// Name and type of the device
    fn describe(&self, device: Self::Device) -> DeviceSummary;
}

/// Whether the device supports every required device extension
pub fn is_suitable<S: PhysicalDeviceSource>(source: &S, device: S::Device) -> bool {
    log::debug!("Checking if device is suitable");
    log::debug!("We are requesting device extensions:");
    for name in REQUIRED_DEVICE_EXTENSIONS {
        log::debug!("\t\"{name}\"");
    }

    let available = snapshot_or_empty(source.device_extensions(device), CapabilityKind::Extension);
    log_available("Device", CapabilityKind::Extension, &available);

    let required: Vec<String> = REQUIRED_DEVICE_EXTENSIONS.iter().map(|s| (*s).to_string()).collect();
    let supported = all_present(&available, &required, CapabilityKind::Extension);
    if supported {
        log::debug!("Device can support the requested extensions.");
    } else {
        log::debug!("Device cannot support the requested extensions.");
    }
    supported
}

/// First suitable device in enumeration order
pub fn select_device<S: PhysicalDeviceSource>(
    source: &S,
    candidates: &[S::Device],
) -> Option<S::Device> {
    log::debug!(
        "There are {} physical devices available on this system.",
        candidates.len()
    );

    candidates.iter().copied().find(|&device| {
        log_device_properties(&source.describe(device));
        is_suitable(source, device)
    })
}

/// Enumerate devices from the source and pick the first suitable one
pub fn choose_physical_device<S: PhysicalDeviceSource>(source: &S) -> VulkanResult<Option<S::Device>> {
    log::debug!("Choosing physical device...");
    let devices = source.physical_devices()?;
    Ok(select_device(source, &devices))
}

/// Scan the device's queue families
pub fn find_queue_families<S: PhysicalDeviceSource>(source: &S, device: S::Device) -> QueueFamilyIndices {
    let families = source.queue_families(device);
    log::debug!("Device can support {} queue families.", families.len());
    scan_queue_families(families)
}

/// Walk families in order and stop once both indices are set
pub fn scan_queue_families<I>(families: I) -> QueueFamilyIndices
where
    I: IntoIterator<Item = QueueFamilyRecord>,
{
    let mut indices = QueueFamilyIndices::default();

    for family in families {
        if family.supports_graphics() {
            indices.graphics_family = Some(family.index);
            indices.present_family = Some(family.index);
            log::debug!("{family} is suitable for graphics and presenting.");
        }

        if indices.is_complete() {
            break;
        }
    }

    indices
}

/// Log name and type of a device
pub fn log_device_properties(summary: &DeviceSummary) {
    log::debug!("Device name: {}", summary.name);
    log::debug!("Device type: {}", summary.kind);
    log::debug!(
        "Device API version: {}.{}.{}",
        vk::api_version_major(summary.api_version),
        vk::api_version_minor(summary.api_version),
        vk::api_version_patch(summary.api_version),
    );
}
