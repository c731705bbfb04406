//! `ash` implementations of the capability and device sources

use std::ffi::CStr;

use ash::{vk, Entry, Instance};

use crate::vulkan::capabilities::{AvailabilitySnapshot, CapabilitySource};
use crate::vulkan::device::{DeviceKind, DeviceSummary, PhysicalDeviceSource, QueueFamilyRecord};
use crate::vulkan::{VulkanError, VulkanResult};

impl CapabilitySource for Entry {
    fn instance_extensions(&self) -> VulkanResult<AvailabilitySnapshot> {
        let properties = self
            .enumerate_instance_extension_properties(None)
            .map_err(VulkanError::Api)?;
        Ok(AvailabilitySnapshot::from_extension_properties(&properties))
    }

    fn instance_layers(&self) -> VulkanResult<AvailabilitySnapshot> {
        let properties = self
            .enumerate_instance_layer_properties()
            .map_err(VulkanError::Api)?;
        Ok(AvailabilitySnapshot::from_layer_properties(&properties))
    }
}

impl PhysicalDeviceSource for Instance {
    type Device = vk::PhysicalDevice;

    fn physical_devices(&self) -> VulkanResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.enumerate_physical_devices() }.map_err(VulkanError::Api)
    }

    fn device_extensions(&self, device: vk::PhysicalDevice) -> VulkanResult<AvailabilitySnapshot> {
        let properties = unsafe { self.enumerate_device_extension_properties(device) }
            .map_err(VulkanError::Api)?;
        Ok(AvailabilitySnapshot::from_extension_properties(&properties))
    }

    fn queue_families(&self, device: vk::PhysicalDevice) -> Vec<QueueFamilyRecord> {
        let families = unsafe { self.get_physical_device_queue_family_properties(device) };
        (0u32..)
            .zip(families)
            .map(|(index, family)| QueueFamilyRecord {
                index,
                flags: family.queue_flags,
                queue_count: family.queue_count,
            })
            .collect()
    }

    fn describe(&self, device: vk::PhysicalDevice) -> DeviceSummary {
        let properties = unsafe { self.get_physical_device_properties(device) };
        DeviceSummary {
            name: unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
                .to_string_lossy()
                .into_owned(),
            kind: DeviceKind::from(properties.device_type),
            api_version: properties.api_version,
        }
    }
}
