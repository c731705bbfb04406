//! Vulkan instance creation
//!
//! The requested extensions and layers are negotiated against the runtime
//! before `vkCreateInstance` is called. Validation adds `VK_EXT_debug_utils`,
//! the Khronos validation layer and a [`DebugMessenger`].

use std::ffi::CString;
use std::os::raw::c_char;

use ash::extensions::ext::DebugUtils;
use ash::{vk, Entry, Instance};

use crate::config::VulkanConfig;
use crate::vulkan::capabilities::{negotiate, RequirementSet};
use crate::vulkan::debug::{DebugMessenger, VALIDATION_LAYER};
use crate::vulkan::{VulkanError, VulkanResult};

/// Vulkan instance wrapper with RAII cleanup
pub struct VulkanInstance {
    entry: Entry,
    instance: Instance,
    debug_messenger: Option<DebugMessenger>,
}

impl VulkanInstance {
    /// Load the Vulkan library and create an instance
    ///
    /// `window_extensions` are the instance extensions the window system needs
    /// for presentation.
    pub fn new(window_extensions: &[String], config: &VulkanConfig) -> VulkanResult<Self> {
        let entry = unsafe { Entry::load() }
            .map_err(|e| VulkanError::Loading(e.to_string()))?;
        Self::with_entry(entry, window_extensions, config)
    }

    /// Create an instance from an already loaded entry
    pub fn with_entry(
        entry: Entry,
        window_extensions: &[String],
        config: &VulkanConfig,
    ) -> VulkanResult<Self> {
        log::debug!("Creating instance...");

        let version = entry
            .try_enumerate_instance_version()
            .map_err(VulkanError::Api)?
            .unwrap_or(vk::API_VERSION_1_0);
        log::debug!(
            "System can support Vulkan Variant: {}, Major {}, Minor {}, Patch {}",
            vk::api_version_variant(version),
            vk::api_version_major(version),
            vk::api_version_minor(version),
            vk::api_version_patch(version),
        );
        let version = without_patch(version);

        let app_name = to_cstring(&config.application_name)?;
        let engine_name = to_cstring(&config.engine_name)?;
        let (major, minor, patch) = config.application_version;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, major, minor, patch))
            .engine_name(&engine_name)
            .engine_version(version)
            .api_version(version);

        let validation = config.validation_enabled();
        let requirements = instance_requirements(window_extensions, validation);
        log::debug!("Extensions to be requested:");
        for name in &requirements.extensions {
            log::debug!("\t\"{name}\"");
        }

        if !negotiate(&entry, &requirements) {
            log::error!("Requested instance extensions or layers are not supported");
            return Err(VulkanError::UnsupportedRequirements);
        }

        let extension_names = requirements
            .extensions
            .iter()
            .map(|name| to_cstring(name))
            .collect::<VulkanResult<Vec<_>>>()?;
        let layer_names = requirements
            .layers
            .iter()
            .map(|name| to_cstring(name))
            .collect::<VulkanResult<Vec<_>>>()?;
        let extension_ptrs: Vec<*const c_char> = extension_names.iter().map(|n| n.as_ptr()).collect();
        let layer_ptrs: Vec<*const c_char> = layer_names.iter().map(|n| n.as_ptr()).collect();

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extension_ptrs)
            .enabled_layer_names(&layer_ptrs);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|e| {
            log::error!("Failed to create instance: {e:?}");
            VulkanError::InstanceCreation(e)
        })?;

        // From here on, an early return drops `created` and destroys the instance
        let mut created = Self {
            entry,
            instance,
            debug_messenger: None,
        };
        if validation {
            created.debug_messenger = Some(DebugMessenger::new(&created.entry, &created.instance)?);
        }

        log::info!("Vulkan instance created (validation: {validation})");
        Ok(created)
    }

    /// Loaded instance functions
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Raw instance handle
    pub fn handle(&self) -> vk::Instance {
        self.instance.handle()
    }

    /// Whether a debug messenger is attached
    pub const fn has_debug_messenger(&self) -> bool {
        self.debug_messenger.is_some()
    }
}

impl Drop for VulkanInstance {
    fn drop(&mut self) {
        unsafe {
            if let Some(messenger) = self.debug_messenger.take() {
                messenger.destroy();
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// Extensions and layers an instance needs
///
/// Window extensions come first in their given order. Validation appends the
/// debug utils extension and the validation layer.
pub fn instance_requirements(window_extensions: &[String], validation: bool) -> RequirementSet {
    let requirements = RequirementSet::new().with_extensions(window_extensions.iter().cloned());
    if validation {
        requirements
            .with_extension(DebugUtils::name().to_string_lossy())
            .with_layer(VALIDATION_LAYER)
    } else {
        requirements
    }
}

/// Clear the patch component of a packed API version
pub const fn without_patch(version: u32) -> u32 {
    version & !0xFFF
}

fn to_cstring(name: &str) -> VulkanResult<CString> {
    CString::new(name).map_err(|_| VulkanError::InvalidName(name.to_string()))
}
