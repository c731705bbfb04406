//! Configuration system
//!
//! Window and instance settings live in one [`BootstrapConfig`] that the
//! application builds or loads and then hands to [`crate::Engine::new`].

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is out of range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Name of the offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

/// Native window settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title
    pub title: String,
    /// Width in screen coordinates
    pub width: u32,
    /// Height in screen coordinates
    pub height: u32,
    /// Whether the user may resize the window
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Vulkan Project".to_string(),
            width: 800,
            height: 600,
            resizable: false,
        }
    }
}

/// Instance creation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulkanConfig {
    /// Application name reported to the driver
    pub application_name: String,
    /// Application version (major, minor, patch)
    pub application_version: (u32, u32, u32),
    /// Engine name reported to the driver
    pub engine_name: String,
    /// Whether to enable the validation layer and debug messenger
    ///
    /// `None` follows the build profile.
    pub enable_validation: Option<bool>,
}

impl VulkanConfig {
    /// Resolve whether validation should be enabled
    pub const fn validation_enabled(&self) -> bool {
        match self.enable_validation {
            Some(enabled) => enabled,
            None => cfg!(debug_assertions),
        }
    }
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            application_name: "Vulkan Project".to_string(),
            application_version: (1, 0, 0),
            engine_name: "Vulkan Bootstrap".to_string(),
            enable_validation: None,
        }
    }
}

/// Everything the engine needs to start
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Window settings
    pub window: WindowConfig,
    /// Vulkan instance settings
    pub vulkan: VulkanConfig,
}

impl BootstrapConfig {
    /// Whether diagnostic output should be verbose
    pub const fn debug(&self) -> bool {
        self.vulkan.validation_enabled()
    }

    /// Reject settings that cannot produce a window or an instance
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid {
                field: "window",
                reason: format!(
                    "dimensions must be non-zero, got {}x{}",
                    self.window.width, self.window.height
                ),
            });
        }
        if self.vulkan.application_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "vulkan.application_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

impl Config for BootstrapConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BootstrapConfig::default();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(!config.window.resizable);
        assert_eq!(config.vulkan.validation_enabled(), cfg!(debug_assertions));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_explicit_validation_overrides_profile() {
        let mut config = VulkanConfig::default();
        config.enable_validation = Some(false);
        assert!(!config.validation_enabled());
        config.enable_validation = Some(true);
        assert!(config.validation_enabled());
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let mut config = BootstrapConfig::default();
        config.window.height = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "window", .. })
        ));
    }

    #[test]
    fn test_empty_application_name_rejected() {
        let mut config = BootstrapConfig::default();
        config.vulkan.application_name.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: BootstrapConfig = toml::from_str(
            "[window]\nwidth = 1280\n\n[vulkan]\nenable_validation = true\n",
        )
        .unwrap();
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.window.height, 600);
        assert_eq!(config.vulkan.enable_validation, Some(true));
        assert_eq!(config.vulkan.application_name, "Vulkan Project");
    }

    #[test]
    fn test_save_and_load_both_formats() {
        let dir = std::env::temp_dir();
        let mut config = BootstrapConfig::default();
        config.window.title = "Bootstrap Test".to_string();
        config.vulkan.application_version = (2, 3, 4);

        for name in ["vulkan_bootstrap_test.toml", "vulkan_bootstrap_test.ron"] {
            let path = dir.join(name);
            let path = path.to_str().unwrap();
            config.save_to_file(path).unwrap();
            let loaded = BootstrapConfig::load_from_file(path).unwrap();
            assert_eq!(loaded, config);
            let _ = std::fs::remove_file(path);
        }
    }

    #[test]
    fn test_unsupported_extension() {
        let config = BootstrapConfig::default();
        assert!(matches!(
            config.save_to_file("config.json"),
            Err(ConfigError::UnsupportedFormat(_))
        ));
    }
}
